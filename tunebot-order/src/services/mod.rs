//! Service layer: external collaborator seams and the use cases built on them

pub mod catalog;
pub mod chat_transport;
pub mod credential_store;
pub mod delivery;
pub mod onebot_client;
pub mod qqmusic_client;
pub mod qr_login;
pub mod song_url;

pub use catalog::{MusicCatalog, QrChallenge, QrEvent, QrLoginKind, QrLoginService, QrPoll, SongMatch};
pub use chat_transport::{ChatMessage, ChatTransport};
pub use credential_store::{CredentialSlot, CredentialStatus, CredentialStore, FileSlot};
pub use delivery::{DeliveryConfig, DeliveryError, MusicDelivery};
pub use onebot_client::OneBotClient;
pub use qqmusic_client::QqMusicClient;
pub use qr_login::{poll_until_terminal, LoginOutcome, LoginTicket, PollPolicy, QrLoginFlow};
pub use song_url::QualityFallbackResolver;
