//! Song delivery: search, resolve, and send to a chat
//!
//! The agent-facing entry point. Every step short-circuits on failure and
//! the caller always gets a human-readable string back.

use std::sync::Arc;
use thiserror::Error;
use tunebot_common::config::TomlConfig;
use tunebot_common::cover::{cover_url, validate_cover_size};
use tunebot_common::{ChatTarget, DeliveryStage, Error, QualityTier, Result};

use super::catalog::{MusicCatalog, SongMatch};
use super::chat_transport::{ChatMessage, ChatTransport};
use super::credential_store::{CredentialSlot, CredentialStore};
use super::song_url::QualityFallbackResolver;

const SONG_PAGE_URL: &str = "https://y.qq.com/n/ryqq/songDetail/";

/// Delivery settings, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Cover size in pixels; 0 skips the cover message
    pub cover_size: u32,
    pub preferred_quality: QualityTier,
}

impl DeliveryConfig {
    pub fn new(cover_size: u32, preferred_quality: QualityTier) -> Result<Self> {
        validate_cover_size(cover_size)?;
        Ok(Self {
            cover_size,
            preferred_quality,
        })
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            cover_size: 500,
            preferred_quality: QualityTier::High,
        }
    }
}

impl TryFrom<&TomlConfig> for DeliveryConfig {
    type Error = Error;

    fn try_from(config: &TomlConfig) -> Result<Self> {
        Self::new(config.cover_size, config.preferred_quality)
    }
}

/// Where a delivery stopped
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("No music service credential stored, log in first")]
    NoCredential,

    #[error("Stored credential is unreadable, log in again ({0})")]
    UnreadableCredential(String),

    #[error("Could not load credential: {0}")]
    CredentialLoad(Error),

    #[error("Search failed: {0}")]
    Search(Error),

    #[error("No matching song found")]
    SongNotFound,

    #[error("Could not build cover link: {0}")]
    Cover(Error),

    #[error("Could not resolve a playable URL: {0}")]
    PlayableUrl(Error),

    #[error("Invalid chat key: {0}")]
    ChatTarget(Error),

    #[error("Failed to send {0}")]
    SendFailed(DeliveryStage),
}

/// Search → resolve → send pipeline
pub struct MusicDelivery {
    catalog: Arc<dyn MusicCatalog>,
    transport: Arc<dyn ChatTransport>,
    slot: Arc<dyn CredentialSlot>,
    resolver: QualityFallbackResolver,
    config: DeliveryConfig,
}

impl MusicDelivery {
    pub fn new(
        catalog: Arc<dyn MusicCatalog>,
        transport: Arc<dyn ChatTransport>,
        slot: Arc<dyn CredentialSlot>,
        config: DeliveryConfig,
    ) -> Self {
        let resolver = QualityFallbackResolver::new(Arc::clone(&catalog));
        Self {
            catalog,
            transport,
            slot,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> DeliveryConfig {
        self.config
    }

    /// Deliver the top match for `keyword` to the chat named by `chat_key`
    ///
    /// Never fails: the outcome is always described in the returned string.
    pub async fn deliver(&self, chat_key: &str, keyword: &str) -> String {
        match self.try_deliver(chat_key, keyword).await {
            Ok(song) => format!("Sent \"{}\" by {}", song.title, song.artist),
            Err(e) => {
                tracing::warn!(chat_key, keyword, "Music delivery failed: {}", e);
                e.to_string()
            }
        }
    }

    /// Same pipeline as [`MusicDelivery::deliver`], with a typed failure
    pub async fn try_deliver(
        &self,
        chat_key: &str,
        keyword: &str,
    ) -> std::result::Result<SongMatch, DeliveryError> {
        let mut store = CredentialStore::new(Arc::clone(&self.slot), Arc::clone(&self.catalog));
        let credential = store.load().await.map_err(|e| match e {
            Error::NotFound(_) => DeliveryError::NoCredential,
            Error::CorruptCredential(msg) => DeliveryError::UnreadableCredential(msg),
            other => DeliveryError::CredentialLoad(other),
        })?;

        let song = self
            .catalog
            .search(keyword, 1)
            .await
            .map_err(DeliveryError::Search)?
            .into_iter()
            .next()
            .ok_or(DeliveryError::SongNotFound)?;
        tracing::info!(mid = %song.mid, title = %song.title, artist = %song.artist, "Top match");

        let cover = cover_url(&song.album_mid, self.config.cover_size).map_err(DeliveryError::Cover)?;

        let audio_url = self
            .resolver
            .resolve(&song.mid, &credential, self.config.preferred_quality)
            .await
            .map_err(DeliveryError::PlayableUrl)?;

        let target = ChatTarget::parse(chat_key).map_err(DeliveryError::ChatTarget)?;

        // Order matters to the chat UX: text, cover, voice, card
        self.send_stage(&target, DeliveryStage::Text, ChatMessage::Text(format!("{} - {}", song.title, song.artist)))
            .await?;

        if let Some(cover) = &cover {
            self.send_stage(&target, DeliveryStage::Cover, ChatMessage::Image { file: cover.clone() })
                .await?;
        }

        self.send_stage(&target, DeliveryStage::Voice, ChatMessage::Voice { file: audio_url.clone() })
            .await?;

        let card = ChatMessage::MusicCard {
            url: format!("{}{}", SONG_PAGE_URL, song.mid),
            audio: audio_url,
            title: song.title.clone(),
            image: cover,
        };
        self.send_stage(&target, DeliveryStage::Card, card).await?;

        tracing::info!(chat_kind = %target.kind, chat_id = target.id, title = %song.title, "Song delivered");
        Ok(song)
    }

    async fn send_stage(
        &self,
        target: &ChatTarget,
        stage: DeliveryStage,
        message: ChatMessage,
    ) -> std::result::Result<(), DeliveryError> {
        self.transport.send(target, &message).await.map_err(|e| {
            tracing::warn!(stage = %stage, "Send failed: {}", e);
            DeliveryError::SendFailed(stage)
        })
    }
}
