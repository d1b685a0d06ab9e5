//! Music catalog seam
//!
//! The catalog service owns search, playable-URL lookup, credential
//! checks and the QR login primitives. Everything here is a trait so the
//! orchestration code can be tested against in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tunebot_common::{Credential, Error, QualityTier, Result};

/// Top search hit, consumed immediately by a delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMatch {
    /// Catalog song id (mid)
    pub mid: String,
    pub title: String,
    pub artist: String,
    /// Album id used for cover art
    pub album_mid: String,
}

/// Search, playback and credential operations of the music service
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Keyword search, best match first
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<SongMatch>>;

    /// Playable URL for one tier; `Ok(None)` when the tier has no file
    async fn song_url(
        &self,
        mid: &str,
        tier: QualityTier,
        credential: &Credential,
    ) -> Result<Option<String>>;

    /// Whether the service rejects this credential as expired
    async fn is_expired(&self, credential: &Credential) -> Result<bool>;

    /// Whether this credential can be refreshed
    async fn can_refresh(&self, credential: &Credential) -> Result<bool> {
        Ok(credential.has_refresh_material())
    }

    /// Exchange refresh material for a new credential
    async fn refresh(&self, credential: &Credential) -> Result<Credential>;
}

/// Which app the QR code is scanned with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrLoginKind {
    #[serde(rename = "wx")]
    WeChat,
    #[serde(rename = "qq")]
    Qq,
}

impl FromStr for QrLoginKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wx" => Ok(QrLoginKind::WeChat),
            "qq" => Ok(QrLoginKind::Qq),
            other => Err(Error::InvalidFormat(format!(
                "unknown login type '{}', expected 'wx' or 'qq'",
                other
            ))),
        }
    }
}

impl fmt::Display for QrLoginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrLoginKind::WeChat => f.write_str("wx"),
            QrLoginKind::Qq => f.write_str("qq"),
        }
    }
}

/// In-progress QR login, owned by one poll loop and never persisted
#[derive(Debug, Clone)]
pub struct QrChallenge {
    pub kind: QrLoginKind,
    /// Image bytes to show the user
    pub image: Vec<u8>,
    pub mime: &'static str,
    /// Service-side handle used when polling (qrsig or wx uuid)
    pub identifier: String,
}

/// Scan status reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrEvent {
    /// Waiting for a scan
    Scanning,
    /// Scanned, waiting for confirmation on the phone
    Confirming,
    Done,
    /// The QR code lapsed on the service side
    Timeout,
    Refused,
    /// Status code not recognized
    Other(String),
}

impl QrEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QrEvent::Done | QrEvent::Timeout | QrEvent::Refused)
    }
}

/// Result of one status poll
#[derive(Debug, Clone)]
pub struct QrPoll {
    pub event: QrEvent,
    /// Present only with [`QrEvent::Done`]
    pub credential: Option<Credential>,
}

impl QrPoll {
    pub fn pending(event: QrEvent) -> Self {
        Self { event, credential: None }
    }
}

/// QR login primitives of the music service
#[async_trait]
pub trait QrLoginService: Send + Sync {
    async fn request_qrcode(&self, kind: QrLoginKind) -> Result<QrChallenge>;

    async fn poll_qrcode(&self, challenge: &QrChallenge) -> Result<QrPoll>;
}
