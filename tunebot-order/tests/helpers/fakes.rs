//! Fake catalog, QR service, chat transport and credential slot

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tunebot_common::{ChatTarget, Credential, Error, QualityTier, Result};
use tunebot_order::services::{
    ChatMessage, ChatTransport, CredentialSlot, MusicCatalog, QrChallenge, QrEvent, QrLoginKind,
    QrLoginService, QrPoll, SongMatch,
};

pub fn sample_song() -> SongMatch {
    SongMatch {
        mid: "004Z8Ihr0JIu5s".to_string(),
        title: "Qi Li Xiang".to_string(),
        artist: "Jay Chou".to_string(),
        album_mid: "003DFRzD192KKD".to_string(),
    }
}

pub fn sample_credential() -> Credential {
    Credential {
        openid: "openid-1".to_string(),
        refresh_token: "refresh-token-0123456789".to_string(),
        access_token: "access-token-0123456789".to_string(),
        expired_at: 1_900_000_000,
        musicid: 123456789,
        musickey: "Q_H_L_musickey0123456789".to_string(),
        str_musicid: "123456789".to_string(),
        refresh_key: "refresh-key-0123456789".to_string(),
        login_type: 2,
        ..Default::default()
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Reply for one quality tier
#[derive(Debug, Clone)]
pub enum UrlReply {
    Url(String),
    Empty,
    Fail,
}

pub struct FakeCatalog {
    pub songs: Vec<SongMatch>,
    pub search_fails: bool,
    /// Tiers without an entry fail
    pub url_replies: HashMap<QualityTier, UrlReply>,
    pub url_calls: Mutex<Vec<QualityTier>>,
    pub expired: bool,
    pub refresh_fails: bool,
    pub refresh_calls: AtomicUsize,
}

impl FakeCatalog {
    /// One search hit, every tier resolves
    pub fn with_song() -> Self {
        let url_replies = [QualityTier::Lossless, QualityTier::High, QualityTier::Standard]
            .into_iter()
            .map(|tier| (tier, UrlReply::Url(format!("https://stream.example/{}.audio", tier))))
            .collect();
        Self {
            songs: vec![sample_song()],
            search_fails: false,
            url_replies,
            url_calls: Mutex::new(Vec::new()),
            expired: false,
            refresh_fails: false,
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_url_replies(mut self, replies: &[(QualityTier, UrlReply)]) -> Self {
        self.url_replies = replies.iter().cloned().collect();
        self
    }

    pub fn url_calls(&self) -> Vec<QualityTier> {
        self.url_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MusicCatalog for FakeCatalog {
    async fn search(&self, _keyword: &str, limit: usize) -> Result<Vec<SongMatch>> {
        if self.search_fails {
            return Err(Error::Upstream("search unavailable".to_string()));
        }
        Ok(self.songs.iter().take(limit).cloned().collect())
    }

    async fn song_url(
        &self,
        _mid: &str,
        tier: QualityTier,
        _credential: &Credential,
    ) -> Result<Option<String>> {
        self.url_calls.lock().unwrap().push(tier);
        match self.url_replies.get(&tier) {
            Some(UrlReply::Url(url)) => Ok(Some(url.clone())),
            Some(UrlReply::Empty) => Ok(None),
            Some(UrlReply::Fail) | None => Err(Error::Upstream(format!("{} tier unavailable", tier))),
        }
    }

    async fn is_expired(&self, _credential: &Credential) -> Result<bool> {
        Ok(self.expired)
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.refresh_fails {
            return Err(Error::Upstream("refresh rejected".to_string()));
        }
        Ok(Credential {
            musickey: "Q_H_L_refreshed".to_string(),
            ..credential.clone()
        })
    }
}

// ============================================================================
// QR login
// ============================================================================

pub struct FakeQrService {
    /// Events returned in order; `Scanning` once exhausted
    pub events: Mutex<VecDeque<QrEvent>>,
    pub request_fails: bool,
    /// Attach a credential to `Done`
    pub credential_on_done: bool,
    pub polls: AtomicUsize,
}

impl FakeQrService {
    pub fn new(events: Vec<QrEvent>) -> Self {
        Self {
            events: Mutex::new(events.into()),
            request_fails: false,
            credential_on_done: true,
            polls: AtomicUsize::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn challenge(kind: QrLoginKind) -> QrChallenge {
        QrChallenge {
            kind,
            image: vec![0x89, b'P', b'N', b'G'],
            mime: "image/png",
            identifier: "qrsig-test".to_string(),
        }
    }
}

#[async_trait]
impl QrLoginService for FakeQrService {
    async fn request_qrcode(&self, kind: QrLoginKind) -> Result<QrChallenge> {
        if self.request_fails {
            return Err(Error::Upstream("ptqrshow unavailable".to_string()));
        }
        Ok(Self::challenge(kind))
    }

    async fn poll_qrcode(&self, _challenge: &QrChallenge) -> Result<QrPoll> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let event = self
            .events
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(QrEvent::Scanning);

        let credential = (event == QrEvent::Done && self.credential_on_done).then(sample_credential);
        Ok(QrPoll { event, credential })
    }
}

// ============================================================================
// Chat transport
// ============================================================================

#[derive(Default)]
pub struct FakeTransport {
    pub sent: Mutex<Vec<(ChatTarget, ChatMessage)>>,
    /// 1-based index of the send call that fails
    pub fail_on_call: Option<usize>,
    pub calls: AtomicUsize,
}

impl FakeTransport {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(ChatTarget, ChatMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send(&self, target: &ChatTarget, message: &ChatMessage) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(Error::Upstream("ActionFailed".to_string()));
        }
        self.sent.lock().unwrap().push((*target, message.clone()));
        Ok(())
    }
}

// ============================================================================
// Credential slot
// ============================================================================

#[derive(Default)]
pub struct MemorySlot {
    pub data: Mutex<Option<Vec<u8>>>,
    pub writes: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl MemorySlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: &Credential) -> Self {
        let slot = Self::default();
        *slot.data.lock().unwrap() = Some(serde_json::to_vec(credential).unwrap());
        slot
    }

    pub fn with_bytes(bytes: &[u8]) -> Self {
        let slot = Self::default();
        *slot.data.lock().unwrap() = Some(bytes.to_vec());
        slot
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<Credential> {
        self.data
            .lock()
            .unwrap()
            .as_ref()
            .map(|bytes| serde_json::from_slice(bytes).unwrap())
    }
}

#[async_trait]
impl CredentialSlot for MemorySlot {
    async fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.data.lock().unwrap().clone())
    }

    async fn write(&self, bytes: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only slot",
            )));
        }
        *self.data.lock().unwrap() = Some(bytes.to_vec());
        Ok(())
    }
}
