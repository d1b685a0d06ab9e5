//! QR code login flow
//!
//! `start_login` returns the QR image immediately and hands the rest of
//! the login to a detached background task. The task polls the challenge
//! at a fixed interval up to an attempt ceiling, saves the credential on
//! success, and reports its terminal state on a oneshot channel. Nobody
//! has to listen: dropping the receiver leaves the task running alone.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tunebot_common::Result;

use super::catalog::{MusicCatalog, QrChallenge, QrEvent, QrLoginKind, QrLoginService};
use super::credential_store::{CredentialSlot, CredentialStore};

/// Poll cadence and ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// Every 2 seconds, 30 attempts: a one-minute ceiling
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// Terminal state of one login attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoginOutcome {
    /// Credential obtained and saved
    Done { musicid: u64 },
    /// The service reported the QR code as lapsed
    Expired,
    /// The user declined on the phone
    Refused,
    /// Attempt ceiling reached without a terminal service state
    TimedOut,
    /// Polling or saving raised an error
    Failed { detail: String },
}

/// What the caller gets back from `start_login`
#[derive(Debug)]
pub struct LoginTicket {
    pub kind: QrLoginKind,
    /// QR image, base64-encoded
    pub image_base64: String,
    pub mime: &'static str,
    /// Terminal state of the background poll; may be dropped
    pub outcome: oneshot::Receiver<LoginOutcome>,
}

/// Orchestrates QR challenge issue and the background poll loop
pub struct QrLoginFlow {
    service: Arc<dyn QrLoginService>,
    slot: Arc<dyn CredentialSlot>,
    catalog: Arc<dyn MusicCatalog>,
    policy: PollPolicy,
}

impl QrLoginFlow {
    pub fn new(
        service: Arc<dyn QrLoginService>,
        slot: Arc<dyn CredentialSlot>,
        catalog: Arc<dyn MusicCatalog>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            service,
            slot,
            catalog,
            policy,
        }
    }

    /// Issue a challenge and spawn its poll loop
    pub async fn start_login(&self, kind: QrLoginKind) -> Result<LoginTicket> {
        let challenge = self.service.request_qrcode(kind).await?;
        tracing::info!(kind = %kind, bytes = challenge.image.len(), "QR challenge issued");

        let image_base64 = STANDARD.encode(&challenge.image);
        let mime = challenge.mime;
        let (tx, rx) = oneshot::channel();

        let service = Arc::clone(&self.service);
        let store = CredentialStore::new(Arc::clone(&self.slot), Arc::clone(&self.catalog));
        let policy = self.policy;

        tokio::spawn(async move {
            let outcome = poll_until_terminal(service.as_ref(), &challenge, &store, policy).await;
            // A dropped receiver just means nobody is listening
            let _ = tx.send(outcome);
        });

        Ok(LoginTicket {
            kind,
            image_base64,
            mime,
            outcome: rx,
        })
    }
}

/// Poll one challenge until the service reaches a terminal state or the
/// attempt ceiling is hit. Saves the credential exactly once on success.
pub async fn poll_until_terminal(
    service: &dyn QrLoginService,
    challenge: &QrChallenge,
    store: &CredentialStore,
    policy: PollPolicy,
) -> LoginOutcome {
    for attempt in 1..=policy.max_attempts {
        let poll = match service.poll_qrcode(challenge).await {
            Ok(poll) => poll,
            Err(e) => {
                tracing::error!(attempt, "QR status check failed: {}", e);
                return LoginOutcome::Failed { detail: e.to_string() };
            }
        };
        tracing::debug!(attempt, event = ?poll.event, "QR status");

        match poll.event {
            QrEvent::Done => {
                let Some(credential) = poll.credential else {
                    tracing::error!("QR login finished without a credential");
                    return LoginOutcome::Failed {
                        detail: "login finished without a credential".to_string(),
                    };
                };
                return match store.save(&credential).await {
                    Ok(()) => {
                        tracing::info!(musicid = credential.musicid, "QR login succeeded");
                        LoginOutcome::Done { musicid: credential.musicid }
                    }
                    Err(e) => {
                        tracing::error!("QR login succeeded but credential save failed: {}", e);
                        LoginOutcome::Failed { detail: e.to_string() }
                    }
                };
            }
            QrEvent::Timeout => {
                tracing::warn!("QR code expired on the service side, request a new one");
                return LoginOutcome::Expired;
            }
            QrEvent::Refused => {
                tracing::warn!("QR login refused on the phone");
                return LoginOutcome::Refused;
            }
            QrEvent::Scanning | QrEvent::Confirming | QrEvent::Other(_) => {}
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    tracing::warn!(
        attempts = policy.max_attempts,
        "QR login not completed within the attempt ceiling"
    );
    LoginOutcome::TimedOut
}
