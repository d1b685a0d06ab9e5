//! Credential persistence and lifecycle
//!
//! One slot holds zero or one serialized credential. Readers and writers
//! are not mutually excluded: the slot is last-writer-wins. A store keeps
//! the credential it last loaded in memory, and status checks and refresh
//! only ever act on that loaded value.

use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tunebot_common::{Credential, Error, Result};

use super::catalog::MusicCatalog;

/// Durable storage for the serialized credential
#[async_trait]
pub trait CredentialSlot: Send + Sync {
    /// Stored bytes, or `None` when the slot is empty
    async fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the slot contents
    async fn write(&self, bytes: &[u8]) -> Result<()>;
}

/// Credential slot backed by a single file
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialSlot for FileSlot {
    async fn read(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<()> {
        let path = self.path.clone();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || replace_file(&path, &bytes))
            .await
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}

/// Write to a uniquely named temp file in the target's directory, then
/// rename it over the target. Each writer gets its own temp file, so a
/// reader only ever sees a complete credential.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Expiry and refresh capability of the loaded credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub expired: bool,
    pub refreshable: bool,
}

/// Loads, saves, checks and refreshes the deployment's credential
pub struct CredentialStore {
    slot: Arc<dyn CredentialSlot>,
    catalog: Arc<dyn MusicCatalog>,
    credential: Option<Credential>,
}

impl CredentialStore {
    pub fn new(slot: Arc<dyn CredentialSlot>, catalog: Arc<dyn MusicCatalog>) -> Self {
        Self {
            slot,
            catalog,
            credential: None,
        }
    }

    /// Credential from the last successful `load` or `refresh`
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Read and decode the slot
    ///
    /// An empty slot is [`Error::NotFound`]; undecodable contents are
    /// [`Error::CorruptCredential`].
    pub async fn load(&mut self) -> Result<Credential> {
        let bytes = self
            .slot
            .read()
            .await?
            .ok_or_else(|| Error::NotFound("no stored credential, log in first".to_string()))?;

        let credential: Credential = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("Stored credential could not be decoded: {}", e);
            Error::CorruptCredential(e.to_string())
        })?;

        tracing::debug!(musicid = credential.musicid, "Credential loaded");
        self.credential = Some(credential.clone());
        Ok(credential)
    }

    /// Serialize and overwrite the slot
    pub async fn save(&self, credential: &Credential) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(credential)?;
        self.slot.write(&bytes).await?;
        tracing::info!(musicid = credential.musicid, "Credential saved");
        Ok(())
    }

    /// Ask the service whether the loaded credential is expired and refreshable
    pub async fn check_status(&self) -> Result<CredentialStatus> {
        let credential = self.loaded()?;

        let expired = self.catalog.is_expired(credential).await?;
        let refreshable = self.catalog.can_refresh(credential).await?;

        tracing::info!(
            musicid = credential.musicid,
            expired,
            refreshable,
            "Credential status checked"
        );
        Ok(CredentialStatus { expired, refreshable })
    }

    /// Refresh the loaded credential and persist the result
    ///
    /// On [`Error::RefreshedNotPersisted`] the new credential is kept in
    /// memory; [`CredentialStore::persist`] retries just the write.
    pub async fn refresh(&mut self) -> Result<()> {
        let current = self.loaded()?;

        if !self.catalog.can_refresh(current).await? {
            return Err(Error::RefreshUnsupported);
        }

        let refreshed = match self.catalog.refresh(current).await {
            Ok(credential) => credential,
            Err(Error::RefreshFailed(msg)) => return Err(Error::RefreshFailed(msg)),
            Err(e) => return Err(Error::RefreshFailed(e.to_string())),
        };
        self.credential = Some(refreshed);

        self.persist().await
    }

    /// Write the in-memory credential to the slot
    pub async fn persist(&self) -> Result<()> {
        let credential = self.loaded()?;
        self.save(credential).await.map_err(|e| {
            tracing::error!("Credential refreshed but save failed: {}", e);
            Error::RefreshedNotPersisted(e.to_string())
        })
    }

    fn loaded(&self) -> Result<&Credential> {
        self.credential
            .as_ref()
            .ok_or_else(|| Error::NotFound("no credential loaded".to_string()))
    }
}
