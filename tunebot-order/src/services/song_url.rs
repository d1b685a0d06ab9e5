//! Playable URL resolution with quality fallback

use std::sync::Arc;
use tunebot_common::{Credential, Error, QualityTier, Result};

use super::catalog::MusicCatalog;

/// Tries quality tiers in order, degrading on failure
///
/// One attempt per tier, sequentially; the first non-empty URL wins.
pub struct QualityFallbackResolver {
    catalog: Arc<dyn MusicCatalog>,
}

impl QualityFallbackResolver {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn resolve(
        &self,
        mid: &str,
        credential: &Credential,
        preferred: QualityTier,
    ) -> Result<String> {
        let mut last_error = String::from("no quality tier attempted");

        for &tier in preferred.fallback_order() {
            match self.catalog.song_url(mid, tier, credential).await {
                Ok(Some(url)) if !url.is_empty() => {
                    tracing::info!(mid, tier = %tier, "Resolved playable URL");
                    return Ok(url);
                }
                Ok(_) => {
                    tracing::warn!(mid, tier = %tier, "No playable URL for tier");
                    last_error = format!("{} tier returned no URL", tier);
                }
                Err(e) => {
                    tracing::warn!(mid, tier = %tier, "Playable URL lookup failed: {}", e);
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::AllQualitiesExhausted { last_error })
    }
}
