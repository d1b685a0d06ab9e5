//! Audio quality tiers and their fallback order

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Audio quality tier offered by the music service, best first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// FLAC
    #[serde(alias = "FLAC")]
    Lossless,
    /// MP3 320 kbps
    #[default]
    #[serde(alias = "MP3_320")]
    High,
    /// MP3 128 kbps
    #[serde(alias = "MP3_128")]
    Standard,
}

impl QualityTier {
    /// Tiers to try, in order, when this tier is preferred
    ///
    /// Degradation only ever moves downward: preferring `Standard` never
    /// upgrades to a better tier.
    pub fn fallback_order(self) -> &'static [QualityTier] {
        match self {
            QualityTier::Lossless => &[QualityTier::Lossless, QualityTier::High, QualityTier::Standard],
            QualityTier::High => &[QualityTier::High, QualityTier::Standard],
            QualityTier::Standard => &[QualityTier::Standard],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Lossless => "lossless",
            QualityTier::High => "high",
            QualityTier::Standard => "standard",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lossless" | "FLAC" => Ok(QualityTier::Lossless),
            "high" | "MP3_320" => Ok(QualityTier::High),
            "standard" | "MP3_128" => Ok(QualityTier::Standard),
            other => Err(Error::Config(format!(
                "Unknown preferred_quality '{}': expected lossless, high or standard",
                other
            ))),
        }
    }
}
