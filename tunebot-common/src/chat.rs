//! Chat target resolution
//!
//! A chat key names where messages go, in the form
//! `<adapter>-<channel-kind>_<numeric-id>`, for example
//! `onebot_v11-private_12345678` or `onebot_v11-group_87654321`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Kind of conversation a chat key points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Private,
    Group,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Private => "private",
            ChannelKind::Group => "group",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved delivery target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTarget {
    pub kind: ChannelKind,
    pub id: u64,
}

impl ChatTarget {
    /// Parse a chat key into its channel kind and numeric id
    ///
    /// The adapter prefix is discarded. Fails with [`Error::InvalidFormat`]
    /// when a separator is missing, the kind is not `private`/`group`, or
    /// the id is not all ASCII digits.
    pub fn parse(chat_key: &str) -> Result<Self> {
        let invalid = || Error::InvalidFormat(chat_key.to_string());

        if !chat_key.contains('_') {
            return Err(invalid());
        }

        let (_adapter, rest) = chat_key.split_once('-').ok_or_else(invalid)?;
        let (kind, id) = rest.split_once('_').ok_or_else(invalid)?;

        let kind = match kind {
            "private" => ChannelKind::Private,
            "group" => ChannelKind::Group,
            _ => return Err(invalid()),
        };

        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let id = id.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self { kind, id })
    }
}

/// Ordered stages of a song delivery, used to report which send failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStage {
    Text,
    Cover,
    Voice,
    Card,
}

impl fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeliveryStage::Text => "text message",
            DeliveryStage::Cover => "album cover",
            DeliveryStage::Voice => "voice message",
            DeliveryStage::Card => "music card",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_private_and_group() {
        assert_eq!(
            ChatTarget::parse("a-private_123").unwrap(),
            ChatTarget { kind: ChannelKind::Private, id: 123 }
        );
        assert_eq!(
            ChatTarget::parse("a-group_456").unwrap(),
            ChatTarget { kind: ChannelKind::Group, id: 456 }
        );
    }

    #[test]
    fn test_parse_adapter_with_underscore() {
        let target = ChatTarget::parse("onebot_v11-group_87654321").unwrap();
        assert_eq!(target.kind, ChannelKind::Group);
        assert_eq!(target.id, 87654321);
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for key in [
            "",
            "private123",
            "a-private123",
            "aprivate_123",
            "a-channel_123",
            "a-private_",
            "a-private_12a",
            "a-private_-12",
            "a-Private_12",
            "a-group_99999999999999999999999",
        ] {
            assert!(
                matches!(ChatTarget::parse(key), Err(Error::InvalidFormat(_))),
                "expected InvalidFormat for {key:?}"
            );
        }
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(DeliveryStage::Cover.to_string(), "album cover");
        assert_eq!(DeliveryStage::Card.to_string(), "music card");
    }
}
