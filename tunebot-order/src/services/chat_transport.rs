//! Chat transport seam and message model

use async_trait::async_trait;
use serde::Serialize;
use tunebot_common::{ChatTarget, Result};

/// One outbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    Text(String),
    /// Image by URL
    Image { file: String },
    /// Voice clip by URL
    Voice { file: String },
    /// Rich music card linking to the catalog page
    MusicCard {
        url: String,
        audio: String,
        title: String,
        image: Option<String>,
    },
}

impl ChatMessage {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ChatMessage::Text(_) => "text",
            ChatMessage::Image { .. } => "image",
            ChatMessage::Voice { .. } => "record",
            ChatMessage::MusicCard { .. } => "music",
        }
    }

    /// OneBot v11 message segment
    pub fn to_segment(&self) -> Segment {
        match self {
            ChatMessage::Text(text) => Segment {
                kind: "text",
                data: serde_json::json!({ "text": text }),
            },
            ChatMessage::Image { file } => Segment {
                kind: "image",
                data: serde_json::json!({ "file": file }),
            },
            ChatMessage::Voice { file } => Segment {
                kind: "record",
                data: serde_json::json!({ "file": file }),
            },
            ChatMessage::MusicCard { url, audio, title, image } => {
                let mut data = serde_json::json!({
                    "type": "custom",
                    "url": url,
                    "audio": audio,
                    "title": title,
                });
                if let Some(image) = image {
                    data["image"] = serde_json::Value::String(image.clone());
                }
                Segment { kind: "music", data }
            }
        }
    }
}

/// Wire form of a message segment
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: serde_json::Value,
}

/// Sends messages to a resolved chat target
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver one message; an `Err` means the message was not accepted
    async fn send(&self, target: &ChatTarget, message: &ChatMessage) -> Result<()>;
}
