//! OneBot v11 HTTP API client
//!
//! Sends one message per call through `send_private_msg` or
//! `send_group_msg`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tunebot_common::config::OneBotConfig;
use tunebot_common::{ChannelKind, ChatTarget, Error, Result};

use super::chat_transport::{ChatMessage, ChatTransport};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// OneBot action response envelope
#[derive(Debug, Deserialize)]
struct ActionResponse {
    status: String,
    #[serde(default)]
    retcode: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    wording: Option<String>,
}

/// OneBot v11 chat transport
pub struct OneBotClient {
    http_client: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

impl OneBotClient {
    pub fn new(config: &OneBotConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Upstream(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config
                .access_token
                .clone()
                .filter(|token| !token.is_empty()),
        })
    }

    fn action_request(&self, target: &ChatTarget, message: &ChatMessage) -> (String, serde_json::Value) {
        let segments = vec![message.to_segment()];
        match target.kind {
            ChannelKind::Private => (
                format!("{}/send_private_msg", self.api_url),
                serde_json::json!({ "user_id": target.id, "message": segments }),
            ),
            ChannelKind::Group => (
                format!("{}/send_group_msg", self.api_url),
                serde_json::json!({ "group_id": target.id, "message": segments }),
            ),
        }
    }
}

#[async_trait]
impl ChatTransport for OneBotClient {
    async fn send(&self, target: &ChatTarget, message: &ChatMessage) -> Result<()> {
        let (url, body) = self.action_request(target, message);

        tracing::debug!(
            chat_kind = %target.kind,
            chat_id = target.id,
            segment = message.kind(),
            "Sending chat message"
        );

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("OneBot request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "OneBot HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let action: ActionResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("OneBot response parse error: {}", e)))?;

        if action.status == "failed" || action.retcode != 0 {
            let detail = action
                .wording
                .or(action.message)
                .unwrap_or_else(|| "no detail".to_string());
            tracing::warn!(retcode = action.retcode, detail = %detail, "OneBot action failed");
            return Err(Error::Upstream(format!(
                "OneBot action failed (retcode {}): {}",
                action.retcode, detail
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OneBotClient {
        OneBotClient::new(&OneBotConfig {
            api_url: "http://127.0.0.1:5700/".to_string(),
            access_token: Some(String::new()),
        })
        .unwrap()
    }

    #[test]
    fn test_private_action() {
        let target = ChatTarget { kind: ChannelKind::Private, id: 42 };
        let (url, body) = client().action_request(&target, &ChatMessage::Text("hi".to_string()));

        assert_eq!(url, "http://127.0.0.1:5700/send_private_msg");
        assert_eq!(body["user_id"], 42);
        assert_eq!(body["message"][0]["type"], "text");
        assert_eq!(body["message"][0]["data"]["text"], "hi");
    }

    #[test]
    fn test_group_action() {
        let target = ChatTarget { kind: ChannelKind::Group, id: 7 };
        let (url, body) = client().action_request(&target, &ChatMessage::Text("hi".to_string()));

        assert_eq!(url, "http://127.0.0.1:5700/send_group_msg");
        assert_eq!(body["group_id"], 7);
        assert!(body.get("user_id").is_none());
    }

    #[test]
    fn test_empty_token_is_dropped() {
        assert!(client().access_token.is_none());
    }
}
