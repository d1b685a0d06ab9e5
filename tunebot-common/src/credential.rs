//! Music service session credential
//!
//! The credential is issued by the music service after a QR login and is
//! replaced wholesale on refresh or re-login. Only this system reads the
//! persisted form, so JSON is used as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field names whose values are truncated before display
pub const SENSITIVE_FIELDS: [&str; 4] = ["access_token", "refresh_token", "musickey", "refresh_key"];

/// Characters of a sensitive value kept visible
const REDACT_KEEP_CHARS: usize = 10;

/// Session credential for the music service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    pub openid: String,
    pub refresh_token: String,
    pub access_token: String,
    /// Unix seconds at which the access token lapses (0 when unknown)
    pub expired_at: i64,
    pub musicid: u64,
    pub musickey: String,
    pub unionid: String,
    pub str_musicid: String,
    pub refresh_key: String,
    #[serde(alias = "encryptUin")]
    pub encrypt_uin: String,
    /// 1 = WeChat, 2 = QQ
    #[serde(alias = "loginType")]
    pub login_type: i64,
    /// Service fields not named above, kept so nothing is lost on save
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Credential {
    /// Both refresh inputs are present
    pub fn has_refresh_material(&self) -> bool {
        !self.refresh_key.is_empty() && !self.refresh_token.is_empty()
    }

    /// Every field rendered as a string, sensitive values truncated
    pub fn info(&self) -> BTreeMap<String, String> {
        let mut info = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            let shown = if SENSITIVE_FIELDS.contains(&key) {
                redact(&value)
            } else {
                value
            };
            info.insert(key.to_string(), shown);
        };

        put("openid", self.openid.clone());
        put("refresh_token", self.refresh_token.clone());
        put("access_token", self.access_token.clone());
        put("expired_at", self.expired_at.to_string());
        put("musicid", self.musicid.to_string());
        put("musickey", self.musickey.clone());
        put("unionid", self.unionid.clone());
        put("str_musicid", self.str_musicid.clone());
        put("refresh_key", self.refresh_key.clone());
        put("encrypt_uin", self.encrypt_uin.clone());
        put("login_type", self.login_type.to_string());
        put("extra_fields", Value::Object(self.extra_fields.clone()).to_string());

        info
    }
}

fn redact(value: &str) -> String {
    if value.chars().count() > REDACT_KEEP_CHARS {
        let head: String = value.chars().take(REDACT_KEEP_CHARS).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}
