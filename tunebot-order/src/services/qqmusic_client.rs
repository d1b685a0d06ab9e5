//! QQ Music API client
//!
//! Talks to the unified `musicu.fcg` JSON gateway for search, playable
//! URLs and credential checks, and to the ptlogin (QQ) and open.weixin
//! (WeChat) endpoints for QR login.

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, COOKIE, LOCATION, REFERER, SET_COOKIE};
use reqwest::Url;
use serde_json::{json, Value};
use std::time::Duration;
use tunebot_common::{Credential, Error, QualityTier, Result};

use super::catalog::{
    MusicCatalog, QrChallenge, QrEvent, QrLoginKind, QrLoginService, QrPoll, SongMatch,
};

const MUSICU_URL: &str = "https://u.y.qq.com/cgi-bin/musicu.fcg";
const STREAM_HOST: &str = "https://isure.stream.qqmusic.qq.com/";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const CLIENT_VERSION: &str = "13020508";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Gateway code for a credential the service no longer accepts
const CODE_CREDENTIAL_EXPIRED: i64 = 1000;

const LOGIN_TYPE_WECHAT: i64 = 1;
const LOGIN_TYPE_QQ: i64 = 2;

// QQ ptlogin
const PT_APPID: &str = "716027609";
const PT_DAID: &str = "383";
const PT_3RD_AID: &str = "100497308";
const PTQRSHOW_URL: &str = "https://ssl.ptlogin2.qq.com/ptqrshow";
const PTQRLOGIN_URL: &str = "https://ssl.ptlogin2.qq.com/ptqrlogin";
const OAUTH_AUTHORIZE_URL: &str = "https://graph.qq.com/oauth2.0/authorize";
const OAUTH_REDIRECT_URI: &str =
    "https://y.qq.com/portal/wx_redirect.html?login_type=1&surl=https://y.qq.com/";

// WeChat open platform
const WX_APPID: &str = "wx48db31d50e334801";
const WX_QRCONNECT_URL: &str = "https://open.weixin.qq.com/connect/qrconnect";
const WX_QRCODE_URL: &str = "https://open.weixin.qq.com/connect/qrcode/";
const WX_POLL_URL: &str = "https://lp.open.weixin.qq.com/connect/l/qrconnect";
const WX_REDIRECT_URI: &str =
    "https://y.qq.com/portal/wx_redirect.html?login_type=2&surl=https://y.qq.com/";

/// QQ Music client
pub struct QqMusicClient {
    http_client: reqwest::Client,
    guid: String,
}

impl QqMusicClient {
    pub fn new() -> Result<Self> {
        // Redirects stay visible: the QQ login exchange reads cookies and
        // Location headers off 302 responses.
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let guid = rand::thread_rng().gen_range(1_000_000_000u64..10_000_000_000u64).to_string();

        Ok(Self { http_client, guid })
    }

    /// Call one gateway method, returning the method's code and data
    async fn musicu(
        &self,
        module: &str,
        method: &str,
        param: Value,
        credential: Option<&Credential>,
        login_type: Option<i64>,
    ) -> Result<(i64, Value)> {
        let body = json!({
            "comm": comm_block(credential, login_type),
            "req_0": {
                "module": module,
                "method": method,
                "param": param,
            },
        });

        let mut request = self
            .http_client
            .post(MUSICU_URL)
            .header(REFERER, "https://y.qq.com/")
            .json(&body);
        if let Some(cred) = credential {
            request = request.header(COOKIE, credential_cookie(cred));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("{}.{} request failed: {}", module, method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "{}.{} returned HTTP {}",
                module,
                method,
                status.as_u16()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("{}.{} parse error: {}", module, method, e)))?;

        let req = &payload["req_0"];
        let code = req["code"].as_i64().unwrap_or(-1);
        tracing::debug!(module, method, code, "musicu call finished");

        Ok((code, req["data"].clone()))
    }

    async fn request_qq_qrcode(&self) -> Result<QrChallenge> {
        let t = rand::thread_rng().gen::<f64>().to_string();
        let response = self
            .http_client
            .get(PTQRSHOW_URL)
            .query(&[
                ("appid", PT_APPID),
                ("e", "2"),
                ("l", "M"),
                ("s", "3"),
                ("d", "72"),
                ("v", "4"),
                ("t", t.as_str()),
                ("daid", PT_DAID),
                ("pt_3rd_aid", PT_3RD_AID),
            ])
            .header(REFERER, "https://xui.ptlogin2.qq.com/")
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("ptqrshow failed: {}", e)))?;

        let qrsig = cookie_value(response.headers(), "qrsig")
            .ok_or_else(|| Error::Upstream("ptqrshow returned no qrsig cookie".to_string()))?;
        let image = response
            .bytes()
            .await
            .map_err(|e| Error::Upstream(format!("ptqrshow body: {}", e)))?;

        Ok(QrChallenge {
            kind: QrLoginKind::Qq,
            image: image.to_vec(),
            mime: "image/png",
            identifier: qrsig,
        })
    }

    async fn request_wx_qrcode(&self) -> Result<QrChallenge> {
        let page = self
            .http_client
            .get(WX_QRCONNECT_URL)
            .query(&[
                ("appid", WX_APPID),
                ("redirect_uri", WX_REDIRECT_URI),
                ("response_type", "code"),
                ("scope", "snsapi_login"),
                ("state", "STATE"),
                (
                    "href",
                    "https://y.qq.com/mediastyle/music_v17/src/css/popup_wechat.css#wechat_redirect",
                ),
            ])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("qrconnect failed: {}", e)))?
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("qrconnect body: {}", e)))?;

        let uuid = extract_wx_uuid(&page)
            .ok_or_else(|| Error::Upstream("qrconnect page has no QR uuid".to_string()))?;

        let image = self
            .http_client
            .get(format!("{}{}", WX_QRCODE_URL, uuid))
            .header(REFERER, "https://open.weixin.qq.com/")
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("wx qrcode fetch failed: {}", e)))?
            .bytes()
            .await
            .map_err(|e| Error::Upstream(format!("wx qrcode body: {}", e)))?;

        Ok(QrChallenge {
            kind: QrLoginKind::WeChat,
            image: image.to_vec(),
            mime: "image/jpeg",
            identifier: uuid,
        })
    }

    async fn poll_qq(&self, challenge: &QrChallenge) -> Result<QrPoll> {
        let ptqrtoken = hash33(&challenge.identifier, 0).to_string();
        let action = format!("0-0-{}", chrono::Utc::now().timestamp_millis());

        let text = self
            .http_client
            .get(PTQRLOGIN_URL)
            .query(&[
                ("u1", "https://graph.qq.com/oauth2.0/login_jump"),
                ("ptqrtoken", ptqrtoken.as_str()),
                ("ptredirect", "0"),
                ("h", "1"),
                ("t", "1"),
                ("g", "1"),
                ("from_ui", "1"),
                ("ptlang", "2052"),
                ("action", action.as_str()),
                ("js_ver", "20102616"),
                ("js_type", "1"),
                ("pt_uistyle", "40"),
                ("aid", PT_APPID),
                ("daid", PT_DAID),
                ("pt_3rd_aid", PT_3RD_AID),
                ("has_onekey", "1"),
            ])
            .header(COOKIE, format!("qrsig={}", challenge.identifier))
            .header(REFERER, "https://xui.ptlogin2.qq.com/")
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("ptqrlogin failed: {}", e)))?
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("ptqrlogin body: {}", e)))?;

        let args = parse_ptui_callback(&text)
            .ok_or_else(|| Error::Upstream(format!("unexpected ptqrlogin response: {}", text)))?;
        let event = qq_event(&args[0]);

        if event != QrEvent::Done {
            return Ok(QrPoll::pending(event));
        }

        let sig_url = args
            .get(2)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Upstream("ptqrlogin done without check_sig url".to_string()))?;
        let credential = self.complete_qq_login(sig_url).await?;

        Ok(QrPoll { event, credential: Some(credential) })
    }

    /// check_sig → OAuth authorize → gateway login
    async fn complete_qq_login(&self, sig_url: &str) -> Result<Credential> {
        let response = self
            .http_client
            .get(sig_url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("check_sig failed: {}", e)))?;

        let cookies = collect_cookies(response.headers());
        let p_skey = cookies
            .iter()
            .find(|(name, _)| name == "p_skey")
            .map(|(_, value)| value.clone())
            .ok_or_else(|| Error::Upstream("check_sig returned no p_skey".to_string()))?;
        let cookie_header = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        let g_tk = hash33(&p_skey, 5381).to_string();
        let auth_time = chrono::Utc::now().timestamp_millis().to_string();
        let ui = uuid::Uuid::new_v4().to_string();

        let response = self
            .http_client
            .post(OAUTH_AUTHORIZE_URL)
            .header(COOKIE, cookie_header)
            .form(&[
                ("response_type", "code"),
                ("client_id", PT_3RD_AID),
                ("redirect_uri", OAUTH_REDIRECT_URI),
                ("scope", "get_user_info,get_app_friends"),
                ("state", "state"),
                ("switch", ""),
                ("from_ptlogin", "1"),
                ("src", "1"),
                ("update_auth", "1"),
                ("openapi", "1010_1030"),
                ("g_tk", g_tk.as_str()),
                ("auth_time", auth_time.as_str()),
                ("ui", ui.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("authorize failed: {}", e)))?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Upstream("authorize returned no redirect".to_string()))?;
        let code = query_param(location, "code")
            .ok_or_else(|| Error::Upstream("authorize redirect has no code".to_string()))?;

        let (status, data) = self
            .musicu(
                "QQConnectLogin.LoginServer",
                "QQLogin",
                json!({ "code": code }),
                None,
                Some(LOGIN_TYPE_QQ),
            )
            .await?;
        credential_from_login(status, data, LOGIN_TYPE_QQ)
    }

    async fn poll_wx(&self, challenge: &QrChallenge) -> Result<QrPoll> {
        let stamp = chrono::Utc::now().timestamp_millis().to_string();
        let text = self
            .http_client
            .get(WX_POLL_URL)
            .query(&[("uuid", challenge.identifier.as_str()), ("_", stamp.as_str())])
            .header(REFERER, "https://open.weixin.qq.com/")
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("wx poll failed: {}", e)))?
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("wx poll body: {}", e)))?;

        let (errcode, wx_code) = parse_wx_poll(&text)
            .ok_or_else(|| Error::Upstream(format!("unexpected wx poll response: {}", text)))?;
        let event = wx_event(errcode);

        if event != QrEvent::Done {
            return Ok(QrPoll::pending(event));
        }

        let wx_code = wx_code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| Error::Upstream("wx login done without code".to_string()))?;
        let (status, data) = self
            .musicu(
                "music.login.LoginServer",
                "Login",
                json!({ "code": wx_code, "strAppid": WX_APPID }),
                None,
                Some(LOGIN_TYPE_WECHAT),
            )
            .await?;
        let credential = credential_from_login(status, data, LOGIN_TYPE_WECHAT)?;

        Ok(QrPoll { event, credential: Some(credential) })
    }
}

#[async_trait]
impl MusicCatalog for QqMusicClient {
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<SongMatch>> {
        let searchid = rand::thread_rng().gen_range(10u64.pow(17)..10u64.pow(18)).to_string();
        let (code, data) = self
            .musicu(
                "music.search.SearchCgiService",
                "DoSearchForQQMusicDesktop",
                json!({
                    "searchid": searchid,
                    "query": keyword,
                    "search_type": 0,
                    "num_per_page": limit,
                    "page_num": 1,
                    "highlight": 1,
                    "grp": 1,
                }),
                None,
                None,
            )
            .await?;

        if code != 0 {
            return Err(Error::Upstream(format!("search returned code {}", code)));
        }

        let songs: Vec<SongMatch> = data["body"]["song"]["list"]
            .as_array()
            .map(|list| list.iter().filter_map(parse_song_match).take(limit).collect())
            .unwrap_or_default();

        tracing::info!(keyword, hits = songs.len(), "Catalog search finished");
        Ok(songs)
    }

    async fn song_url(
        &self,
        mid: &str,
        tier: QualityTier,
        credential: &Credential,
    ) -> Result<Option<String>> {
        let (prefix, ext) = file_type(tier);
        let (code, data) = self
            .musicu(
                "music.vkey.GetVkey",
                "UrlGetVkey",
                json!({
                    "filename": [format!("{}{}{}{}", prefix, mid, mid, ext)],
                    "guid": self.guid,
                    "songmid": [mid],
                    "songtype": [0],
                    "uin": credential.musicid.to_string(),
                    "loginflag": 1,
                    "platform": "20",
                }),
                Some(credential),
                None,
            )
            .await?;

        if code == CODE_CREDENTIAL_EXPIRED {
            return Err(Error::Upstream("credential expired".to_string()));
        }
        if code != 0 {
            return Err(Error::Upstream(format!("vkey returned code {}", code)));
        }

        Ok(playable_url(&data))
    }

    async fn is_expired(&self, credential: &Credential) -> Result<bool> {
        let (code, _) = self
            .musicu(
                "music.UserInfo.userInfoServer",
                "GetLoginUserInfo",
                json!({}),
                Some(credential),
                None,
            )
            .await?;

        match code {
            0 => Ok(false),
            CODE_CREDENTIAL_EXPIRED => Ok(true),
            other => Err(Error::Upstream(format!("user info returned code {}", other))),
        }
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let (code, data) = self
            .musicu(
                "music.login.LoginServer",
                "Login",
                json!({
                    "openid": credential.openid,
                    "access_token": credential.access_token,
                    "refresh_token": credential.refresh_token,
                    "expired_in": 0,
                    "musicid": credential.musicid,
                    "musickey": credential.musickey,
                    "refresh_key": credential.refresh_key,
                    "loginMode": 2,
                }),
                Some(credential),
                Some(credential.login_type),
            )
            .await?;

        credential_from_login(code, data, credential.login_type)
            .map_err(|e| Error::RefreshFailed(e.to_string()))
    }
}

#[async_trait]
impl QrLoginService for QqMusicClient {
    async fn request_qrcode(&self, kind: QrLoginKind) -> Result<QrChallenge> {
        match kind {
            QrLoginKind::Qq => self.request_qq_qrcode().await,
            QrLoginKind::WeChat => self.request_wx_qrcode().await,
        }
    }

    async fn poll_qrcode(&self, challenge: &QrChallenge) -> Result<QrPoll> {
        match challenge.kind {
            QrLoginKind::Qq => self.poll_qq(challenge).await,
            QrLoginKind::WeChat => self.poll_wx(challenge).await,
        }
    }
}

// ============================================================================
// Wire helpers
// ============================================================================

fn comm_block(credential: Option<&Credential>, login_type: Option<i64>) -> Value {
    let mut comm = json!({
        "ct": "11",
        "cv": CLIENT_VERSION,
        "v": CLIENT_VERSION,
        "tmeAppID": "qqmusic",
        "format": "json",
        "inCharset": "utf-8",
        "outCharset": "utf-8",
        "uid": "3931641530",
    });
    if let Some(cred) = credential {
        let qq = if cred.str_musicid.is_empty() {
            cred.musicid.to_string()
        } else {
            cred.str_musicid.clone()
        };
        comm["qq"] = Value::String(qq);
        comm["authst"] = Value::String(cred.musickey.clone());
        comm["tmeLoginType"] = Value::String(cred.login_type.to_string());
    }
    if let Some(login_type) = login_type {
        comm["tmeLoginType"] = Value::String(login_type.to_string());
    }
    comm
}

fn credential_cookie(cred: &Credential) -> String {
    format!(
        "uin={}; qqmusic_key={}; qm_keyst={}; tmeLoginType={}",
        cred.musicid, cred.musickey, cred.musickey, cred.login_type
    )
}

/// File name prefix and extension per tier
fn file_type(tier: QualityTier) -> (&'static str, &'static str) {
    match tier {
        QualityTier::Lossless => ("F000", ".flac"),
        QualityTier::High => ("M800", ".mp3"),
        QualityTier::Standard => ("M500", ".mp3"),
    }
}

fn playable_url(data: &Value) -> Option<String> {
    data["midurlinfo"]
        .as_array()?
        .first()?
        .get("purl")?
        .as_str()
        .filter(|purl| !purl.is_empty())
        .map(|purl| format!("{}{}", STREAM_HOST, purl))
}

fn parse_song_match(item: &Value) -> Option<SongMatch> {
    let mid = item["mid"].as_str()?.to_string();
    let title = item["title"]
        .as_str()
        .or_else(|| item["name"].as_str())?
        .to_string();
    let artist = item["singer"]
        .as_array()
        .and_then(|singers| singers.first())
        .and_then(|singer| singer["name"].as_str())
        .unwrap_or_default()
        .to_string();
    let album_mid = item["album"]["mid"].as_str().unwrap_or_default().to_string();

    Some(SongMatch { mid, title, artist, album_mid })
}

fn credential_from_login(code: i64, data: Value, login_type: i64) -> Result<Credential> {
    if code != 0 {
        return Err(Error::Upstream(format!("login returned code {}", code)));
    }
    let mut credential: Credential = serde_json::from_value(data)?;
    if credential.musickey.is_empty() {
        return Err(Error::Upstream("login response has no musickey".to_string()));
    }
    if credential.login_type == 0 {
        credential.login_type = login_type;
    }
    Ok(credential)
}

/// ptlogin's string hash, used for ptqrtoken and g_tk
pub(crate) fn hash33(s: &str, seed: u64) -> u64 {
    let mut hash = seed;
    for c in s.chars() {
        hash = hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(c as u64);
    }
    hash & 0x7fff_ffff
}

/// Quoted arguments of a `ptuiCB('66','0','',...)` response
fn parse_ptui_callback(text: &str) -> Option<Vec<String>> {
    let start = text.find("ptuiCB(")? + "ptuiCB(".len();
    let end = start + text[start..].rfind(')')?;
    let body = &text[start..end];
    let args: Vec<String> = body
        .split('\'')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, arg)| arg.to_string())
        .collect();
    if args.is_empty() {
        None
    } else {
        Some(args)
    }
}

fn qq_event(code: &str) -> QrEvent {
    match code {
        "0" => QrEvent::Done,
        "66" => QrEvent::Scanning,
        "67" => QrEvent::Confirming,
        "65" => QrEvent::Timeout,
        "68" => QrEvent::Refused,
        other => QrEvent::Other(other.to_string()),
    }
}

/// `window.wx_errcode=405;window.wx_code='...';`
fn parse_wx_poll(text: &str) -> Option<(i64, Option<String>)> {
    let start = text.find("wx_errcode=")? + "wx_errcode=".len();
    let rest = &text[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    let errcode = rest[..end].trim().parse::<i64>().ok()?;

    let code = text.find("wx_code='").and_then(|i| {
        let rest = &text[i + "wx_code='".len()..];
        rest.find('\'').map(|end| rest[..end].to_string())
    });

    Some((errcode, code))
}

fn wx_event(errcode: i64) -> QrEvent {
    match errcode {
        405 => QrEvent::Done,
        408 => QrEvent::Scanning,
        404 => QrEvent::Confirming,
        403 => QrEvent::Refused,
        402 => QrEvent::Timeout,
        other => QrEvent::Other(other.to_string()),
    }
}

fn extract_wx_uuid(page: &str) -> Option<String> {
    let marker = "/connect/qrcode/";
    let start = page.find(marker)? + marker.len();
    let rest = &page[start..];
    let end = rest.find(|c: char| c == '"' || c == '\'' || c == '?')?;
    let uuid = &rest[..end];
    if uuid.is_empty() {
        None
    } else {
        Some(uuid.to_string())
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    collect_cookies(headers)
        .into_iter()
        .find(|(cookie, _)| cookie == name)
        .map(|(_, value)| value)
}

/// Non-empty `name=value` pairs from every Set-Cookie header
fn collect_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let value = url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned());
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_hash33_matches_known_values() {
        assert_eq!(hash33("", 0), 0);
        assert_eq!(hash33("a", 0), 97);
        // (97 * 33) + 98
        assert_eq!(hash33("ab", 0), 3299);
        assert_eq!(hash33("a", 5381), 5381 * 33 + 97);
        assert!(hash33(&"x".repeat(64), 0) <= 0x7fff_ffff);
    }

    #[test]
    fn test_parse_ptui_callback() {
        let args = parse_ptui_callback(
            "ptuiCB('0','0','https://ssl.ptlogin2.graph.qq.com/check_sig?uin=1&ptsigx=abc','0','ok', 'nick')",
        )
        .unwrap();
        assert_eq!(args[0], "0");
        assert_eq!(args[2], "https://ssl.ptlogin2.graph.qq.com/check_sig?uin=1&ptsigx=abc");
        assert_eq!(args[5], "nick");

        assert!(parse_ptui_callback("garbage").is_none());
    }

    #[test]
    fn test_qq_event_codes() {
        assert_eq!(qq_event("0"), QrEvent::Done);
        assert_eq!(qq_event("66"), QrEvent::Scanning);
        assert_eq!(qq_event("67"), QrEvent::Confirming);
        assert_eq!(qq_event("65"), QrEvent::Timeout);
        assert_eq!(qq_event("68"), QrEvent::Refused);
        assert_eq!(qq_event("86"), QrEvent::Other("86".to_string()));
    }

    #[test]
    fn test_parse_wx_poll() {
        assert_eq!(
            parse_wx_poll("window.wx_errcode=408;window.wx_code='';"),
            Some((408, Some(String::new())))
        );
        assert_eq!(
            parse_wx_poll("window.wx_errcode=405;window.wx_code='051abc';"),
            Some((405, Some("051abc".to_string())))
        );
        assert_eq!(parse_wx_poll("nothing here"), None);
        assert_eq!(wx_event(405), QrEvent::Done);
        assert_eq!(wx_event(402), QrEvent::Timeout);
        assert_eq!(wx_event(403), QrEvent::Refused);
    }

    #[test]
    fn test_extract_wx_uuid() {
        let page = r#"<img class="qrcode lightBorder" src="/connect/qrcode/071abcDEF123xyz" />"#;
        assert_eq!(extract_wx_uuid(page).as_deref(), Some("071abcDEF123xyz"));
        assert_eq!(extract_wx_uuid("<html></html>"), None);
    }

    #[test]
    fn test_parse_song_match() {
        let item = json!({
            "mid": "004Z8Ihr0JIu5s",
            "title": "七里香",
            "singer": [{"name": "周杰伦"}, {"name": "Other"}],
            "album": {"mid": "003DFRzD192KKD"},
        });
        let song = parse_song_match(&item).unwrap();
        assert_eq!(song.mid, "004Z8Ihr0JIu5s");
        assert_eq!(song.title, "七里香");
        assert_eq!(song.artist, "周杰伦");
        assert_eq!(song.album_mid, "003DFRzD192KKD");

        assert!(parse_song_match(&json!({"title": "no mid"})).is_none());
    }

    #[test]
    fn test_playable_url() {
        let data = json!({"midurlinfo": [{"purl": "M800abc.mp3?vkey=1"}]});
        assert_eq!(
            playable_url(&data).as_deref(),
            Some("https://isure.stream.qqmusic.qq.com/M800abc.mp3?vkey=1")
        );
        assert_eq!(playable_url(&json!({"midurlinfo": [{"purl": ""}]})), None);
        assert_eq!(playable_url(&json!({})), None);
    }

    #[test]
    fn test_file_types() {
        assert_eq!(file_type(QualityTier::Lossless), ("F000", ".flac"));
        assert_eq!(file_type(QualityTier::High), ("M800", ".mp3"));
        assert_eq!(file_type(QualityTier::Standard), ("M500", ".mp3"));
    }

    #[test]
    fn test_comm_block_with_credential() {
        let cred = Credential {
            musicid: 42,
            musickey: "key".to_string(),
            login_type: 2,
            ..Default::default()
        };
        let comm = comm_block(Some(&cred), None);
        assert_eq!(comm["qq"], "42");
        assert_eq!(comm["authst"], "key");
        assert_eq!(comm["tmeLoginType"], "2");

        let anonymous = comm_block(None, Some(1));
        assert!(anonymous.get("authst").is_none());
        assert_eq!(anonymous["tmeLoginType"], "1");
    }

    #[test]
    fn test_credential_from_login() {
        let data = json!({"musicid": 7, "musickey": "Q_H_L_abc", "refresh_key": "rk", "refresh_token": "rt"});
        let cred = credential_from_login(0, data, 1).unwrap();
        assert_eq!(cred.musicid, 7);
        assert_eq!(cred.login_type, 1);

        assert!(credential_from_login(0, json!({"musicid": 7}), 1).is_err());
        assert!(credential_from_login(1000, json!({}), 1).is_err());
    }

    #[test]
    fn test_login_response_extras_are_persisted() {
        let data = json!({"musicid": 7, "musickey": "Q_H_L_abc", "keyExpiresIn": 259200, "first_login": 0});
        let cred = credential_from_login(0, data, 2).unwrap();
        assert_eq!(cred.extra_fields["keyExpiresIn"], 259200);

        let bytes = serde_json::to_vec_pretty(&cred).unwrap();
        let reloaded: Credential = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reloaded.extra_fields["keyExpiresIn"], 259200);
        assert_eq!(reloaded.extra_fields["first_login"], 0);
        assert_eq!(reloaded, cred);
    }

    #[test]
    fn test_collect_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("qrsig=abc123; Path=/; Domain=ptlogin2.qq.com"));
        headers.append(SET_COOKIE, HeaderValue::from_static("empty=; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("p_skey=xyz; HttpOnly"));

        assert_eq!(cookie_value(&headers, "qrsig").as_deref(), Some("abc123"));
        assert_eq!(cookie_value(&headers, "empty"), None);
        assert_eq!(collect_cookies(&headers).len(), 2);
    }

    #[test]
    fn test_query_param() {
        assert_eq!(
            query_param("https://y.qq.com/portal/wx_redirect.html?login_type=1&code=ABC", "code").as_deref(),
            Some("ABC")
        );
        assert_eq!(query_param("not a url", "code"), None);
    }
}
