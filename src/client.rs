//! WeChat web OAuth2 client core.
//!
//! Holds the HTTP client and endpoint configuration shared by every operation,
//! plus the unified error type and the GET + JSON decode path.
//!
//! Design:
//! - `OAuthClient` wraps `reqwest::Client`; it keeps no per-call state, so clones
//!   are cheap and may be used concurrently.
//! - Endpoints are plain immutable values. `Endpoints::default()` targets the
//!   WeChat production hosts; `Endpoints::with_api_base` points the API calls at a
//!   mock server.
//! - Token persistence and refresh scheduling belong to the application layer.
//!
//! Endpoints:
//! - Authorization page: https://open.weixin.qq.com/connect/oauth2/authorize
//! - Code exchange:      GET https://api.weixin.qq.com/sns/oauth2/access_token
//! - Token refresh:      GET https://api.weixin.qq.com/sns/oauth2/refresh_token
//! - User info:          GET https://api.weixin.qq.com/sns/userinfo
//! - Token check:        GET https://api.weixin.qq.com/sns/auth

use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::errors::{self, ErrorHelp};

pub const AUTHORIZE_ENDPOINT: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
pub const ACCESS_TOKEN_ENDPOINT: &str = "https://api.weixin.qq.com/sns/oauth2/access_token";
pub const REFRESH_TOKEN_ENDPOINT: &str = "https://api.weixin.qq.com/sns/oauth2/refresh_token";
pub const USERINFO_ENDPOINT: &str = "https://api.weixin.qq.com/sns/userinfo";
pub const AUTH_CHECK_ENDPOINT: &str = "https://api.weixin.qq.com/sns/auth";

const MAX_BODY_IN_ERROR: usize = 2048;

/// Upstream endpoint URLs used by [`OAuthClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Authorization page the end user is redirected to
    pub authorize: String,
    /// Code → access_token exchange
    pub access_token: String,
    /// refresh_token → access_token
    pub refresh_token: String,
    /// User profile
    pub userinfo: String,
    /// access_token liveness check
    pub auth: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize: AUTHORIZE_ENDPOINT.to_string(),
            access_token: ACCESS_TOKEN_ENDPOINT.to_string(),
            refresh_token: REFRESH_TOKEN_ENDPOINT.to_string(),
            userinfo: USERINFO_ENDPOINT.to_string(),
            auth: AUTH_CHECK_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Rebase the four `api.weixin.qq.com` endpoints onto `base`
    /// (e.g. `http://127.0.0.1:8080`). The authorization page is left untouched.
    pub fn with_api_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authorize: AUTHORIZE_ENDPOINT.to_string(),
            access_token: format!("{base}/sns/oauth2/access_token"),
            refresh_token: format!("{base}/sns/oauth2/refresh_token"),
            userinfo: format!("{base}/sns/userinfo"),
            auth: format!("{base}/sns/auth"),
        }
    }

    /// Override the authorization page URL
    pub fn with_authorize(mut self, authorize: impl Into<String>) -> Self {
        self.authorize = authorize.into();
        self
    }
}

/// Unified error type
#[derive(Debug, Error)]
pub enum Error {
    /// Missing/empty parameter or malformed input; raised before any request is sent
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Endpoint override that does not parse as a URL
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("undecodable response (status {status}): {error}; body: {body}")]
    Decode {
        status: u16,
        error: String,
        body: String,
    },

    #[error("weixin error {code}: {message}")]
    Wx { code: i64, message: String },

    #[error("unexpected response (status {status}): missing `{field}`; body: {body}")]
    UnexpectedResponse {
        status: u16,
        field: &'static str,
        body: String,
    },
}

impl Error {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    /// Transport-level failure (DNS, connect, timeout, body read)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// The body was valid JSON but WeChat did not report success
    pub fn is_upstream_rejected(&self) -> bool {
        matches!(self, Error::Wx { .. } | Error::UnexpectedResponse { .. })
    }

    /// WeChat errcode, when the upstream returned one
    pub fn errcode(&self) -> Option<i64> {
        match self {
            Error::Wx { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Structured guidance for a WeChat errcode (see [`crate::errors`])
    pub fn help(&self) -> Option<ErrorHelp> {
        self.errcode().map(errors::lookup)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Client for the WeChat web OAuth2 flow
///
/// - Wraps `reqwest::Client`
/// - Every network operation issues exactly one GET and never retries
#[derive(Clone, Debug)]
pub struct OAuthClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl Default for OAuthClient {
    fn default() -> Self {
        let http = reqwest::Client::builder()
            .gzip(true)
            .build()
            .expect("reqwest::Client build must succeed");
        Self {
            http,
            endpoints: Endpoints::default(),
        }
    }
}

impl OAuthClient {
    /// Use a custom `reqwest::Client`
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoints: Endpoints::default(),
        }
    }

    /// Replace the endpoint set (mock servers, proxies)
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Issue a GET and decode the body as JSON.
    ///
    /// Returns the HTTP status with the parsed value; the caller decides which
    /// field signals success.
    pub(crate) async fn get_json(&self, url: Url) -> Result<(u16, Value)> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(v) => Ok((status, v)),
            Err(de_err) => Err(Error::Decode {
                status,
                error: de_err.to_string(),
                body: redact_body(&bytes),
            }),
        }
    }
}

/// Parse an endpoint template and append query pairs in order.
pub(crate) fn endpoint_url(endpoint: &str, pairs: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    {
        let mut qp = url.query_pairs_mut();
        for (k, v) in pairs {
            qp.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Reject empty (or whitespace-only) required parameters.
pub(crate) fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{name} must not be empty")));
    }
    Ok(())
}

/// True when `field` is present as a non-empty string.
pub(crate) fn has_str_field(v: &Value, field: &str) -> bool {
    v.get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Map a JSON body that lacks the success field to an error.
///
/// An explicit `errcode` becomes `Error::Wx`; otherwise the (redacted) body is
/// reported as an unexpected response.
pub(crate) fn rejection(status: u16, v: &Value, field: &'static str) -> Error {
    if let Some(code) = v.get("errcode").and_then(Value::as_i64) {
        let message = v
            .get("errmsg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        debug!(code, %message, "weixin rejected request");
        return Error::Wx { code, message };
    }
    Error::UnexpectedResponse {
        status,
        field,
        body: redact_value(v.clone()),
    }
}

/// Deserialize a JSON value already known to carry the success field.
pub(crate) fn from_value<T: serde::de::DeserializeOwned>(status: u16, v: Value) -> Result<T> {
    T::deserialize(&v).map_err(|e| Error::Decode {
        status,
        error: e.to_string(),
        body: redact_value(v.clone()),
    })
}

/// Short hint for ids in logs, e.g. `wx***ef`
pub(crate) fn redact_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 4 {
        let head: String = chars.iter().take(2).collect();
        format!("{head}***")
    } else {
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{head}***{tail}")
    }
}

const SENSITIVE_FIELDS: [&str; 2] = ["access_token", "refresh_token"];

fn redact_value(mut v: Value) -> String {
    if let Some(obj) = v.as_object_mut() {
        for field in SENSITIVE_FIELDS {
            if obj.contains_key(field) {
                obj.insert(field.to_string(), Value::String("[redacted]".into()));
            }
        }
    }
    let mut body = v.to_string();
    truncate_body(&mut body);
    body
}

fn redact_body(bytes: &[u8]) -> String {
    let mut body = String::from_utf8_lossy(bytes).to_string();
    truncate_body(&mut body);
    body
}

fn truncate_body(body: &mut String) {
    if body.len() > MAX_BODY_IN_ERROR {
        let mut cut = MAX_BODY_IN_ERROR;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
}
