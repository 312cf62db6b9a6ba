//! Web OAuth access_token: code exchange and refresh.
//!
//! Code exchange (GET):
//!   https://api.weixin.qq.com/sns/oauth2/access_token?appid=APPID&secret=SECRET&code=CODE&grant_type=authorization_code
//!
//! Refresh (GET):
//!   https://api.weixin.qq.com/sns/oauth2/refresh_token?appid=APPID&grant_type=refresh_token&refresh_token=REFRESH_TOKEN
//!
//! Successful response example:
//! {
//!   "access_token": "ACCESS_TOKEN",
//!   "expires_in": 7200,
//!   "refresh_token": "REFRESH_TOKEN",
//!   "openid": "OPENID",
//!   "scope": "SCOPE",
//!   "is_snapshotuser": 1,
//!   "unionid": "UNIONID"
//! }
//!
//! Error response example:
//! { "errcode": 40029, "errmsg": "invalid code" }
//!
//! Notes:
//! - This web OAuth access_token is per-user and differs from the basic
//!   `cgi-bin/token` access_token.
//! - A code can be used once and expires after 5 minutes.
//! - access_token lives 7200s; refresh_token lives 30 days. Refreshing before
//!   expiry is up to the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::authorize::is_absolute_http_url;
use crate::client::{
    Error, OAuthClient, Result, endpoint_url, from_value, has_str_field, redact_id, rejection,
    require,
};

/// Successful access_token response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds (nominally 7200)
    #[serde(default)]
    pub expires_in: u32,
    /// Valid for 30 days
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub openid: String,
    /// Comma separated scopes the user granted
    #[serde(default)]
    pub scope: String,
    /// Present when the account is bound to an Open Platform account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unionid: Option<String>,
    /// 1 when the user is a "snapshot page" virtual user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_snapshotuser: Option<u8>,
    /// Echo of the callback `state`; `None` for refreshes and bare codes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TokenResponse {
    /// Epoch seconds at which the access_token expires, given the epoch
    /// seconds at which the response was received.
    pub fn expires_at(&self, received_at: i64) -> i64 {
        received_at + i64::from(self.expires_in)
    }
}

/// Authorization code plus the state that came with it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationCode {
    pub code: String,
    pub state: Option<String>,
}

impl AuthorizationCode {
    /// Accept either a bare code or the full callback URL.
    ///
    /// An absolute http(s) URL has `code` and `state` pulled from its query;
    /// anything else is taken verbatim as the code.
    pub fn from_input(input: &str) -> Result<Self> {
        require("code", input)?;
        if !is_absolute_http_url(input) {
            return Ok(Self {
                code: input.to_string(),
                state: None,
            });
        }

        let url = reqwest::Url::parse(input)
            .map_err(|e| Error::InvalidInput(format!("callback url is malformed: {e}")))?;
        let mut code = None;
        let mut state = None;
        for (k, v) in url.query_pairs() {
            match &*k {
                "code" if code.is_none() => code = Some(v.into_owned()),
                "state" if state.is_none() => state = Some(v.into_owned()),
                _ => {}
            }
        }
        match code {
            Some(code) if !code.is_empty() => Ok(Self { code, state }),
            _ => Err(Error::InvalidInput(
                "callback url carries no `code` parameter".to_string(),
            )),
        }
    }
}

impl OAuthClient {
    /// Exchange an authorization code for a user access_token.
    ///
    /// - appid / secret: Official Account credentials (secret is never logged)
    /// - code_or_callback: the `code` value, or the whole callback URL
    #[instrument(level = "debug", skip_all)]
    pub async fn exchange_code_for_token(
        &self,
        appid: &str,
        code_or_callback: &str,
        secret: &str,
    ) -> Result<TokenResponse> {
        require("appid", appid)?;
        require("code", code_or_callback)?;
        require("secret", secret)?;
        let AuthorizationCode { code, state } = AuthorizationCode::from_input(code_or_callback)?;

        let url = endpoint_url(
            &self.endpoints().access_token,
            &[
                ("appid", appid),
                ("secret", secret),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
            ],
        )?;
        debug!(
            appid = %redact_id(appid),
            has_state = state.is_some(),
            "exchanging authorization code"
        );

        let mut token = self.request_token(url).await?;
        token.state = state;
        Ok(token)
    }

    /// Refresh a user access_token. The returned `state` is always `None`.
    #[instrument(level = "debug", skip_all)]
    pub async fn refresh_token(&self, appid: &str, refresh_token: &str) -> Result<TokenResponse> {
        require("appid", appid)?;
        require("refresh_token", refresh_token)?;

        let url = endpoint_url(
            &self.endpoints().refresh_token,
            &[
                ("appid", appid),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )?;
        debug!(appid = %redact_id(appid), "refreshing access_token");

        let mut token = self.request_token(url).await?;
        token.state = None;
        Ok(token)
    }

    async fn request_token(&self, url: reqwest::Url) -> Result<TokenResponse> {
        let (status, body) = self.get_json(url).await?;
        if !has_str_field(&body, "access_token") {
            return Err(rejection(status, &body, "access_token"));
        }
        let token: TokenResponse = from_value(status, body)?;
        debug!(
            openid = %redact_id(&token.openid),
            expires_in = token.expires_in,
            scope = %token.scope,
            "access_token issued"
        );
        Ok(token)
    }
}
