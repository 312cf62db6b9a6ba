//! Authorization page URL construction.
//!
//! The end user is redirected to:
//!   https://open.weixin.qq.com/connect/oauth2/authorize?appid=APPID&redirect_uri=REDIRECT_URI&response_type=code&scope=SCOPE&state=STATE#wechat_redirect
//!
//! After consent WeChat redirects to `redirect_uri?code=CODE&state=STATE`; pass
//! that URL (or the bare code) to `OAuthClient::exchange_code_for_token`.
//!
//! Scopes:
//! - `snsapi_base`: silent, only yields openid
//! - `snsapi_userinfo`: asks for consent, allows `sns/userinfo`. Users who already
//!   follow the account and enter from a session or menu are authorized silently
//!   even under this scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{Error, OAuthClient, Result, endpoint_url, redact_id, require};
use crate::state::generate_state;

/// OAuth scope requested on the authorization page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[default]
    #[serde(rename = "snsapi_base")]
    Base,
    #[serde(rename = "snsapi_userinfo")]
    UserInfo,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Base => "snsapi_base",
            Scope::UserInfo => "snsapi_userinfo",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snsapi_base" => Ok(Scope::Base),
            "snsapi_userinfo" => Ok(Scope::UserInfo),
            other => Err(Error::InvalidInput(format!("unknown scope: {other}"))),
        }
    }
}

/// Parameters for the authorization page
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
    pub appid: String,
    /// Absolute http(s) URL WeChat redirects back to
    pub redirect_uri: String,
    /// Caller correlation token; a fresh one is generated when `None` or empty
    pub state: Option<String>,
    pub scope: Scope,
}

impl AuthorizationRequest {
    pub fn new(appid: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            appid: appid.into(),
            redirect_uri: redirect_uri.into(),
            state: None,
            scope: Scope::default(),
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

/// URL to redirect the user to, plus the state embedded in it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationResult {
    pub url: String,
    pub state: String,
}

impl OAuthClient {
    /// Build the authorization page URL. No network call is made.
    ///
    /// Fails with `Error::InvalidInput` when `appid` is empty or `redirect_uri`
    /// is not an absolute http/https URL.
    pub fn build_authorization_url(&self, req: &AuthorizationRequest) -> Result<AuthorizationResult> {
        require("appid", &req.appid)?;
        if !is_absolute_http_url(&req.redirect_uri) {
            return Err(Error::InvalidInput(format!(
                "redirect_uri must be an absolute http(s) url: {:?}",
                req.redirect_uri
            )));
        }
        if req.appid.starts_with("ww") {
            warn!(
                "appid starts with 'ww' (likely a WeCom corpid); web OAuth expects an Official Account appid"
            );
        }

        let state = match req.state.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => generate_state(),
        };

        let mut url = endpoint_url(
            &self.endpoints().authorize,
            &[
                ("appid", req.appid.as_str()),
                ("redirect_uri", req.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", req.scope.as_str()),
                ("state", state.as_str()),
            ],
        )?;
        url.set_fragment(Some("wechat_redirect"));

        debug!(
            appid = %redact_id(&req.appid),
            scope = %req.scope,
            "built authorization url"
        );
        Ok(AuthorizationResult {
            url: url.to_string(),
            state,
        })
    }
}

/// `^(http|https)://`
pub(crate) fn is_absolute_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Endpoints;
    use reqwest::Url;

    const REDIRECT: &str = "https://example.com/wx/callback?from=menu";
    const REDIRECT_ENCODED: &str = "https%3A%2F%2Fexample.com%2Fwx%2Fcallback%3Ffrom%3Dmenu";
    const AUTHORIZE_PREFIX: &str = "https://open.weixin.qq.com/connect/oauth2/authorize?appid=";

    #[test]
    fn url_contains_all_parameters() {
        let client = OAuthClient::default();
        let req = AuthorizationRequest::new("wx520c15f417810387", REDIRECT)
            .with_state("STATE123")
            .with_scope(Scope::UserInfo);
        let res = client.build_authorization_url(&req).expect("url");

        assert_eq!(res.state, "STATE123");
        assert!(res.url.starts_with(AUTHORIZE_PREFIX));
        assert!(res.url.contains("appid=wx520c15f417810387"));
        assert!(res.url.contains(&format!("redirect_uri={REDIRECT_ENCODED}")));
        assert!(res.url.contains("response_type=code"));
        assert!(res.url.contains("scope=snsapi_userinfo"));
        assert!(res.url.contains("state=STATE123"));
        assert!(res.url.ends_with("#wechat_redirect"));
    }

    #[test]
    fn query_round_trips_redirect_uri() {
        let client = OAuthClient::default();
        let res = client
            .build_authorization_url(&AuthorizationRequest::new("wxabc", REDIRECT))
            .expect("url");
        let url = Url::parse(&res.url).expect("parse");
        let redirect = url
            .query_pairs()
            .find(|(k, _)| k == "redirect_uri")
            .map(|(_, v)| v.into_owned());
        assert_eq!(redirect.as_deref(), Some(REDIRECT));
        assert_eq!(url.fragment(), Some("wechat_redirect"));
    }

    #[test]
    fn defaults_to_base_scope_and_generated_state() {
        let client = OAuthClient::default();
        let req = AuthorizationRequest::new("wxabc", "http://example.com/cb");
        let a = client.build_authorization_url(&req).expect("a");
        let b = client.build_authorization_url(&req).expect("b");

        assert!(a.url.contains("scope=snsapi_base"));
        assert!(!a.state.is_empty());
        assert_ne!(a.state, b.state);
        assert!(a.url.contains(&format!("state={}", a.state)));
    }

    #[test]
    fn empty_state_is_replaced() {
        let client = OAuthClient::default();
        let req = AuthorizationRequest::new("wxabc", "http://example.com/cb").with_state("");
        let res = client.build_authorization_url(&req).expect("url");
        assert!(!res.state.is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        let client = OAuthClient::default();
        for (appid, redirect) in [
            ("", "https://example.com/cb"),
            ("wxabc", "not-a-url"),
            ("wxabc", ""),
            ("wxabc", "ftp://example.com/cb"),
            ("wxabc", "//example.com/cb"),
        ] {
            let err = client
                .build_authorization_url(&AuthorizationRequest::new(appid, redirect))
                .unwrap_err();
            assert!(err.is_invalid_input(), "{appid:?} {redirect:?}");
        }
    }

    #[test]
    fn honours_authorize_override() {
        let endpoints = Endpoints::default().with_authorize("https://open.example.test/oauth2/authorize");
        let client = OAuthClient::default().with_endpoints(endpoints);
        let res = client
            .build_authorization_url(&AuthorizationRequest::new("wxabc", "https://example.com/cb"))
            .expect("url");
        assert!(
            res.url
                .starts_with("https://open.example.test/oauth2/authorize?appid=wxabc&"),
            "{}",
            res.url
        );
        assert!(res.url.ends_with("#wechat_redirect"));
    }

    #[test]
    fn bad_authorize_override_is_invalid_url() {
        let client =
            OAuthClient::default().with_endpoints(Endpoints::default().with_authorize("not a url"));
        let err = client
            .build_authorization_url(&AuthorizationRequest::new("wxabc", "https://example.com/cb"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn scope_parses_and_serializes() {
        assert_eq!("snsapi_userinfo".parse::<Scope>().unwrap(), Scope::UserInfo);
        assert_eq!("snsapi_base".parse::<Scope>().unwrap(), Scope::Base);
        assert!("snsapi_login".parse::<Scope>().is_err());
        assert_eq!(
            serde_json::to_string(&Scope::UserInfo).unwrap(),
            "\"snsapi_userinfo\""
        );
    }
}
