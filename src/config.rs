//! Credentials from the environment.
//!
//! Environment variables:
//! - WX_APPID: Official Account appid (wx...)
//! - WX_APPSECRET: Official Account appsecret
//! - WX_REDIRECT_URI: optional default callback URL for the authorization page
//!
//! Call `dotenvy::dotenv()` first if you keep them in a `.env` file.

use std::fmt;

use crate::authorize::AuthorizationRequest;
use crate::client::{Error, Result};

pub const ENV_APPID: &str = "WX_APPID";
pub const ENV_APPSECRET: &str = "WX_APPSECRET";
pub const ENV_REDIRECT_URI: &str = "WX_REDIRECT_URI";

/// Official Account credentials for the web OAuth flow
#[derive(Clone)]
pub struct OAuthConfig {
    pub appid: String,
    pub secret: String,
    pub redirect_uri: Option<String>,
}

// secret stays out of Debug output
impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("appid", &self.appid)
            .field("secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl OAuthConfig {
    pub fn new(appid: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            appid: appid.into(),
            secret: secret.into(),
            redirect_uri: None,
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Read `WX_APPID`, `WX_APPSECRET` and (optionally) `WX_REDIRECT_URI`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            get(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::InvalidInput(format!("environment variable {name} is not set")))
        };
        Ok(Self {
            appid: required(ENV_APPID)?,
            secret: required(ENV_APPSECRET)?,
            redirect_uri: get(ENV_REDIRECT_URI).filter(|v| !v.trim().is_empty()),
        })
    }

    /// Authorization request for the configured redirect_uri.
    pub fn authorization_request(&self) -> Result<AuthorizationRequest> {
        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .ok_or_else(|| Error::InvalidInput(format!("{ENV_REDIRECT_URI} is not configured")))?;
        Ok(AuthorizationRequest::new(self.appid.clone(), redirect_uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn reads_all_variables() {
        let cfg = OAuthConfig::from_lookup(lookup(&[
            (ENV_APPID, "wxabc"),
            (ENV_APPSECRET, "s3cret"),
            (ENV_REDIRECT_URI, "https://example.com/cb"),
        ]))
        .expect("config");
        assert_eq!(cfg.appid, "wxabc");
        assert_eq!(cfg.secret, "s3cret");
        let req = cfg.authorization_request().expect("request");
        assert_eq!(req.redirect_uri, "https://example.com/cb");
        assert_eq!(req.appid, "wxabc");
    }

    #[test]
    fn missing_secret_names_the_variable() {
        let err = OAuthConfig::from_lookup(lookup(&[(ENV_APPID, "wxabc")])).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains(ENV_APPSECRET));
    }

    #[test]
    fn redirect_uri_is_optional() {
        let cfg = OAuthConfig::from_lookup(lookup(&[(ENV_APPID, "wxabc"), (ENV_APPSECRET, "s")]))
            .expect("config");
        assert_eq!(cfg.redirect_uri, None);
        assert!(cfg.authorization_request().is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let cfg = OAuthConfig::new("wxabc", "topsecret");
        let s = format!("{cfg:?}");
        assert!(!s.contains("topsecret"));
        assert!(s.contains("wxabc"));
    }
}
