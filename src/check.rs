//! Web OAuth access_token liveness check (sns/auth).
//!
//! Endpoint (GET):
//!   https://api.weixin.qq.com/sns/auth?access_token=ACCESS_TOKEN&openid=OPENID
//!
//! Valid:   { "errcode": 0, "errmsg": "ok" }
//! Invalid: { "errcode": 40003, "errmsg": "invalid openid" }

use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::{OAuthClient, Result, endpoint_url, redact_id, rejection, require};

impl OAuthClient {
    /// Check that `access_token` is currently valid for `openid`.
    ///
    /// Resolves `Ok(true)` only when WeChat answers `errcode` exactly 0. Any other
    /// errcode is `Error::Wx`; a body without errcode is `Error::UnexpectedResponse`.
    #[instrument(level = "debug", skip(self, access_token, openid))]
    pub async fn check_token_validity(&self, access_token: &str, openid: &str) -> Result<bool> {
        require("access_token", access_token)?;
        require("openid", openid)?;

        let url = endpoint_url(
            &self.endpoints().auth,
            &[("access_token", access_token), ("openid", openid)],
        )?;
        debug!(openid = %redact_id(openid), "auth check request");

        let (status, body) = self.get_json(url).await?;
        if body.get("errcode").and_then(Value::as_i64) == Some(0) {
            return Ok(true);
        }
        Err(rejection(status, &body, "errcode"))
    }

    /// Like [`check_token_validity`](Self::check_token_validity), but an upstream
    /// rejection reads as `Ok(false)`. Input, transport and decode failures still
    /// surface as errors.
    pub async fn is_token_valid(&self, access_token: &str, openid: &str) -> Result<bool> {
        match self.check_token_validity(access_token, openid).await {
            Ok(valid) => Ok(valid),
            Err(e) if e.is_upstream_rejected() => {
                debug!("token rejected: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
