//! Example: finish the web OAuth flow from a callback
//!
//! Running this example:
//! ```bash
//! WX_APPID=wx... WX_APPSECRET=... \
//! cargo run --example oauth_flow -- 'https://example.com/wx/callback?code=CODE&state=STATE'
//! ```
//!
//! The argument may be the whole callback URL or just the code. Codes are
//! single-use and expire after 5 minutes.
//!
//! Steps:
//! 1. Exchange code → access_token / refresh_token
//! 2. Check access_token validity
//! 3. Fetch user info (only works for snsapi_userinfo)
//! 4. Refresh the access_token

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;
use wxoauth_rs::{Lang, OAuthClient, OAuthConfig, Scope, errors::explain};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let _ = dotenv();

    let cfg = OAuthConfig::from_env().context("WX_APPID / WX_APPSECRET required")?;
    let Some(input) = env::args().nth(1) else {
        bail!("usage: oauth_flow <callback-url-or-code>");
    };

    let client = OAuthClient::default();

    // 1. code → token
    let token = match client
        .exchange_code_for_token(&cfg.appid, &input, &cfg.secret)
        .await
    {
        Ok(t) => t,
        Err(e) => {
            if let Some(code) = e.errcode() {
                eprintln!("[ERR] {}", explain(code, &e.to_string()));
            }
            return Err(e.into());
        }
    };
    info!(
        openid = %token.openid,
        scope = %token.scope,
        expires_in = token.expires_in,
        state = ?token.state,
        "access_token obtained"
    );

    // 2. liveness
    let valid = client
        .is_token_valid(&token.access_token, &token.openid)
        .await?;
    println!("access_token valid: {valid}");

    // 3. profile
    if token.scope.split(',').any(|s| s == Scope::UserInfo.as_str()) {
        let user = client
            .fetch_user_info(&token.access_token, &token.openid, Some(Lang::ZhCn))
            .await?;
        println!(
            "user: nickname={} sex={:?} region={}/{}/{} unionid={:?}",
            user.nickname,
            user.sex(),
            user.country,
            user.province,
            user.city,
            user.unionid
        );
    } else {
        warn!("scope is {}; skipping userinfo", token.scope);
    }

    // 4. refresh
    let refreshed = client.refresh_token(&cfg.appid, &token.refresh_token).await?;
    println!(
        "refreshed: expires_in={}s, refresh_token unchanged={}",
        refreshed.expires_in,
        refreshed.refresh_token == token.refresh_token
    );

    Ok(())
}
