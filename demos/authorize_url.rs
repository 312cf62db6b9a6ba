//! Example: build the web OAuth authorization URL
//!
//! Running this example:
//! ```bash
//! WX_APPID=wx... WX_APPSECRET=... WX_REDIRECT_URI=https://example.com/wx/callback \
//! cargo run --example authorize_url -- snsapi_userinfo
//! ```
//!
//! Open the printed URL inside WeChat; after consent WeChat redirects to
//! `WX_REDIRECT_URI?code=CODE&state=STATE`.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use tracing_subscriber::FmtSubscriber;
use wxoauth_rs::{OAuthClient, OAuthConfig, Scope};

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let _ = dotenv();

    let cfg = OAuthConfig::from_env().context("WX_APPID / WX_APPSECRET required")?;
    let scope: Scope = env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("snsapi_base")
        .parse()?;

    let req = cfg.authorization_request()?.with_scope(scope);
    let client = OAuthClient::default();
    let auth = client.build_authorization_url(&req)?;

    println!("scope: {scope}");
    println!("state: {}", auth.state);
    println!("url:   {}", auth.url);
    Ok(())
}
