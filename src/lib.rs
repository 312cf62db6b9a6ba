#![doc = r#"
wxoauth-rs

Client for the WeChat Official Account web OAuth2 authorization flow
(网页授权).

Operations live on `OAuthClient` and are re-exported at the crate root:
- `build_authorization_url`: authorization page URL + state (no network)
- `exchange_code_for_token`: code or callback URL → access_token/refresh_token
- `refresh_token`: refresh an expired access_token
- `fetch_user_info`: user profile (requires `snsapi_userinfo`)
- `check_token_validity` / `is_token_valid`: access_token liveness

Each network operation issues exactly one GET and never retries. Token storage
and refresh scheduling are left to the application.

Quick usage:

```ignore
use wxoauth_rs::{AuthorizationRequest, OAuthClient, Scope};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = OAuthClient::default();

    let auth = client.build_authorization_url(
        &AuthorizationRequest::new("your_appid", "https://example.com/wx/callback")
            .with_scope(Scope::UserInfo),
    )?;
    println!("redirect the user to {}", auth.url);

    // Later, in the callback handler:
    let token = client
        .exchange_code_for_token("your_appid", "https://example.com/wx/callback?code=CODE&state=STATE", "your_secret")
        .await?;
    let user = client.fetch_user_info(&token.access_token, &token.openid, None).await?;
    println!("hello {}", user.nickname);

    Ok(())
}
```
"#]

pub mod access_token;
pub mod authorize;
pub mod check;
pub mod client;
pub mod config;
pub mod errors;
pub mod state;
pub mod userinfo;

pub use access_token::{AuthorizationCode, TokenResponse};
pub use authorize::{AuthorizationRequest, AuthorizationResult, Scope};
pub use client::*;
pub use config::OAuthConfig;
pub use state::generate_state;
pub use userinfo::{Lang, Sex, UserInfo};
