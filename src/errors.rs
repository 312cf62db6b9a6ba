//! errcode helpers for the web OAuth endpoints
//!
//! Purpose
//! - Map the errcode values returned by `sns/oauth2/*`, `sns/userinfo` and
//!   `sns/auth` to categories and hints
//! - Tell whether the caller should refresh the access_token or send the user
//!   back through the authorization page
//!
//! Notes
//! - Branch on `errcode`, never on `errmsg`; the message text is diagnostic only.
//! - This crate never retries; the advice here is for the calling application.
//! - Unknown codes are categorized as `Unknown` with no refresh/re-authorize advice.

/// High-level classification for an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// errcode = 0
    Success,
    /// System busy (safe to try again later)
    TemporarySystem,
    /// appid/secret problems; fix configuration
    Credential,
    /// code or refresh_token is invalid, used or expired; the user has to authorize again
    Grant,
    /// access_token invalid or expired; refresh it
    AccessToken,
    /// Missing or malformed request parameter
    InvalidParam,
    /// Scope or account permission insufficient for the API
    Unauthorized,
    Unknown,
}

/// A compact, friendly explanation for an errcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorHelp {
    pub code: i64,
    pub category: ErrorCategory,
    /// Short, stable summary for the code
    pub summary: &'static str,
    /// Actionable hint for mitigation
    pub hint: &'static str,
    /// Whether refreshing the access_token (with the refresh_token) should help
    pub refresh_token: bool,
    /// Whether the user must go through the authorization page again
    pub reauthorize: bool,
}

/// Classify errcode into a category.
pub fn category_for(code: i64) -> ErrorCategory {
    match code {
        0 => ErrorCategory::Success,
        -1 => ErrorCategory::TemporarySystem,
        40013 | 40125 | 41002 | 41004 => ErrorCategory::Credential,
        40029 | 40030 | 40163 | 42002 | 42003 => ErrorCategory::Grant,
        40001 | 40014 | 41001 | 42001 => ErrorCategory::AccessToken,
        40003 | 41003 | 41008 => ErrorCategory::InvalidParam,
        48001 | 50001 => ErrorCategory::Unauthorized,
        _ => ErrorCategory::Unknown,
    }
}

/// Returns a friendly hint for a known errcode.
pub fn hint_for(code: i64) -> &'static str {
    match code {
        -1 => "System busy; try again after a short delay.",
        0 => "Success.",
        40001 => {
            "Invalid credential; on sns/userinfo or sns/auth the access_token is invalid (refresh it), on code exchange the appsecret is wrong."
        }
        40003 => "Invalid openid; use the openid returned with this access_token.",
        40013 => "Invalid appid; check the Official Account appid (starts with 'wx').",
        40014 => "Invalid access_token; refresh it with the refresh_token.",
        40029 => {
            "Invalid code; codes are single-use and tied to the appid that built the authorization url."
        }
        40030 => "Invalid refresh_token; send the user through the authorization page again.",
        40125 => "Invalid appsecret; verify it in the Official Account admin console.",
        40163 => "Code has already been used; each code can be exchanged once.",
        41001 => "Missing access_token parameter.",
        41002 => "Missing appid parameter.",
        41003 => "Missing refresh_token parameter.",
        41004 => "Missing secret parameter.",
        41008 => "Missing code parameter.",
        42001 => "access_token expired (7200s); refresh it with the refresh_token.",
        42002 => "refresh_token expired (30 days); send the user through the authorization page again.",
        42003 => "Code expired (5 minutes); restart the authorization.",
        48001 => {
            "API unauthorized; sns/userinfo requires scope snsapi_userinfo, or the account lacks this permission."
        }
        50001 => "User has not authorized this API.",
        _ => "Unknown code; refer to official docs and logs for details.",
    }
}

/// Whether refreshing the access_token should resolve this code.
pub fn should_refresh_token(code: i64) -> bool {
    matches!(code, 40014 | 42001)
}

/// Whether the user has to be sent through the authorization page again.
pub fn should_reauthorize(code: i64) -> bool {
    matches!(code, 40029 | 40030 | 40163 | 42002 | 42003 | 48001 | 50001)
}

/// Build a structured help object for a given errcode.
pub fn lookup(code: i64) -> ErrorHelp {
    let summary = match code {
        -1 => "System busy",
        0 => "Success",
        40001 => "Invalid credential",
        40003 => "Invalid openid",
        40013 => "Invalid appid",
        40014 => "Invalid access_token",
        40029 => "Invalid code",
        40030 => "Invalid refresh_token",
        40125 => "Invalid appsecret",
        40163 => "Code been used",
        41001 => "Missing access_token",
        41002 => "Missing appid",
        41003 => "Missing refresh_token",
        41004 => "Missing secret",
        41008 => "Missing code",
        42001 => "access_token expired",
        42002 => "refresh_token expired",
        42003 => "Code expired",
        48001 => "API unauthorized",
        50001 => "User unauthorized",
        _ => "Unknown error",
    };

    ErrorHelp {
        code,
        category: category_for(code),
        summary,
        hint: hint_for(code),
        refresh_token: should_refresh_token(code),
        reauthorize: should_reauthorize(code),
    }
}

/// Produce a concise, human-readable explanation string.
pub fn explain(errcode: i64, errmsg: &str) -> String {
    let help = lookup(errcode);
    let mut parts = vec![
        format!("errcode={} ({:?})", help.code, help.category),
        help.summary.to_string(),
        format!("hint: {}", help.hint),
        format!("refresh_token: {}", yes_no(help.refresh_token)),
        format!("reauthorize: {}", yes_no(help.reauthorize)),
    ];
    if !errmsg.is_empty() {
        parts.push(format!("errmsg: {errmsg}"));
    }
    parts.join(" | ")
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

/// Return true if this error looks temporary.
pub fn is_temporary(code: i64) -> bool {
    matches!(category_for(code), ErrorCategory::TemporarySystem)
}

/// Return true if this looks like an appid/secret problem.
pub fn is_credential_issue(code: i64) -> bool {
    matches!(category_for(code), ErrorCategory::Credential)
}
