use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::http::HeaderValue;

use crate::inbound::http::handlers::ApiError;

/// Cookie carrying the refresh token plaintext.
///
/// HttpOnly keeps it away from scripts; SameSite=Lax keeps it off
/// cross-site POSTs; Path=/ so the refresh and logout endpoints both see it.
pub const REFRESH_COOKIE: &str = "refreshToken";

pub fn refresh_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{REFRESH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// An expired replacement cookie; browsers drop the stored one on receipt.
pub fn clear_refresh_cookie(secure: bool) -> String {
    refresh_cookie("", 0, secure)
}

/// Encode a built cookie string for the Set-Cookie header.
///
/// Only fails if the token carried a control byte; the detail goes to the
/// logs and the client gets the generic 500 line.
pub fn to_header_value(cookie: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(cookie).map_err(|e| {
        tracing::error!(error = %e, "Refresh cookie is not a valid header value");
        ApiError::InternalServerError("Server error".to_string())
    })
}

/// Pull the refresh token out of the Cookie header, if present.
pub fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            pair.trim()
                .strip_prefix(REFRESH_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .map(ToString::to_string)
        })
}
