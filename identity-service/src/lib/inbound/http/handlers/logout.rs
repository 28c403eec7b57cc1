use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use super::ApiError;
use super::MessageBody;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Revokes the presented session and clears the cookie. Succeeds with no
/// cookie too, so a half-logged-out client can always converge.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = cookies::extract_refresh_token(&headers);

    state.auth_service.logout(token.as_deref()).await?;

    let cleared = cookies::clear_refresh_cookie(state.cookie_secure);
    let cleared = cookies::to_header_value(&cleared)?;

    let mut response = Json(MessageBody::new("Logged out successfully")).into_response();
    response.headers_mut().append(SET_COOKIE, cleared);

    Ok(response)
}
