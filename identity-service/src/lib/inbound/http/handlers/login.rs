use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    };

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    let outcome = state
        .auth_service
        .login(&email, &password, user_agent)
        .await?;

    // The refresh token travels only in the cookie, never in the body.
    let cookie = cookies::refresh_cookie(
        &outcome.refresh_token,
        state.refresh_max_age,
        state.cookie_secure,
    );
    let cookie = cookies::to_header_value(&cookie)?;

    let mut response = Json(LoginResponseData {
        access_token: outcome.access_token,
        user: AccountData::from(&outcome.account),
    })
    .into_response();
    response.headers_mut().append(SET_COOKIE, cookie);

    Ok(response)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub access_token: String,
    pub user: AccountData,
}
