use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponseData>, ApiError> {
    let token = cookies::extract_refresh_token(&headers);

    let access_token = state.auth_service.refresh(token.as_deref()).await?;

    Ok(Json(RefreshResponseData { access_token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponseData {
    pub access_token: String,
}
