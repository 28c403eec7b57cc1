use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::MessageBody;
use crate::inbound::http::router::AppState;

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let Some(token) = body.token.filter(|t| !t.is_empty()) else {
        return Err(ApiError::BadRequest("Token is required".to_string()));
    };

    state.auth_service.verify_email(&token).await?;

    Ok(Json(MessageBody::new("Email verified successfully")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyEmailRequest {
    token: Option<String>,
}
