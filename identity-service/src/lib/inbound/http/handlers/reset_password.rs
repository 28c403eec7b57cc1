use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::MessageBody;
use crate::inbound::http::router::AppState;

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let (Some(token), Some(new_password)) = (body.token, body.new_password) else {
        return Err(ApiError::BadRequest(
            "Token and new password are required".to_string(),
        ));
    };
    if token.is_empty() || new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Token and new password are required".to_string(),
        ));
    }
    if new_password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    state
        .auth_service
        .reset_password(&token, &new_password)
        .await?;

    Ok(Json(MessageBody::new("Password reset successful")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    token: Option<String>,
    new_password: Option<String>,
}
