use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::MessageBody;
use crate::inbound::http::router::AppState;

/// Responds with the same body for registered and unknown emails; only the
/// rate limit can turn this into an error.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let Some(email) = body.email.filter(|e| !e.is_empty()) else {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    };

    state.auth_service.forgot_password(&email).await?;

    Ok(Json(MessageBody::new(
        "If this email exists, a reset link has been sent",
    )))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequest {
    email: Option<String>,
}
