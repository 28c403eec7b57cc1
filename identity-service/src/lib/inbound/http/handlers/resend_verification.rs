use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::MessageBody;
use crate::inbound::http::router::AppState;

/// Responds identically whether or not the email is registered.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(body): Json<ResendVerificationRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let Some(email) = body.email.filter(|e| !e.is_empty()) else {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    };

    state.auth_service.resend_verification(&email).await?;

    Ok(Json(MessageBody::new("Verification email resent")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResendVerificationRequest {
    email: Option<String>,
}
