use axum::Extension;
use axum::Json;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use crate::inbound::http::middleware::CurrentAccount;

/// The account was already resolved and gate-checked by the auth middleware.
pub async fn me(
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<MeResponseData>, ApiError> {
    Ok(Json(MeResponseData {
        user: AccountData::from(&current.0),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub user: AccountData,
}
