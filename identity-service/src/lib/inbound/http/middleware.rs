use std::future::Future;
use std::pin::Pin;

use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::account::models::PublicAccount;
use crate::domain::account::models::Role;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the authenticated account through a request.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub PublicAccount);

/// Middleware that resolves the bearer token to an account.
///
/// The verified and suspended gates run inside `current_account`, so a
/// token issued before a suspension stops working immediately.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let account = state
        .auth_service
        .current_account(token)
        .await
        .map_err(ApiError::from)?;

    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}

/// Role gate for routes already behind [`authenticate`].
///
/// Returns a closure usable with `axum::middleware::from_fn`; requests whose
/// account role is not in `allowed` get a 403 without reaching the handler.
pub fn require_roles(
    allowed: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>
       + Clone
       + Send {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let role = req
                .extensions()
                .get::<CurrentAccount>()
                .map(|current| current.0.role)
                .ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))?;

            if !allowed.contains(&role) {
                return Err(ApiError::Forbidden(
                    "Forbidden: insufficient permissions".to_string(),
                ));
            }

            Ok(next.run(req).await)
        })
    }
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Not authorized".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))
}
