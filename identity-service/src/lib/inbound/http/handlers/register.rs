use std::str::FromStr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Profile;
use crate::domain::account::models::Role;
use crate::domain::auth::models::RegisterCommand;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponseData>), ApiError> {
    let command = body.try_into_command()?;

    let outcome = state.auth_service.register(command).await?;

    let message = if outcome.verification_email_sent {
        "Registration successful. Please check your email to verify your account."
    } else {
        "Registration successful, but the verification email could not be sent. \
         Please request a new one."
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponseData {
            user: AccountData::from(&outcome.account),
            message: message.to_string(),
        }),
    ))
}

/// Raw registration body. Everything optional so missing fields produce a
/// 400 with the expected message instead of an axum deserialization reject.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
    company_name: Option<String>,
    stage: Option<String>,
    expertise: Option<OneOrMany>,
    hourly_rate: Option<f64>,
}

/// Expertise arrives as either a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => {
                if s.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![s]
                }
            }
            OneOrMany::Many(items) => items,
        }
    }
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        let (Some(name), Some(email), Some(password), Some(role)) =
            (self.name, self.email, self.password, self.role)
        else {
            return Err(ApiError::BadRequest("All fields are required".to_string()));
        };

        if name.trim().is_empty() || email.is_empty() || password.is_empty() || role.is_empty() {
            return Err(ApiError::BadRequest("All fields are required".to_string()));
        }

        if password.len() < 8 {
            return Err(ApiError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let email = EmailAddress::new(email)
            .map_err(|_| ApiError::BadRequest("Valid email required".to_string()))?;
        let role = Role::from_str(&role)
            .map_err(|_| ApiError::BadRequest("Invalid role".to_string()))?;

        // Fields outside the chosen role are dropped rather than rejected.
        let profile = match role {
            Role::Startup => Profile {
                company_name: self.company_name,
                stage: self.stage,
                ..Profile::default()
            },
            Role::Expert => Profile {
                expertise: self.expertise.map(OneOrMany::into_vec).unwrap_or_default(),
                hourly_rate: self.hourly_rate,
                ..Profile::default()
            },
            _ => Profile::default(),
        };

        Ok(RegisterCommand {
            name,
            email,
            password,
            role,
            profile,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterResponseData {
    pub user: AccountData,
    pub message: String,
}
