use auth::role::RoleParseError;
use auth::Role;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::PhoneError;

pub async fn signup<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<ApiSuccess<SignupResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .user_service
        .signup(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|id| {
            ApiSuccess::new(
                StatusCode::CREATED,
                SignupResponseData {
                    inserted_id: id.to_string(),
                },
            )
        })
}

/// HTTP request body for signing up (raw JSON)
///
/// Every field is optional here so that a missing field is reported as a
/// validation failure rather than a deserialization one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseSignupRequestError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid phone: {0}")]
    Phone(#[from] PhoneError),

    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),

    #[error("Invalid role: {0}")]
    Role(#[from] RoleParseError),
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ParseSignupRequestError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ParseSignupRequestError::Missing(field))
}

impl SignupRequest {
    fn try_into_command(self) -> Result<SignupCommand, ParseSignupRequestError> {
        let email = EmailAddress::new(required(self.email, "email")?)?;
        // Present is enough; whitespace counts toward the length policy
        let password = Password::new(
            self.password
                .ok_or(ParseSignupRequestError::Missing("password"))?,
        )?;
        let phone = PhoneNumber::new(required(self.phone, "phone")?)?;
        let first_name = PersonName::new(required(self.first_name, "first_name")?)?;
        let last_name = PersonName::new(required(self.last_name, "last_name")?)?;
        let role = required(self.role, "role")?.parse::<Role>()?;

        Ok(SignupCommand {
            email,
            password,
            phone,
            first_name,
            last_name,
            role,
        })
    }
}

impl From<ParseSignupRequestError> for ApiError {
    fn from(err: ParseSignupRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupResponseData {
    #[serde(rename = "InsertedID")]
    pub inserted_id: String,
}
