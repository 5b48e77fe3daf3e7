use argon2::password_hash::Error as ArError;
use axum::{http::StatusCode, response::IntoResponse};
use jsonwebtoken::errors::Error as JWError;
use surrealdb::Error as SError;

use thiserror::Error;
use tracing::error;

use crate::models::user::Role;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Argon 2 Error: {0}")]
    Argon2Error(#[from] ArError),

    #[error("Json web token Error: {0}")]
    JwtError(#[from] JWError),

    #[error("SurrealDb Error: {0}")]
    SurrealError(#[from] SError),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validator Error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Json Rejection Error: {0}")]
    AxumJsonRejection(#[from] axum::extract::rejection::JsonRejection),

    #[error("No user record found")]
    UserNotFound,
    #[error("No teacher record found")]
    TeacherNotFound,
    #[error("No appointment record found")]
    AppointmentNotFound,

    #[error("Accounts with role `{0}` cannot be created here")]
    InvalidRole(Role),
    #[error("An account with email `{0}` already exists!")]
    EmailInUse(String),
    #[error("Account provisioning failed: {0}")]
    ProvisioningError(String),
    #[error("Admin setup has already been completed")]
    SetupAlreadyComplete,

    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Password is too weak")]
    WeakPassword,
    #[error("No user is currently signed in")]
    NotSignedIn,

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),
    #[error("Date and time do not form a valid instant")]
    InvalidDatetime,

    #[error("Appointment belongs to another teacher")]
    NotYourAppointment,
    #[error("Appointment is no longer pending")]
    AppointmentClosed,

    // ! Bearer auth
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid authorization token")]
    InvalidToken,
    #[error("Invalid authorization scheme")]
    InvalidScheme,
    #[error("Token expired")]
    TokenExpired,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Error::Argon2Error(error) => {
                error!("Argon 2 Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::JwtError(error) => {
                error!("JWT Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::SurrealError(error) => {
                error!("Surreal Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::IoError(error) => {
                error!("Io Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::ValidationError(error) => {
                let message = format!("Input validation error: [{}]", error).replace('\n', ", ");
                (StatusCode::BAD_REQUEST, message)
            }
            Error::AxumJsonRejection(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            Error::UserNotFound | Error::TeacherNotFound | Error::AppointmentNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Error::InvalidRole(_)
            | Error::WeakPassword
            | Error::MissingField(_)
            | Error::InvalidDatetime => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::EmailInUse(_) | Error::SetupAlreadyComplete | Error::AppointmentClosed => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Error::ProvisioningError(ref message) => {
                error!("Provisioning Error:{:#?}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            Error::InvalidCredentials | Error::NotSignedIn => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Error::NotYourAppointment => (StatusCode::FORBIDDEN, self.to_string()),
            Error::MissingToken | Error::InvalidToken | Error::InvalidScheme
            | Error::TokenExpired => (StatusCode::UNAUTHORIZED, self.to_string()),
        };
        (status, message).into_response()
    }
}
