use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No user is signed in on this device")]
    NoUser,
    #[error("Phone number has not been verified on this device")]
    NotVerified,
    #[error("Invalid phone number")]
    InvalidPhone,
    #[error("Invalid verification code")]
    InvalidOtp,
    #[error("Verification code expired")]
    OtpExpired,
    #[error("Unknown user type: {0}")]
    InvalidUserType(String),
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("stored profile is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NoUser | SessionError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            SessionError::InvalidPhone
            | SessionError::InvalidOtp
            | SessionError::InvalidUserType(_)
            | SessionError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            SessionError::NotVerified => StatusCode::FORBIDDEN,
            SessionError::OtpExpired => StatusCode::GONE,
            SessionError::Database(_) | SessionError::Hash(_) | SessionError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "session request failed");
            return HttpResponse::build(status).json(json!({ "error": "Internal server error" }));
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}
