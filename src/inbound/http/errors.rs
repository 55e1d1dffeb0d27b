use crate::domain::campaign::errors::DispatchError;
use crate::domain::subscription::errors::SubscriptionError;

use actix_web::HttpResponse;
use actix_web::{http::StatusCode, ResponseError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not authorized: {0}")]
    AuthError(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<SubscriptionError> for AppError {
    fn from(error: SubscriptionError) -> Self {
        match error {
            SubscriptionError::ValidationError(s) => AppError::ValidationError(s),
            SubscriptionError::AlreadySubscribed => {
                AppError::Conflict("Email is already subscribed".into())
            }
            SubscriptionError::ConfirmationPending => {
                AppError::Conflict("A confirmation is already pending for this email".into())
            }
            SubscriptionError::InvalidToken => {
                AppError::AuthError("The token is unknown or no longer valid".into())
            }
            SubscriptionError::NotFound(s) => AppError::NotFound(s),
            SubscriptionError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::new(self.status_code())
    }
}
