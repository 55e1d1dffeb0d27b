use super::models::subscriber::{SubscriberStatusError, SubscriberValidationError};
use super::models::token::SubscriptionTokenError;
use super::ports::{NotifierError, SubscriberRepositoryError};

/// Outcome taxonomy for the lifecycle operations.
///
/// Conflicts (`AlreadySubscribed`, `ConfirmationPending`) are informational
/// results, not system faults; `Unexpected` is the only variant that
/// signals a failing persistence or notification layer.
#[derive(thiserror::Error, Debug)]
pub enum SubscriptionError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("This email is already subscribed")]
    AlreadySubscribed,
    #[error("A confirmation for this email is already pending")]
    ConfirmationPending,
    #[error("There is no subscriber associated with the provided token")]
    InvalidToken,
    #[error("Subscriber not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<SubscriberValidationError> for SubscriptionError {
    fn from(error: SubscriberValidationError) -> Self {
        Self::ValidationError(error.to_string())
    }
}

impl From<SubscriberStatusError> for SubscriptionError {
    fn from(error: SubscriberStatusError) -> Self {
        Self::ValidationError(error.to_string())
    }
}

impl From<SubscriptionTokenError> for SubscriptionError {
    fn from(_: SubscriptionTokenError) -> Self {
        Self::InvalidToken
    }
}

impl From<SubscriberRepositoryError> for SubscriptionError {
    fn from(error: SubscriberRepositoryError) -> Self {
        match error {
            SubscriberRepositoryError::InvalidRecord(e) => {
                Self::Unexpected(anyhow::anyhow!("Stored subscriber record is invalid: {e}"))
            }
            SubscriberRepositoryError::Unexpected(e) => Self::Unexpected(e),
        }
    }
}

impl From<NotifierError> for SubscriptionError {
    fn from(error: NotifierError) -> Self {
        match error {
            NotifierError::InvalidEmailMessage(e) => Self::ValidationError(e.to_string()),
            NotifierError::Unexpected(e) => Self::Unexpected(e),
        }
    }
}
