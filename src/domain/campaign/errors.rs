use super::models::campaign::{CampaignStatusError, SendStatusError};
use crate::domain::subscription::ports::SubscriberRepositoryError;

#[derive(thiserror::Error, Debug)]
pub enum CampaignRepositoryError {
    /// A stored row no longer satisfies the domain's validation rules.
    #[error("Invalid campaign record: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<CampaignStatusError> for CampaignRepositoryError {
    fn from(error: CampaignStatusError) -> Self {
        Self::InvalidRecord(error.to_string())
    }
}

impl From<SendStatusError> for CampaignRepositoryError {
    fn from(error: SendStatusError) -> Self {
        Self::InvalidRecord(error.to_string())
    }
}

impl From<SubscriberRepositoryError> for CampaignRepositoryError {
    fn from(error: SubscriberRepositoryError) -> Self {
        match error {
            SubscriberRepositoryError::InvalidRecord(e) => Self::InvalidRecord(e),
            SubscriberRepositoryError::Unexpected(e) => Self::Unexpected(e),
        }
    }
}

/// Raised only when a dispatch run cannot start at all (the due-campaign
/// scan failed); everything after that is isolated per campaign and
/// reported, not raised.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Typed failure from the delivery provider for a single recipient.
#[derive(thiserror::Error, Debug)]
#[error("Delivery failed: {message}")]
pub struct DeliveryError {
    pub message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
