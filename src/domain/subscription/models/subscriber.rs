use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    email::{EmailError, SubscriberEmail},
    name::{SubscriberName, SubscriberNameError},
    token::SubscriptionToken,
};

/// Raw subscription payload as it arrives on the wire.
#[derive(serde::Deserialize, Debug)]
pub struct NewSubscriberRequest {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

impl NewSubscriberRequest {
    pub fn new(email: &str, name: Option<&str>, source: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            name: name.map(str::to_string),
            source: source.map(str::to_string),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SubscriberValidationError {
    #[error("Invalid subscriber name: {0}")]
    InvalidName(#[from] SubscriberNameError),
    #[error("Invalid subscriber email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// A validated subscription request, not yet persisted.
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub name: Option<SubscriberName>,
    pub source: Option<String>,
}

impl TryFrom<NewSubscriberRequest> for NewSubscriber {
    type Error = SubscriberValidationError;

    fn try_from(request: NewSubscriberRequest) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(request.email)?;
        // An empty name field on the form means "no name given".
        let name = match request.name.map(|n| n.trim().to_string()) {
            Some(n) if !n.is_empty() => Some(SubscriberName::parse(n)?),
            _ => None,
        };
        let source = request
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(Self {
            email,
            name,
            source,
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SubscriberStatusError {
    #[error("Unknown subscriber status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SubscriberStatus {
    Pending,
    Confirmed,
    Unsubscribed,
}

impl SubscriberStatus {
    const PENDING: &'static str = "pending";
    const CONFIRMED: &'static str = "confirmed";
    const UNSUBSCRIBED: &'static str = "unsubscribed";

    pub fn parse(status: &str) -> Result<SubscriberStatus, SubscriberStatusError> {
        match status {
            Self::PENDING => Ok(SubscriberStatus::Pending),
            Self::CONFIRMED => Ok(SubscriberStatus::Confirmed),
            Self::UNSUBSCRIBED => Ok(SubscriberStatus::Unsubscribed),
            _ => Err(SubscriberStatusError::UnknownStatus(status.into())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberStatus::Pending => Self::PENDING,
            SubscriberStatus::Confirmed => Self::CONFIRMED,
            SubscriberStatus::Unsubscribed => Self::UNSUBSCRIBED,
        }
    }
}

/// A persisted subscriber record tracked through the consent lifecycle.
///
/// The confirmation token is present only while the record is pending;
/// the unsubscribe token lives as long as the record does.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: SubscriberEmail,
    pub name: Option<SubscriberName>,
    pub status: SubscriberStatus,
    pub confirmation_token: Option<SubscriptionToken>,
    pub unsubscribe_token: SubscriptionToken,
    pub source: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscriber {
    /// Builds a fresh pending record with newly issued tokens.
    pub fn pending(
        new_subscriber: NewSubscriber,
        confirmation_token: SubscriptionToken,
        unsubscribe_token: SubscriptionToken,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: new_subscriber.email,
            name: new_subscriber.name,
            status: SubscriberStatus::Pending,
            confirmation_token: Some(confirmation_token),
            unsubscribe_token,
            source: new_subscriber.source,
            confirmed_at: None,
            unsubscribed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
