use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::SubscriptionError;
use super::models::{
    email::{EmailError, SubscriberEmail},
    subscriber::{NewSubscriberRequest, Subscriber},
    token::{SubscriptionToken, TokenRequest},
};

#[derive(thiserror::Error, Debug)]
pub enum SubscriberRepositoryError {
    /// A stored row no longer satisfies the domain's validation rules.
    #[error("Invalid subscriber record: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Persistence-facing operations on subscriber records.
///
/// The conditional mutations (`confirm`, `unsubscribe`) report whether a
/// row was actually affected so callers can detect a lost race instead of
/// double-firing side effects.
#[async_trait]
pub trait SubscriberRepository: Send + Sync + 'static {
    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError>;

    async fn find_by_confirmation_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError>;

    async fn find_by_unsubscribe_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError>;

    /// Inserts the pending record, or resumes an unsubscribed record for
    /// the same email (fresh tokens, `pending` again). Returns `None` when
    /// the email already belongs to a row that is not resumable; the
    /// unique-key conflict on the normalized email is the concurrency
    /// guard for duplicate submissions.
    async fn upsert_pending(
        &self,
        subscriber: Subscriber,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError>;

    /// Transitions to `confirmed` only if the confirmation token still
    /// matches at write time; clears the token and sets `confirmed_at`.
    async fn confirm(
        &self,
        subscriber_id: Uuid,
        token: &SubscriptionToken,
        at: DateTime<Utc>,
    ) -> Result<bool, SubscriberRepositoryError>;

    /// Transitions to `unsubscribed` only if not already unsubscribed.
    async fn unsubscribe(
        &self,
        subscriber_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SubscriberRepositoryError>;
}

#[derive(thiserror::Error, Debug)]
pub enum NotifierError {
    #[error("Validation error: {0}")]
    InvalidEmailMessage(#[from] EmailError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Sends the lifecycle emails (confirmation link, welcome note).
#[async_trait]
pub trait SubscriptionNotifier: Send + Sync + 'static {
    async fn send_confirmation(
        &self,
        recipient: &SubscriberEmail,
        token: &SubscriptionToken,
    ) -> Result<(), NotifierError>;

    async fn send_welcome(&self, recipient: &SubscriberEmail) -> Result<(), NotifierError>;
}

/// Self-service opt-out, by unsubscribe token or by email address.
#[derive(serde::Deserialize, Debug)]
pub struct UnsubscribeRequest {
    pub token: Option<String>,
    pub email: Option<String>,
}

#[derive(serde::Serialize, Debug, PartialEq, Eq)]
pub struct ConfirmOutcome {
    pub subscriber_id: Uuid,
    pub already_confirmed: bool,
}

#[derive(serde::Serialize, Debug, PartialEq, Eq)]
pub struct UnsubscribeOutcome {
    pub subscriber_id: Uuid,
    pub already_unsubscribed: bool,
}

#[async_trait]
pub trait SubscriptionService: Send + Sync + 'static {
    async fn subscribe(
        &self,
        req: NewSubscriberRequest,
    ) -> Result<Subscriber, SubscriptionError>;

    async fn confirm(&self, req: TokenRequest) -> Result<ConfirmOutcome, SubscriptionError>;

    async fn unsubscribe(
        &self,
        req: UnsubscribeRequest,
    ) -> Result<UnsubscribeOutcome, SubscriptionError>;
}
