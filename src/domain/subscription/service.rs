use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;

use crate::domain::analytics::{AnalyticsEvent, AnalyticsRepository, LifecycleEvent};

use super::{
    errors::SubscriptionError,
    models::{
        subscriber::{NewSubscriber, NewSubscriberRequest, Subscriber, SubscriberStatus},
        token::{SubscriptionToken, TokenRequest},
    },
    ports::{
        ConfirmOutcome, SubscriberRepository, SubscriptionNotifier, SubscriptionService,
        UnsubscribeOutcome, UnsubscribeRequest,
    },
};
use crate::domain::subscription::models::email::SubscriberEmail;

/// Owns the subscribe -> confirm -> unsubscribe state machine and the
/// token issuance rules around it.
#[derive(Debug)]
pub struct SubscriptionLifecycle<R, A, N>
where
    R: SubscriberRepository,
    A: AnalyticsRepository,
    N: SubscriptionNotifier,
{
    repo: Arc<R>,
    analytics: Arc<A>,
    notifier: Arc<N>,
}

impl<R, A, N> SubscriptionLifecycle<R, A, N>
where
    R: SubscriberRepository,
    A: AnalyticsRepository,
    N: SubscriptionNotifier,
{
    pub fn new(repo: Arc<R>, analytics: Arc<A>, notifier: Arc<N>) -> Self {
        Self {
            repo,
            analytics,
            notifier,
        }
    }

    /// Analytics is an audit trail, not a dependency of the state machine;
    /// a recorder failure is logged and never fails the operation.
    async fn record_event(
        &self,
        subscriber_id: uuid::Uuid,
        event_type: LifecycleEvent,
        metadata: serde_json::Value,
    ) {
        let event = AnalyticsEvent::new(subscriber_id, event_type, metadata);
        if let Err(error) = self.analytics.record(event).await {
            tracing::warn!(
                error.cause_chain = ?error,
                "Failed to record a lifecycle analytics event",
            );
        }
    }

    /// Maps an existing row to the conflict result a repeat subscriber sees.
    fn conflict_for(existing: &Subscriber) -> SubscriptionError {
        match existing.status {
            SubscriberStatus::Confirmed => SubscriptionError::AlreadySubscribed,
            _ => SubscriptionError::ConfirmationPending,
        }
    }
}

#[async_trait]
impl<R, A, N> SubscriptionService for SubscriptionLifecycle<R, A, N>
where
    R: SubscriberRepository,
    A: AnalyticsRepository,
    N: SubscriptionNotifier,
{
    #[tracing::instrument(
        name = "Adding a new subscriber",
        skip(self, req),
        fields(subscriber_email = %req.email)
    )]
    async fn subscribe(&self, req: NewSubscriberRequest) -> Result<Subscriber, SubscriptionError> {
        let new_subscriber: NewSubscriber = req.try_into()?;

        if let Some(existing) = self.repo.find_by_email(&new_subscriber.email).await? {
            if existing.status != SubscriberStatus::Unsubscribed {
                // No token reissue and no resend while a confirmation is
                // pending or the email is already confirmed.
                return Err(Self::conflict_for(&existing));
            }
        }

        let confirmation_token = SubscriptionToken::generate();
        let unsubscribe_token = SubscriptionToken::generate();
        let email = new_subscriber.email.clone();
        let source = new_subscriber.source.clone();
        let pending = Subscriber::pending(
            new_subscriber,
            confirmation_token.clone(),
            unsubscribe_token,
            Utc::now(),
        );

        let stored = match self.repo.upsert_pending(pending).await? {
            Some(stored) => stored,
            // Lost a race against a concurrent subscribe for the same
            // email; re-read to report the accurate conflict.
            None => {
                return Err(match self.repo.find_by_email(&email).await? {
                    Some(existing) => Self::conflict_for(&existing),
                    None => SubscriptionError::ConfirmationPending,
                });
            }
        };

        self.record_event(
            stored.id,
            LifecycleEvent::Subscribed,
            serde_json::json!({ "source": source }),
        )
        .await;

        self.notifier
            .send_confirmation(&stored.email, &confirmation_token)
            .await
            .context("Failed to send a confirmation email")?;

        Ok(stored)
    }

    #[tracing::instrument(name = "Confirm a pending subscriber", skip(self, req))]
    async fn confirm(&self, req: TokenRequest) -> Result<ConfirmOutcome, SubscriptionError> {
        let token = SubscriptionToken::parse(req.token)?;
        let subscriber = self
            .repo
            .find_by_confirmation_token(&token)
            .await?
            .ok_or(SubscriptionError::InvalidToken)?;

        if subscriber.status == SubscriberStatus::Confirmed {
            // Confirmation links get prefetched and re-clicked; repeating
            // the operation must not mutate anything.
            return Ok(ConfirmOutcome {
                subscriber_id: subscriber.id,
                already_confirmed: true,
            });
        }

        let updated = self.repo.confirm(subscriber.id, &token, Utc::now()).await?;
        if !updated {
            // The token no longer matched at write time: a concurrent
            // confirm got there first. Side effects already fired once.
            return Ok(ConfirmOutcome {
                subscriber_id: subscriber.id,
                already_confirmed: true,
            });
        }

        self.record_event(
            subscriber.id,
            LifecycleEvent::Confirmed,
            serde_json::json!({}),
        )
        .await;

        if let Err(error) = self.notifier.send_welcome(&subscriber.email).await {
            tracing::warn!(
                error.cause_chain = ?error,
                "Failed to send the welcome email; the confirmation stands",
            );
        }

        Ok(ConfirmOutcome {
            subscriber_id: subscriber.id,
            already_confirmed: false,
        })
    }

    #[tracing::instrument(name = "Removing a subscriber", skip(self, req))]
    async fn unsubscribe(
        &self,
        req: UnsubscribeRequest,
    ) -> Result<UnsubscribeOutcome, SubscriptionError> {
        let subscriber = match (req.token, req.email) {
            (Some(raw_token), _) => {
                let token = SubscriptionToken::parse(raw_token)
                    .map_err(|_| SubscriptionError::NotFound("unknown token".into()))?;
                self.repo.find_by_unsubscribe_token(&token).await?
            }
            (None, Some(raw_email)) => {
                let email = SubscriberEmail::parse(raw_email)
                    .map_err(|e| SubscriptionError::ValidationError(e.to_string()))?;
                self.repo.find_by_email(&email).await?
            }
            (None, None) => {
                return Err(SubscriptionError::ValidationError(
                    "Either a token or an email is required to unsubscribe".into(),
                ))
            }
        }
        .ok_or_else(|| SubscriptionError::NotFound("no matching subscriber".into()))?;

        if subscriber.status == SubscriberStatus::Unsubscribed {
            return Ok(UnsubscribeOutcome {
                subscriber_id: subscriber.id,
                already_unsubscribed: true,
            });
        }

        let updated = self.repo.unsubscribe(subscriber.id, Utc::now()).await?;
        if !updated {
            return Ok(UnsubscribeOutcome {
                subscriber_id: subscriber.id,
                already_unsubscribed: true,
            });
        }

        self.record_event(
            subscriber.id,
            LifecycleEvent::Unsubscribed,
            serde_json::json!({}),
        )
        .await;

        Ok(UnsubscribeOutcome {
            subscriber_id: subscriber.id,
            already_unsubscribed: false,
        })
    }
}
