use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{subscriber_from_row, PostgresDb};
use crate::domain::subscription::{
    models::{email::SubscriberEmail, subscriber::Subscriber, token::SubscriptionToken},
    ports::{SubscriberRepository, SubscriberRepositoryError},
};

const SUBSCRIBER_COLUMNS: &str = "id, email, name, status, confirmation_token, \
     unsubscribe_token, source, confirmed_at, unsubscribed_at, created_at, updated_at";

impl PostgresDb {
    async fn find_subscriber_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let query = format!(
            "SELECT {} FROM subscribers WHERE {} = $1",
            SUBSCRIBER_COLUMNS, predicate
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(self.pool())
            .await
            .map_err(anyhow::Error::from)
            .context("Failed to query the subscribers table")?;

        row.as_ref().map(subscriber_from_row).transpose()
    }
}

#[async_trait]
impl SubscriberRepository for PostgresDb {
    #[tracing::instrument(name = "Fetch subscriber by email", skip(self, email))]
    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        self.find_subscriber_where("email", email.as_ref()).await
    }

    #[tracing::instrument(name = "Fetch subscriber by confirmation token", skip(self, token))]
    async fn find_by_confirmation_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        self.find_subscriber_where("confirmation_token", token.as_ref())
            .await
    }

    #[tracing::instrument(name = "Fetch subscriber by unsubscribe token", skip(self, token))]
    async fn find_by_unsubscribe_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        self.find_subscriber_where("unsubscribe_token", token.as_ref())
            .await
    }

    /// The unique index on the normalized email is the concurrency guard:
    /// the conditional `ON CONFLICT ... DO UPDATE` only resumes rows that
    /// are unsubscribed, and returns nothing otherwise.
    #[tracing::instrument(name = "Upserting a pending subscriber", skip(self, subscriber))]
    async fn upsert_pending(
        &self,
        subscriber: Subscriber,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let query = format!(
            r#"
            INSERT INTO subscribers
                (id, email, name, status, confirmation_token, unsubscribe_token,
                 source, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT (email) DO UPDATE
                SET status = EXCLUDED.status,
                    name = EXCLUDED.name,
                    source = EXCLUDED.source,
                    confirmation_token = EXCLUDED.confirmation_token,
                    unsubscribe_token = EXCLUDED.unsubscribe_token,
                    updated_at = EXCLUDED.updated_at
                WHERE subscribers.status = 'unsubscribed'
            RETURNING {}
            "#,
            SUBSCRIBER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(subscriber.id)
            .bind(subscriber.email.as_ref())
            .bind(subscriber.name.as_ref().map(|n| n.as_ref()))
            .bind(subscriber.status.as_str())
            .bind(subscriber.confirmation_token.as_ref().map(|t| t.as_ref()))
            .bind(subscriber.unsubscribe_token.as_ref())
            .bind(subscriber.source.as_deref())
            .bind(subscriber.created_at)
            .fetch_optional(self.pool())
            .await
            .map_err(anyhow::Error::from)
            .context("Failed to upsert a pending subscriber")?;

        row.as_ref().map(subscriber_from_row).transpose()
    }

    #[tracing::instrument(name = "Mark subscriber as confirmed", skip(self, token))]
    async fn confirm(
        &self,
        subscriber_id: Uuid,
        token: &SubscriptionToken,
        at: DateTime<Utc>,
    ) -> Result<bool, SubscriberRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE subscribers
            SET status = 'confirmed', confirmed_at = $2,
                confirmation_token = NULL, updated_at = $2
            WHERE id = $1 AND confirmation_token = $3
            "#,
        )
        .bind(subscriber_id)
        .bind(at)
        .bind(token.as_ref())
        .execute(self.pool())
        .await
        .map_err(anyhow::Error::from)
        .context("Failed to mark a subscriber as confirmed")?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Mark subscriber as unsubscribed", skip(self))]
    async fn unsubscribe(
        &self,
        subscriber_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SubscriberRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE subscribers
            SET status = 'unsubscribed', unsubscribed_at = $2, updated_at = $2
            WHERE id = $1 AND status <> 'unsubscribed'
            "#,
        )
        .bind(subscriber_id)
        .bind(at)
        .execute(self.pool())
        .await
        .map_err(anyhow::Error::from)
        .context("Failed to mark a subscriber as unsubscribed")?;

        Ok(result.rows_affected() > 0)
    }
}
