use anyhow::Context;
use async_trait::async_trait;

use super::PostgresDb;
use crate::domain::analytics::{AnalyticsEvent, AnalyticsRepository, AnalyticsRepositoryError};

#[async_trait]
impl AnalyticsRepository for PostgresDb {
    #[tracing::instrument(name = "Recording a lifecycle event", skip(self, event))]
    async fn record(&self, event: AnalyticsEvent) -> Result<(), AnalyticsRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, subscriber_id, event_type, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id)
        .bind(event.subscriber_id)
        .bind(event.event_type.as_str())
        .bind(event.metadata)
        .bind(event.created_at)
        .execute(self.pool())
        .await
        .context("Failed to insert an analytics event")?;

        Ok(())
    }
}
