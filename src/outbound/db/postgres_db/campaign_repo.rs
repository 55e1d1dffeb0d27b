use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{campaign_from_row, subscriber_from_row, PostgresDb};
use crate::domain::campaign::{
    errors::CampaignRepositoryError,
    models::campaign::{Campaign, CampaignSend},
    ports::CampaignRepository,
};
use crate::domain::subscription::models::subscriber::Subscriber;

#[async_trait]
impl CampaignRepository for PostgresDb {
    #[tracing::instrument(name = "Scanning for due campaigns", skip(self))]
    async fn due_campaigns(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Campaign>, CampaignRepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, status, subject, content_html, content_text,
                   scheduled_at, sent_at, sent_to_count
            FROM campaigns
            WHERE status = 'scheduled'
              AND scheduled_at IS NOT NULL
              AND scheduled_at <= $1
            ORDER BY scheduled_at
            "#,
        )
        .bind(now)
        .fetch_all(self.pool())
        .await
        .context("Failed to scan the campaigns table for due campaigns")?;

        rows.iter().map(campaign_from_row).collect()
    }

    #[tracing::instrument(name = "Claiming a campaign for sending", skip(self))]
    async fn claim(&self, campaign_id: Uuid) -> Result<bool, CampaignRepositoryError> {
        let result = sqlx::query(
            r#"UPDATE campaigns SET status = 'sending' WHERE id = $1 AND status = 'scheduled'"#,
        )
        .bind(campaign_id)
        .execute(self.pool())
        .await
        .context("Failed to claim a campaign")?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Finalizing a dispatched campaign", skip(self))]
    async fn finalize(
        &self,
        campaign_id: Uuid,
        sent_at: DateTime<Utc>,
        sent_to_count: i64,
    ) -> Result<(), CampaignRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'sent', sent_at = $2, sent_to_count = $3
            WHERE id = $1 AND status = 'sending'
            "#,
        )
        .bind(campaign_id)
        .bind(sent_at)
        .bind(sent_to_count)
        .execute(self.pool())
        .await
        .context("Failed to finalize a campaign")?;

        if result.rows_affected() == 0 {
            return Err(CampaignRepositoryError::Unexpected(anyhow::anyhow!(
                "Campaign {} was not in the sending state at finalize time",
                campaign_id
            )));
        }
        Ok(())
    }

    #[tracing::instrument(name = "Recording a campaign send", skip(self, send))]
    async fn record_send(&self, send: CampaignSend) -> Result<(), CampaignRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_sends
                (id, campaign_id, subscriber_id, status, error_message, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(send.id)
        .bind(send.campaign_id)
        .bind(send.subscriber_id)
        .bind(send.status.as_str())
        .bind(send.error_message.as_deref())
        .bind(send.sent_at)
        .execute(self.pool())
        .await
        .context("Failed to insert a campaign send row")?;

        Ok(())
    }

    #[tracing::instrument(name = "Fetching the confirmed recipient set", skip(self))]
    async fn confirmed_subscribers(
        &self,
    ) -> Result<Vec<Subscriber>, CampaignRepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, name, status, confirmation_token, unsubscribe_token,
                   source, confirmed_at, unsubscribed_at, created_at, updated_at
            FROM subscribers
            WHERE status = 'confirmed'
            "#,
        )
        .fetch_all(self.pool())
        .await
        .context("Failed to fetch confirmed subscribers")?;

        rows.iter()
            .map(|row| subscriber_from_row(row).map_err(CampaignRepositoryError::from))
            .collect()
    }
}
