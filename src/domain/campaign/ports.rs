use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{CampaignRepositoryError, DeliveryError, DispatchError};
use super::models::{
    campaign::{Campaign, CampaignSend},
    report::DispatchReport,
};
use crate::domain::subscription::models::{email::EmailMessage, email::SubscriberEmail, subscriber::Subscriber};

/// Persistence operations on campaign records and their send audit rows.
#[async_trait]
pub trait CampaignRepository: Send + Sync + 'static {
    /// All campaigns with `status = scheduled` and a schedule time at or
    /// before `now`.
    async fn due_campaigns(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Campaign>, CampaignRepositoryError>;

    /// Atomic conditional transition `scheduled -> sending`. Returns
    /// `false` when zero rows were affected, i.e. a concurrent run
    /// already claimed the campaign. This is the sole serialization
    /// point preventing a double send.
    async fn claim(&self, campaign_id: Uuid) -> Result<bool, CampaignRepositoryError>;

    /// Transition `sending -> sent`, setting `sent_at` and the final
    /// success count exactly once.
    async fn finalize(
        &self,
        campaign_id: Uuid,
        sent_at: DateTime<Utc>,
        sent_to_count: i64,
    ) -> Result<(), CampaignRepositoryError>;

    /// Appends one per-recipient outcome row.
    async fn record_send(&self, send: CampaignSend) -> Result<(), CampaignRepositoryError>;

    /// The full confirmed-subscriber recipient set.
    async fn confirmed_subscribers(&self)
        -> Result<Vec<Subscriber>, CampaignRepositoryError>;
}

/// External delivery provider boundary: one rendered message, one
/// recipient, success or a typed failure. No retries here.
#[async_trait]
pub trait EmailDelivery: Send + Sync + 'static {
    async fn deliver(
        &self,
        recipient: &SubscriberEmail,
        message: &EmailMessage,
    ) -> Result<(), DeliveryError>;
}

#[async_trait]
pub trait DispatchService: Send + Sync + 'static {
    async fn run_scheduled_dispatch(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DispatchReport, DispatchError>;
}
