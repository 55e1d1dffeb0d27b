use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle transitions worth an audit trail entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Subscribed,
    Confirmed,
    Unsubscribed,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Subscribed => "subscribed",
            LifecycleEvent::Confirmed => "confirmed",
            LifecycleEvent::Unsubscribed => "unsubscribed",
        }
    }
}

/// Append-only record of one lifecycle transition for one subscriber.
#[derive(Debug, Clone)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub event_type: LifecycleEvent,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(subscriber_id: Uuid, event_type: LifecycleEvent, metadata: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscriber_id,
            event_type,
            metadata,
            created_at: Utc::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AnalyticsRepositoryError {
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync + 'static {
    async fn record(&self, event: AnalyticsEvent) -> Result<(), AnalyticsRepositoryError>;
}
