use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::analytics::{AnalyticsEvent, AnalyticsRepository, AnalyticsRepositoryError};
use crate::domain::campaign::{
    errors::CampaignRepositoryError,
    models::campaign::{Campaign, CampaignSend, CampaignStatus},
    ports::CampaignRepository,
};
use crate::domain::subscription::{
    models::{
        email::SubscriberEmail,
        subscriber::{Subscriber, SubscriberStatus},
        token::SubscriptionToken,
    },
    ports::{SubscriberRepository, SubscriberRepositoryError},
};

/// Mutex-guarded in-process store with the same conditional-update
/// semantics as the Postgres adapter. Backs the test suites and any
/// deployment that does not need durability.
#[derive(Clone, Debug, Default)]
pub struct MemoryDb {
    inner: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    subscribers: HashMap<Uuid, Subscriber>,
    campaigns: HashMap<Uuid, Campaign>,
    sends: Vec<CampaignSend>,
    events: Vec<AnalyticsEvent>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.lock().expect("in-memory store mutex poisoned")
    }

    pub fn seed_subscriber(&self, subscriber: Subscriber) {
        self.state().subscribers.insert(subscriber.id, subscriber);
    }

    pub fn seed_campaign(&self, campaign: Campaign) {
        self.state().campaigns.insert(campaign.id, campaign);
    }

    pub fn campaign(&self, campaign_id: Uuid) -> Option<Campaign> {
        self.state().campaigns.get(&campaign_id).cloned()
    }

    pub fn subscriber(&self, subscriber_id: Uuid) -> Option<Subscriber> {
        self.state().subscribers.get(&subscriber_id).cloned()
    }

    pub fn subscriber_with_email(&self, email: &SubscriberEmail) -> Option<Subscriber> {
        self.state()
            .subscribers
            .values()
            .find(|s| &s.email == email)
            .cloned()
    }

    pub fn sends_for(&self, campaign_id: Uuid) -> Vec<CampaignSend> {
        self.state()
            .sends
            .iter()
            .filter(|s| s.campaign_id == campaign_id)
            .cloned()
            .collect()
    }

    pub fn events_for(&self, subscriber_id: Uuid) -> Vec<AnalyticsEvent> {
        self.state()
            .events
            .iter()
            .filter(|e| e.subscriber_id == subscriber_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SubscriberRepository for MemoryDb {
    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        Ok(self.subscriber_with_email(email))
    }

    async fn find_by_confirmation_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        Ok(self
            .state()
            .subscribers
            .values()
            .find(|s| s.confirmation_token.as_ref() == Some(token))
            .cloned())
    }

    async fn find_by_unsubscribe_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        Ok(self
            .state()
            .subscribers
            .values()
            .find(|s| &s.unsubscribe_token == token)
            .cloned())
    }

    async fn upsert_pending(
        &self,
        subscriber: Subscriber,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let mut state = self.state();
        let existing = state
            .subscribers
            .values()
            .find(|s| s.email == subscriber.email)
            .map(|s| (s.id, s.status));

        match existing {
            None => {
                state.subscribers.insert(subscriber.id, subscriber.clone());
                Ok(Some(subscriber))
            }
            Some((id, SubscriberStatus::Unsubscribed)) => {
                let stored = state
                    .subscribers
                    .get_mut(&id)
                    .expect("subscriber vanished while the store lock was held");
                stored.status = SubscriberStatus::Pending;
                stored.name = subscriber.name;
                stored.source = subscriber.source;
                stored.confirmation_token = subscriber.confirmation_token;
                stored.unsubscribe_token = subscriber.unsubscribe_token;
                stored.updated_at = subscriber.updated_at;
                Ok(Some(stored.clone()))
            }
            Some(_) => Ok(None),
        }
    }

    async fn confirm(
        &self,
        subscriber_id: Uuid,
        token: &SubscriptionToken,
        at: DateTime<Utc>,
    ) -> Result<bool, SubscriberRepositoryError> {
        let mut state = self.state();
        match state.subscribers.get_mut(&subscriber_id) {
            Some(stored) if stored.confirmation_token.as_ref() == Some(token) => {
                stored.status = SubscriberStatus::Confirmed;
                stored.confirmation_token = None;
                stored.confirmed_at = Some(at);
                stored.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn unsubscribe(
        &self,
        subscriber_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SubscriberRepositoryError> {
        let mut state = self.state();
        match state.subscribers.get_mut(&subscriber_id) {
            Some(stored) if stored.status != SubscriberStatus::Unsubscribed => {
                stored.status = SubscriberStatus::Unsubscribed;
                stored.unsubscribed_at = Some(at);
                stored.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CampaignRepository for MemoryDb {
    async fn due_campaigns(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Campaign>, CampaignRepositoryError> {
        let mut due: Vec<Campaign> = self
            .state()
            .campaigns
            .values()
            .filter(|c| c.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|c| c.scheduled_at);
        Ok(due)
    }

    async fn claim(&self, campaign_id: Uuid) -> Result<bool, CampaignRepositoryError> {
        let mut state = self.state();
        match state.campaigns.get_mut(&campaign_id) {
            Some(campaign) if campaign.status == CampaignStatus::Scheduled => {
                campaign.status = CampaignStatus::Sending;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn finalize(
        &self,
        campaign_id: Uuid,
        sent_at: DateTime<Utc>,
        sent_to_count: i64,
    ) -> Result<(), CampaignRepositoryError> {
        let mut state = self.state();
        match state.campaigns.get_mut(&campaign_id) {
            Some(campaign) if campaign.status == CampaignStatus::Sending => {
                campaign.status = CampaignStatus::Sent;
                campaign.sent_at = Some(sent_at);
                campaign.sent_to_count = Some(sent_to_count);
                Ok(())
            }
            _ => Err(CampaignRepositoryError::Unexpected(anyhow::anyhow!(
                "Campaign {} is not in the sending state",
                campaign_id
            ))),
        }
    }

    async fn record_send(&self, send: CampaignSend) -> Result<(), CampaignRepositoryError> {
        self.state().sends.push(send);
        Ok(())
    }

    async fn confirmed_subscribers(
        &self,
    ) -> Result<Vec<Subscriber>, CampaignRepositoryError> {
        Ok(self
            .state()
            .subscribers
            .values()
            .filter(|s| s.status == SubscriberStatus::Confirmed)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryDb {
    async fn record(&self, event: AnalyticsEvent) -> Result<(), AnalyticsRepositoryError> {
        self.state().events.push(event);
        Ok(())
    }
}
