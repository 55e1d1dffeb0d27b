use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;

use crate::configuration::DispatchSettings;
use crate::domain::subscription::models::subscriber::Subscriber;

use super::{
    errors::DispatchError,
    models::{
        campaign::{Campaign, CampaignSend},
        report::{CampaignDisposition, CampaignOutcome, DispatchReport},
    },
    ports::{CampaignRepository, DispatchService, EmailDelivery},
};

/// Turns due, scheduled campaigns into individual delivery attempts and a
/// finalized `sent` state.
///
/// Every campaign is claimed with an atomic conditional update before any
/// recipient is touched, so overlapping trigger invocations cannot
/// double-send. Recipient sends run through a bounded worker pool and
/// fail independently; "sent" means "dispatch completed", not "every
/// recipient received it".
#[derive(Debug)]
pub struct CampaignDispatcher<R, D>
where
    R: CampaignRepository,
    D: EmailDelivery,
{
    repo: Arc<R>,
    delivery: Arc<D>,
    base_url: String,
    max_in_flight: usize,
    run_deadline: Duration,
}

impl<R, D> CampaignDispatcher<R, D>
where
    R: CampaignRepository,
    D: EmailDelivery,
{
    pub fn new(repo: Arc<R>, delivery: Arc<D>, base_url: String, settings: DispatchSettings) -> Self {
        Self {
            repo,
            delivery,
            base_url,
            max_in_flight: settings.max_in_flight.max(1),
            run_deadline: Duration::from_secs(settings.run_deadline_seconds),
        }
    }

    #[tracing::instrument(name = "Dispatching a claimed campaign", skip(self, campaign), fields(campaign_id = %campaign.id))]
    async fn dispatch_claimed(&self, campaign: &Campaign, now: DateTime<Utc>) -> CampaignDisposition {
        let recipients = match self.repo.confirmed_subscribers().await {
            Ok(recipients) => recipients,
            Err(error) => {
                tracing::error!(
                    error.cause_chain = ?error,
                    "Failed to load the recipient set for a claimed campaign",
                );
                return CampaignDisposition::Errored {
                    message: error.to_string(),
                };
            }
        };

        let (sent, failed) = futures::stream::iter(recipients)
            .map(|recipient| self.send_to(campaign, recipient))
            .buffer_unordered(self.max_in_flight)
            .fold((0u64, 0u64), |(sent, failed), delivered| async move {
                if delivered {
                    (sent + 1, failed)
                } else {
                    (sent, failed + 1)
                }
            })
            .await;

        match self.repo.finalize(campaign.id, now, sent as i64).await {
            Ok(()) => CampaignDisposition::Completed { sent, failed },
            Err(error) => {
                tracing::error!(
                    error.cause_chain = ?error,
                    "Failed to finalize a dispatched campaign",
                );
                CampaignDisposition::Errored {
                    message: error.to_string(),
                }
            }
        }
    }

    /// One recipient, one attempt, one audit row. Returns whether the
    /// delivery counted as a success.
    async fn send_to(&self, campaign: &Campaign, recipient: Subscriber) -> bool {
        let unsubscribe_url = format!(
            "{}/subscriptions/unsubscribe?token={}",
            self.base_url,
            recipient.unsubscribe_token.as_ref()
        );
        let message = campaign.personalized_message(&unsubscribe_url);

        let outcome = self.delivery.deliver(&recipient.email, &message).await;
        let attempted_at = Utc::now();
        let send = match &outcome {
            Ok(()) => CampaignSend::sent(campaign.id, recipient.id, attempted_at),
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    subscriber_email = %recipient.email,
                    "Delivery to one recipient failed; continuing with the rest",
                );
                CampaignSend::failed(
                    campaign.id,
                    recipient.id,
                    attempted_at,
                    error.to_string(),
                )
            }
        };

        if let Err(error) = self.repo.record_send(send).await {
            tracing::warn!(
                error.cause_chain = ?error,
                subscriber_email = %recipient.email,
                "Failed to record a campaign send row",
            );
            return false;
        }
        outcome.is_ok()
    }
}

#[async_trait]
impl<R, D> DispatchService for CampaignDispatcher<R, D>
where
    R: CampaignRepository,
    D: EmailDelivery,
{
    #[tracing::instrument(name = "Running scheduled campaign dispatch", skip(self))]
    async fn run_scheduled_dispatch(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DispatchReport, DispatchError> {
        let due = self
            .repo
            .due_campaigns(now)
            .await
            .context("Failed to scan for due campaigns")?;
        if due.is_empty() {
            return Ok(DispatchReport::default());
        }

        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(due.len());
        for campaign in due {
            // The deadline is only checked between campaigns: an
            // unclaimed campaign can safely wait for the next trigger,
            // a claimed one must be driven to finalize.
            if started.elapsed() >= self.run_deadline {
                outcomes.push(CampaignOutcome {
                    campaign_id: campaign.id,
                    disposition: CampaignDisposition::Deferred,
                });
                continue;
            }

            let disposition = match self.repo.claim(campaign.id).await {
                Ok(true) => self.dispatch_claimed(&campaign, now).await,
                Ok(false) => CampaignDisposition::AlreadyClaimed,
                Err(error) => {
                    tracing::error!(
                        error.cause_chain = ?error,
                        campaign_id = %campaign.id,
                        "Failed to claim a due campaign",
                    );
                    CampaignDisposition::Errored {
                        message: error.to_string(),
                    }
                }
            };
            outcomes.push(CampaignOutcome {
                campaign_id: campaign.id,
                disposition,
            });
        }

        Ok(DispatchReport { outcomes })
    }
}
