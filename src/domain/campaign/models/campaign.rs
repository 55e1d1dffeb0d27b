use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::subscription::models::email::{
    EmailHtmlContent, EmailMessage, EmailSubject, EmailTextContent,
};

#[derive(thiserror::Error, Debug)]
pub enum CampaignStatusError {
    #[error("Unknown campaign status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
}

impl CampaignStatus {
    const DRAFT: &'static str = "draft";
    const SCHEDULED: &'static str = "scheduled";
    const SENDING: &'static str = "sending";
    const SENT: &'static str = "sent";

    pub fn parse(status: &str) -> Result<CampaignStatus, CampaignStatusError> {
        match status {
            Self::DRAFT => Ok(CampaignStatus::Draft),
            Self::SCHEDULED => Ok(CampaignStatus::Scheduled),
            Self::SENDING => Ok(CampaignStatus::Sending),
            Self::SENT => Ok(CampaignStatus::Sent),
            _ => Err(CampaignStatusError::UnknownStatus(status.into())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => Self::DRAFT,
            CampaignStatus::Scheduled => Self::SCHEDULED,
            CampaignStatus::Sending => Self::SENDING,
            CampaignStatus::Sent => Self::SENT,
        }
    }
}

/// One newsletter broadcast. Authored elsewhere; the dispatcher only ever
/// moves it `scheduled -> sending -> sent`.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: Uuid,
    pub status: CampaignStatus,
    pub subject: EmailSubject,
    pub content_html: EmailHtmlContent,
    pub content_text: EmailTextContent,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub sent_to_count: Option<i64>,
}

impl Campaign {
    /// Eligible for dispatch iff scheduled with a due schedule time.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == CampaignStatus::Scheduled
            && self.scheduled_at.map(|at| at <= now).unwrap_or(false)
    }

    /// Renders the message for one recipient, with their personal
    /// unsubscribe link appended to both bodies.
    pub fn personalized_message(&self, unsubscribe_url: &str) -> EmailMessage {
        let html = self.content_html.appended(&format!(
            "<br /><a href=\"{}\">Unsubscribe</a>",
            unsubscribe_url
        ));
        let text = self
            .content_text
            .appended(&format!("\n\nUnsubscribe: {}", unsubscribe_url));
        EmailMessage::new(self.subject.clone(), html, text)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SendStatusError {
    #[error("Unknown campaign send status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendStatus {
    Sent,
    Failed,
}

impl SendStatus {
    const SENT: &'static str = "sent";
    const FAILED: &'static str = "failed";

    pub fn parse(status: &str) -> Result<SendStatus, SendStatusError> {
        match status {
            Self::SENT => Ok(SendStatus::Sent),
            Self::FAILED => Ok(SendStatus::Failed),
            _ => Err(SendStatusError::UnknownStatus(status.into())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SendStatus::Sent => Self::SENT,
            SendStatus::Failed => Self::FAILED,
        }
    }
}

/// Append-only audit row: the outcome of delivering one campaign to one
/// subscriber. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct CampaignSend {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub subscriber_id: Uuid,
    pub status: SendStatus,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl CampaignSend {
    pub fn sent(campaign_id: Uuid, subscriber_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            subscriber_id,
            status: SendStatus::Sent,
            error_message: None,
            sent_at: at,
        }
    }

    pub fn failed(
        campaign_id: Uuid,
        subscriber_id: Uuid,
        at: DateTime<Utc>,
        error_message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            subscriber_id,
            status: SendStatus::Failed,
            error_message: Some(error_message),
            sent_at: at,
        }
    }
}
