use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::configuration::DatabaseSettings;
use crate::domain::campaign::{
    errors::CampaignRepositoryError,
    models::campaign::{Campaign, CampaignStatus},
};
use crate::domain::subscription::{
    models::{
        email::{EmailError, SubscriberEmail},
        name::SubscriberName,
        subscriber::{Subscriber, SubscriberStatus},
        token::SubscriptionToken,
    },
    ports::SubscriberRepositoryError,
};

mod analytics_repo;
mod campaign_repo;
mod subscriber_repo;

#[derive(Clone, Debug)]
pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    pub fn new(configuration: &DatabaseSettings) -> PostgresDb {
        PostgresDb {
            pool: PgPoolOptions::new()
                .acquire_timeout(std::time::Duration::from_secs(2))
                .connect_lazy_with(configuration.with_db()),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn subscriber_from_row(row: &PgRow) -> Result<Subscriber, SubscriberRepositoryError> {
    let invalid = |e: String| SubscriberRepositoryError::InvalidRecord(e);

    let email: String = row.try_get("email").map_err(anyhow::Error::from)?;
    let name: Option<String> = row.try_get("name").map_err(anyhow::Error::from)?;
    let status: String = row.try_get("status").map_err(anyhow::Error::from)?;
    let confirmation_token: Option<String> = row
        .try_get("confirmation_token")
        .map_err(anyhow::Error::from)?;
    let unsubscribe_token: String = row
        .try_get("unsubscribe_token")
        .map_err(anyhow::Error::from)?;

    Ok(Subscriber {
        id: row.try_get("id").map_err(anyhow::Error::from)?,
        email: SubscriberEmail::parse(email).map_err(|e| invalid(e.to_string()))?,
        name: name
            .map(SubscriberName::parse)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?,
        status: SubscriberStatus::parse(&status).map_err(|e| invalid(e.to_string()))?,
        confirmation_token: confirmation_token
            .map(SubscriptionToken::parse)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?,
        unsubscribe_token: SubscriptionToken::parse(unsubscribe_token)
            .map_err(|e| invalid(e.to_string()))?,
        source: row.try_get("source").map_err(anyhow::Error::from)?,
        confirmed_at: row.try_get("confirmed_at").map_err(anyhow::Error::from)?,
        unsubscribed_at: row
            .try_get("unsubscribed_at")
            .map_err(anyhow::Error::from)?,
        created_at: row.try_get("created_at").map_err(anyhow::Error::from)?,
        updated_at: row.try_get("updated_at").map_err(anyhow::Error::from)?,
    })
}

fn campaign_from_row(row: &PgRow) -> Result<Campaign, CampaignRepositoryError> {
    let invalid = |e: String| CampaignRepositoryError::InvalidRecord(e);

    let status: String = row.try_get("status").map_err(anyhow::Error::from)?;
    let subject: String = row.try_get("subject").map_err(anyhow::Error::from)?;
    let content_html: String = row.try_get("content_html").map_err(anyhow::Error::from)?;
    let content_text: String = row.try_get("content_text").map_err(anyhow::Error::from)?;

    Ok(Campaign {
        id: row.try_get("id").map_err(anyhow::Error::from)?,
        status: CampaignStatus::parse(&status).map_err(|e| invalid(e.to_string()))?,
        subject: subject
            .try_into()
            .map_err(|e: EmailError| invalid(e.to_string()))?,
        content_html: content_html
            .try_into()
            .map_err(|e: EmailError| invalid(e.to_string()))?,
        content_text: content_text
            .try_into()
            .map_err(|e: EmailError| invalid(e.to_string()))?,
        scheduled_at: row.try_get("scheduled_at").map_err(anyhow::Error::from)?,
        sent_at: row.try_get("sent_at").map_err(anyhow::Error::from)?,
        sent_to_count: row.try_get("sent_to_count").map_err(anyhow::Error::from)?,
    })
}
