use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::configuration::EmailClientSettings;
use crate::domain::subscription::models::email::SubscriberEmail;

mod delivery;
mod subscriber_notifier;

/// Postmark-style HTTP client behind both outbound email ports: the
/// lifecycle notifier (confirmation / welcome) and the campaign delivery
/// port.
#[derive(Debug, Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: SubscriberEmail,
    authorization_token: Secret<String>,
    /// Public base URL of this application, used to build the links
    /// embedded in outgoing messages.
    link_base_url: String,
}

impl EmailClient {
    pub fn new(configuration: EmailClientSettings, link_base_url: String) -> Self {
        let sender = configuration
            .sender()
            .expect("Invalid sender email address");
        let http_client = Client::builder()
            .timeout(configuration.timeout())
            .build()
            .expect("Failed to build the email HTTP client");
        Self {
            http_client,
            base_url: configuration.base_url,
            sender,
            authorization_token: configuration.authorization_token,
            link_base_url,
        }
    }

    async fn send_notification<'a>(
        &'a self,
        email_request_body: SendEmailRequest<'a>,
    ) -> Result<(), anyhow::Error> {
        let url = format!("{}/email", self.base_url);
        self.http_client
            .post(&url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&email_request_body)
            .send()
            .await
            .map_err(anyhow::Error::from)?
            .error_for_status()
            .map_err(anyhow::Error::from)?;

        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}
