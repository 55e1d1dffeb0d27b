use async_trait::async_trait;

use super::EmailClient;
use crate::domain::campaign::{errors::DeliveryError, ports::EmailDelivery};
use crate::domain::subscription::models::email::{EmailMessage, SubscriberEmail};

#[async_trait]
impl EmailDelivery for EmailClient {
    #[tracing::instrument(
        name = "Deliver a campaign message to one recipient",
        skip(self, recipient, message)
    )]
    async fn deliver(
        &self,
        recipient: &SubscriberEmail,
        message: &EmailMessage,
    ) -> Result<(), DeliveryError> {
        self.send_message(recipient, message)
            .await
            .map_err(|e| DeliveryError::new(e.to_string()))
    }
}
