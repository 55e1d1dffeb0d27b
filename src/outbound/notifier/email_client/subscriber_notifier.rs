use async_trait::async_trait;

use super::{EmailClient, SendEmailRequest};
use crate::domain::subscription::{
    models::{
        email::{EmailHtmlContent, EmailMessage, EmailSubject, EmailTextContent, SubscriberEmail},
        token::SubscriptionToken,
    },
    ports::{NotifierError, SubscriptionNotifier},
};

impl EmailClient {
    fn build_confirmation_message(
        &self,
        token: &SubscriptionToken,
    ) -> Result<EmailMessage, NotifierError> {
        let confirmation_link = format!(
            "{}/subscriptions/confirm?token={}",
            self.link_base_url,
            token.as_ref()
        );
        let subject = EmailSubject::try_from("Confirm your subscription")?;
        let html_content = EmailHtmlContent::try_from(format!(
            "Welcome to our newsletter!<br />\
            Click <a href=\"{}\">here</a> to confirm your subscription.",
            confirmation_link
        ))?;
        let text_content = EmailTextContent::try_from(format!(
            "Welcome to our newsletter!\nVisit {} to confirm your subscription.",
            confirmation_link
        ))?;

        Ok(EmailMessage::new(subject, html_content, text_content))
    }

    fn build_welcome_message(&self) -> Result<EmailMessage, NotifierError> {
        let subject = EmailSubject::try_from("Welcome aboard")?;
        let html_content = EmailHtmlContent::try_from(
            "Your subscription is confirmed. You will receive the next issue.",
        )?;
        let text_content = EmailTextContent::try_from(
            "Your subscription is confirmed. You will receive the next issue.",
        )?;
        Ok(EmailMessage::new(subject, html_content, text_content))
    }

    pub(super) async fn send_message(
        &self,
        recipient: &SubscriberEmail,
        message: &EmailMessage,
    ) -> Result<(), anyhow::Error> {
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject: message.subject_as_ref(),
            html_body: message.html_as_ref(),
            text_body: message.text_as_ref(),
        };
        self.send_notification(request_body).await
    }
}

#[async_trait]
impl SubscriptionNotifier for EmailClient {
    #[tracing::instrument(
        name = "Send a confirmation email to a new subscriber",
        skip(self, recipient, token)
    )]
    async fn send_confirmation(
        &self,
        recipient: &SubscriberEmail,
        token: &SubscriptionToken,
    ) -> Result<(), NotifierError> {
        let message = self.build_confirmation_message(token)?;
        self.send_message(recipient, &message)
            .await
            .map_err(NotifierError::Unexpected)
    }

    #[tracing::instrument(name = "Send a welcome email", skip(self, recipient))]
    async fn send_welcome(&self, recipient: &SubscriberEmail) -> Result<(), NotifierError> {
        let message = self.build_welcome_message()?;
        self.send_message(recipient, &message)
            .await
            .map_err(NotifierError::Unexpected)
    }
}
