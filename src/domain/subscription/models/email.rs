use validator::validate_email;

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("Invalid email subject: {0}")]
    InvalidSubject(String),
    #[error("Invalid email Html content: {0}")]
    InvalidHtmlContent(String),
    #[error("Invalid email text content: {0}")]
    InvalidTextContent(String),
    #[error("Invalid subscriber email: {0}")]
    InvalidSubscriber(String),
}

/// A subscriber address, case-normalized (trimmed, lower-cased) at parse
/// time so that the same mailbox always maps to the same record.
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(s: String) -> Result<SubscriberEmail, EmailError> {
        let normalized = s.trim().to_lowercase();
        if validate_email(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(EmailError::InvalidSubscriber(format!(
                "{} is not a valid email",
                s
            )))
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SubscriberEmail> for String {
    fn from(email: SubscriberEmail) -> Self {
        email.0
    }
}

/// A fully rendered message ready to hand to the delivery provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    subject: EmailSubject,
    html_content: EmailHtmlContent,
    text_content: EmailTextContent,
}

impl EmailMessage {
    pub fn new(
        subject: EmailSubject,
        html_content: EmailHtmlContent,
        text_content: EmailTextContent,
    ) -> Self {
        Self {
            subject,
            html_content,
            text_content,
        }
    }

    pub fn subject_as_ref(&self) -> &str {
        self.subject.as_ref()
    }
    pub fn html_as_ref(&self) -> &str {
        self.html_content.as_ref()
    }
    pub fn text_as_ref(&self) -> &str {
        self.text_content.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSubject(String);

impl TryFrom<&str> for EmailSubject {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(EmailError::InvalidSubject(
                "EmailSubject cannot be empty.".into(),
            ))
        } else {
            Ok(Self(value.to_string()))
        }
    }
}

impl TryFrom<String> for EmailSubject {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EmailSubject::try_from(value.as_str())
    }
}

impl AsRef<str> for EmailSubject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailHtmlContent(String);

impl EmailHtmlContent {
    /// Appends a fragment, preserving the non-empty invariant.
    pub fn appended(&self, extra: &str) -> Self {
        Self(format!("{}{}", self.0, extra))
    }
}

impl TryFrom<&str> for EmailHtmlContent {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(EmailError::InvalidHtmlContent(
                "EmailHtmlContent cannot be empty.".into(),
            ))
        } else {
            Ok(Self(value.to_string()))
        }
    }
}

impl TryFrom<String> for EmailHtmlContent {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EmailHtmlContent::try_from(value.as_str())
    }
}

impl AsRef<str> for EmailHtmlContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTextContent(String);

impl EmailTextContent {
    pub fn appended(&self, extra: &str) -> Self {
        Self(format!("{}{}", self.0, extra))
    }
}

impl TryFrom<&str> for EmailTextContent {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(EmailError::InvalidTextContent(
                "EmailTextContent cannot be empty.".into(),
            ))
        } else {
            Ok(Self(value.to_string()))
        }
    }
}

impl TryFrom<String> for EmailTextContent {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EmailTextContent::try_from(value.as_str())
    }
}

impl AsRef<str> for EmailTextContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
