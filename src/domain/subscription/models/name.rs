use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, thiserror::Error)]
pub enum SubscriberNameError {
    #[error("Subscriber name cannot be empty or whitespace.")]
    EmptyOrWhitespace,
    #[error(
        "Subscriber name is too long (maximum allowed is {} characters).",
        SubscriberName::MAX_LENGTH
    )]
    TooLong,
    #[error("Subscriber name contains forbidden characters: {0}")]
    ContainsForbiddenCharacters(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct SubscriberName(String);

impl SubscriberName {
    const MAX_LENGTH: usize = 256;
    const FORBIDDEN_CHARACTERS: [char; 9] = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];

    pub fn parse(s: String) -> Result<SubscriberName, SubscriberNameError> {
        if s.trim().is_empty() {
            return Err(SubscriberNameError::EmptyOrWhitespace);
        }
        if s.graphemes(true).count() > SubscriberName::MAX_LENGTH {
            return Err(SubscriberNameError::TooLong);
        }
        if s.chars()
            .any(|g| SubscriberName::FORBIDDEN_CHARACTERS.contains(&g))
        {
            return Err(SubscriberNameError::ContainsForbiddenCharacters(s.clone()));
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
