use rand::{rngs::OsRng, RngCore};

/// Opaque credential used for confirmation and unsubscribe links:
/// 32 bytes from the OS CSPRNG, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(String);

#[derive(thiserror::Error, Debug)]
pub enum SubscriptionTokenError {
    #[error("A subscription token must be {} hex characters", SubscriptionToken::LENGTH)]
    InvalidFormat,
}

impl SubscriptionToken {
    const BYTES: usize = 32;
    const LENGTH: usize = Self::BYTES * 2;

    pub fn parse(s: String) -> Result<SubscriptionToken, SubscriptionTokenError> {
        let well_formed =
            s.len() == Self::LENGTH && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase());
        if well_formed {
            Ok(Self(s))
        } else {
            Err(SubscriptionTokenError::InvalidFormat)
        }
    }

    /// An entropy-source failure aborts the process; there is no meaningful
    /// way to continue issuing credentials without one.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        Self(token)
    }
}

impl AsRef<str> for SubscriptionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubscriptionToken {
    type Error = SubscriptionTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubscriptionToken::parse(value)
    }
}

/// Query payload carrying a raw token, as it arrives on a confirmation link.
#[derive(serde::Deserialize, Debug)]
pub struct TokenRequest {
    pub token: String,
}
