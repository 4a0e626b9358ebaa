use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    /// Rejected locally, before any request was issued
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The repository rejected the call or the transport failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Loading the board from the repository failed
    #[error("Failed to load cards: {0}")]
    Load(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid card status: {0}")]
    InvalidStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KanbanError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Message suitable for showing to the person using the board
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { reason, .. } => reason.clone(),
            Self::Request(message) | Self::Load(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Converts a failed repository call into a load failure
    pub(crate) fn into_load(self) -> Self {
        match self {
            Self::Load(_) => self,
            Self::Request(message) => Self::Load(message),
            other => Self::Load(other.to_string()),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for KanbanError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<toml::de::Error> for KanbanError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_strips_prefix() {
        let err = KanbanError::validation("title", "Title is required");
        assert_eq!(err.user_message(), "Title is required");
        assert_eq!(err.to_string(), "Invalid title: Title is required");
        assert!(err.is_validation());

        let err = KanbanError::Request("card 9 does not exist".to_string());
        assert_eq!(err.user_message(), "card 9 does not exist");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_into_load_keeps_message() {
        let err = KanbanError::Request("connection refused".to_string()).into_load();
        assert!(matches!(err, KanbanError::Load(ref m) if m == "connection refused"));

        let err = KanbanError::Config("bad".to_string()).into_load();
        assert!(matches!(err, KanbanError::Load(ref m) if m == "Configuration error: bad"));
    }
}
