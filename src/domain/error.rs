use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A single embedding request failed; the provider itself is still usable.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The provider cannot be reached or refuses every request (network, auth, missing endpoint).
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// True when retrying other records against the same provider is pointless.
    pub fn is_provider_level(&self) -> bool {
        matches!(self, DomainError::ProviderUnavailable(_))
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.to_string())
    }
}
