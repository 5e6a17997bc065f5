use crate::domain::error::DomainError;

/// Turns one text into a fixed-length vector.
///
/// Implementations report unreachable endpoints and rejected credentials as
/// [`DomainError::ProviderUnavailable`] and anything specific to the submitted
/// text as [`DomainError::Embedding`].
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;
    fn name(&self) -> &str;
}
