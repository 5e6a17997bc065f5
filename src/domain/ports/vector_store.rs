use crate::domain::entities::embedding::EmbeddingEntry;
use crate::domain::error::DomainError;

pub trait VectorStore: Send + Sync {
    /// Atomically swaps the persisted index for `entries`.
    fn replace_all(&self, entries: &[EmbeddingEntry]) -> Result<(), DomainError>;
    /// Persisted entries in corpus order.
    fn load_all(&self) -> Result<Vec<EmbeddingEntry>, DomainError>;
}
