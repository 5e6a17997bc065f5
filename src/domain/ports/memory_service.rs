use crate::domain::error::DomainError;
use async_trait::async_trait;

/// Remote graph memory: accepts free-text documents, consolidates them into a
/// knowledge graph, and answers graph-completion searches.
#[async_trait]
pub trait MemoryService: Send + Sync {
    async fn ingest(&self, text: &str) -> Result<(), DomainError>;

    /// Builds the graph from everything ingested so far.
    async fn consolidate(&self) -> Result<(), DomainError>;

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, DomainError>;

    /// Drops all remote memory. Destructive.
    async fn reset(&self) -> Result<(), DomainError>;
}
