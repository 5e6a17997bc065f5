use crate::domain::entities::embedding::{EmbeddingEntry, EmbeddingIndex};
use crate::domain::entities::trade::StoredTrade;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::trade_repository::{TradeFilter, TradeRepository};
use crate::domain::ports::vector_store::VectorStore;
use std::sync::Arc;

/// Embeds every trade description, one provider call per trade.
///
/// A failure tied to one record skips that record. A provider-level failure
/// aborts the whole build, so callers keep whatever index they already had.
pub async fn build_index(
    corpus: &[StoredTrade],
    embedder: &dyn EmbeddingProvider,
) -> Result<EmbeddingIndex, DomainError> {
    let mut entries = Vec::with_capacity(corpus.len());
    for trade in corpus {
        let text = trade.describe();
        match embedder.embed(&text).await {
            Ok(vector) => entries.push(EmbeddingEntry { trade_id: trade.id, vector, source_text: text }),
            Err(e) if e.is_provider_level() => {
                tracing::warn!(provider = embedder.name(), error = %e, "embedding provider unavailable, build aborted");
                return Err(e);
            }
            Err(e) => tracing::warn!(trade = trade.id, error = %e, "skipping trade in embedding index"),
        }
    }
    Ok(EmbeddingIndex::new(entries))
}

/// Embeds the query once and ranks the index against it.
pub async fn search_index<'a>(
    query: &str,
    embedder: &dyn EmbeddingProvider,
    index: &'a EmbeddingIndex,
    k: usize,
) -> Result<Vec<(&'a EmbeddingEntry, f64)>, DomainError> {
    if index.is_empty() || k == 0 {
        return Ok(Vec::new());
    }
    let vector = embedder.embed(query).await?;
    Ok(index.rank(&vector, k))
}

/// Builds the index from the ledger and keeps the persisted copy in step.
pub struct IndexUseCase {
    trades: Arc<dyn TradeRepository>,
    store: Arc<dyn VectorStore>,
}

impl IndexUseCase {
    pub fn new(trades: Arc<dyn TradeRepository>, store: Arc<dyn VectorStore>) -> Self {
        Self { trades, store }
    }

    /// The persisted index; empty when nothing has been built yet.
    pub fn load(&self) -> Result<EmbeddingIndex, DomainError> {
        Ok(EmbeddingIndex::new(self.store.load_all()?))
    }

    /// Rebuilds from the full ledger and replaces the stored index. On error
    /// the stored index is left as it was.
    pub async fn rebuild(&self, embedder: &dyn EmbeddingProvider) -> Result<EmbeddingIndex, DomainError> {
        let corpus = self.trades.list_trades(&TradeFilter::default())?;
        let index = build_index(&corpus, embedder).await?;
        self.store.replace_all(index.entries())?;
        tracing::info!(entries = index.len(), corpus = corpus.len(), "embedding index rebuilt");
        Ok(index)
    }
}
