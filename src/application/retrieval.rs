use crate::application::index::search_index;
use crate::domain::entities::embedding::EmbeddingIndex;
use crate::domain::entities::trade::StoredTrade;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::memory_service::MemoryService;
use crate::domain::ports::trade_repository::{TradeFilter, TradeRepository};
use crate::domain::values::retrieval_mode::RetrievalMode;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

/// One ranked hit, whichever backend produced it. `trade_id` is the ledger row
/// when the hit maps back to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedMemory {
    pub content: String,
    pub score: f64,
    pub trade_id: Option<i64>,
}

/// Routes queries to the remote graph, the local embedding index, or keyword
/// scoring, depending on the current mode.
pub struct RetrievalEngine {
    trades: Arc<dyn TradeRepository>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    memory: Option<Arc<dyn MemoryService>>,
    mode: RwLock<RetrievalMode>,
    index: RwLock<Arc<EmbeddingIndex>>,
}

impl RetrievalEngine {
    pub fn new(
        trades: Arc<dyn TradeRepository>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
        memory: Option<Arc<dyn MemoryService>>,
        index: EmbeddingIndex,
    ) -> Self {
        let mode = RetrievalMode::initial(memory.is_some(), embedder.is_some(), index.len());
        tracing::info!(%mode, indexed = index.len(), "retrieval engine ready");
        Self {
            trades,
            embedder,
            memory,
            mode: RwLock::new(mode),
            index: RwLock::new(Arc::new(index)),
        }
    }

    pub fn mode(&self) -> RetrievalMode {
        *self.mode.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_mode(&self, mode: RetrievalMode) {
        let mut current = self.mode.write().unwrap_or_else(|e| e.into_inner());
        let previous = *current;
        if previous != mode {
            *current = mode;
            tracing::info!(from = %previous, to = %mode, "retrieval mode changed");
        }
    }

    pub fn install_index(&self, index: EmbeddingIndex) {
        *self.index.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(index);
    }

    pub fn index_len(&self) -> usize {
        self.current_index().len()
    }

    pub fn embedder(&self) -> Option<&Arc<dyn EmbeddingProvider>> {
        self.embedder.as_ref()
    }

    pub fn memory(&self) -> Option<&Arc<dyn MemoryService>> {
        self.memory.as_ref()
    }

    fn current_index(&self) -> Arc<EmbeddingIndex> {
        self.index.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Top `k` memories for `query` from the backend the current mode selects.
    ///
    /// Remote-graph errors are returned as-is. A local embedding failure falls
    /// back to keyword scoring for this call only.
    pub async fn query(&self, query: &str, k: usize) -> Result<Vec<RetrievedMemory>, DomainError> {
        match self.mode() {
            RetrievalMode::RemoteGraph => {
                let memory = self
                    .memory
                    .as_ref()
                    .ok_or_else(|| DomainError::Config("remote memory is not configured".into()))?;
                let hits = memory.search(query, k).await?;
                Ok(hits
                    .into_iter()
                    .enumerate()
                    .map(|(rank, content)| RetrievedMemory {
                        content,
                        score: 1.0 / (rank as f64 + 1.0),
                        trade_id: None,
                    })
                    .collect())
            }
            RetrievalMode::LocalEmbedding => {
                let index = self.current_index();
                let Some(embedder) = self.embedder.as_ref().filter(|_| !index.is_empty()) else {
                    tracing::debug!("no usable embedding index, using keyword scoring");
                    return Ok(self.keyword_search(query, k));
                };
                match search_index(query, embedder.as_ref(), &index, k).await {
                    Ok(hits) => Ok(hits
                        .into_iter()
                        .map(|(entry, score)| RetrievedMemory {
                            content: entry.source_text.clone(),
                            score,
                            trade_id: Some(entry.trade_id),
                        })
                        .collect()),
                    Err(e) => {
                        tracing::warn!(error = %e, "embedding query failed, using keyword scoring");
                        Ok(self.keyword_search(query, k))
                    }
                }
            }
            RetrievalMode::Keyword => Ok(self.keyword_search(query, k)),
        }
    }

    /// Counts how many distinct query tokens occur in each trade's text. Never
    /// fails: a store error yields no results.
    pub fn keyword_search(&self, query: &str, k: usize) -> Vec<RetrievedMemory> {
        let tokens = tokenize(query);
        if tokens.is_empty() || k == 0 {
            return Vec::new();
        }
        let ledger = match self.trades.list_trades(&TradeFilter::default()) {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!(error = %e, "keyword search could not read the ledger");
                return Vec::new();
            }
        };
        rank_by_keywords(&ledger, &tokens, k)
    }
}

fn tokenize(query: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in query.split_whitespace().map(str::to_lowercase) {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn rank_by_keywords(ledger: &[StoredTrade], tokens: &[String], k: usize) -> Vec<RetrievedMemory> {
    let mut scored: Vec<(&StoredTrade, usize)> = ledger
        .iter()
        .map(|t| {
            let text = t.keyword_text();
            (t, tokens.iter().filter(|tok| text.contains(tok.as_str())).count())
        })
        .filter(|(_, score)| *score > 0)
        .collect();

    scored.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => b.0.record.trade_date.cmp(&a.0.record.trade_date),
        other => other,
    });

    scored
        .into_iter()
        .take(k)
        .map(|(t, score)| RetrievedMemory {
            content: t.describe(),
            score: score as f64,
            trade_id: Some(t.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_dedups() {
        assert_eq!(tokenize("  BUY 000001 buy\t平安 "), vec!["buy", "000001", "平安"]);
        assert!(tokenize("   ").is_empty());
    }
}
