use crate::domain::values::similarity::cosine_similarity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingEntry {
    pub trade_id: i64,
    pub vector: Vec<f32>,
    pub source_text: String,
}

/// Flat in-memory vector index, kept in corpus order.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    entries: Vec<EmbeddingEntry>,
}

impl EmbeddingIndex {
    pub fn new(entries: Vec<EmbeddingEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[EmbeddingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k entries by cosine similarity to `query`. Equal scores keep corpus order.
    pub fn rank(&self, query: &[f32], k: usize) -> Vec<(&EmbeddingEntry, f64)> {
        let mut scored: Vec<(&EmbeddingEntry, f64)> = self
            .entries
            .iter()
            .map(|e| (e, cosine_similarity(query, &e.vector)))
            .collect();
        // sort_by is stable
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, vector: Vec<f32>) -> EmbeddingEntry {
        EmbeddingEntry {
            trade_id: id,
            vector,
            source_text: format!("trade {id}"),
        }
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let index = EmbeddingIndex::new(vec![
            entry(1, vec![0.0, 1.0]),
            entry(2, vec![1.0, 0.0]),
            entry(3, vec![1.0, 1.0]),
        ]);
        let ids: Vec<i64> = index.rank(&[1.0, 0.0], 3).iter().map(|(e, _)| e.trade_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let index = EmbeddingIndex::new(vec![
            entry(7, vec![2.0, 0.0]),
            entry(3, vec![1.0, 0.0]),
            entry(5, vec![0.5, 0.0]),
        ]);
        let ids: Vec<i64> = index.rank(&[1.0, 0.0], 2).iter().map(|(e, _)| e.trade_id).collect();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn test_empty_index() {
        let index = EmbeddingIndex::default();
        assert!(index.is_empty());
        assert!(index.rank(&[1.0], 5).is_empty());
    }
}
