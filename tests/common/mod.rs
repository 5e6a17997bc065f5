//! Shared test helpers and in-process fakes for the remote providers.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trademind::domain::entities::source_table::SourceTable;
use trademind::domain::error::DomainError;
use trademind::domain::ports::chat_port::{ChatMessage, ChatProvider};
use trademind::domain::ports::embedding_port::EmbeddingProvider;
use trademind::domain::ports::memory_service::MemoryService;
use trademind::{Providers, TradeMind};

pub fn setup() -> TradeMind {
    TradeMind::with_providers(":memory:", Providers::default()).unwrap()
}

pub fn setup_with(providers: Providers) -> TradeMind {
    TradeMind::with_providers(":memory:", providers).unwrap()
}

pub const COLUMNS: [&str; 10] = ["成交日期", "股票代码", "股票名称", "买卖", "股数", "成交价格", "成交金额", "佣金", "印花税", "成交编号"];

pub fn table(columns: &[&str], rows: Vec<Value>) -> SourceTable {
    SourceTable {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .into_iter()
            .map(|r| serde_json::from_value(r).unwrap())
            .collect(),
    }
}

/// Two buys on two instruments, then a partial sell of the first.
pub fn chinese_export() -> SourceTable {
    table(
        &COLUMNS,
        vec![
            json!(["2024-01-01", "000001", "平安银行", "买入", 100, 10.0, 1000.0, 5.0, 0.0, "1"]),
            json!(["2024-01-02", "000002", "万科A", "买入", 200, 20.0, 4000.0, 8.0, 0.0, "2"]),
            json!(["2024-01-03", "000001", "平安银行", "卖出", 50, 11.0, 550.0, 3.0, 0.55, "3"]),
        ],
    )
}

/// Minimal English export without trade ids: date, code, side, quantity, price.
pub fn simple_table(rows: &[(&str, &str, &str, i64, f64)]) -> SourceTable {
    table(
        &["date", "code", "type", "quantity", "price"],
        rows.iter()
            .map(|(date, code, side, qty, price)| json!([date, code, side, qty, price]))
            .collect(),
    )
}

/// Character-bucket embedding: deterministic, and texts sharing characters
/// point in similar directions.
pub fn bucket_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 32];
    for c in text.chars() {
        v[(c as usize) % 32] += 1.0;
    }
    v
}

#[derive(Default)]
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    /// Every call fails as if the endpoint were unreachable.
    pub unavailable: bool,
    /// Texts containing this substring fail individually.
    pub reject_containing: Option<String>,
}

impl FakeEmbedder {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self { unavailable: true, ..Default::default() })
    }

    pub fn rejecting(needle: &str) -> Arc<Self> {
        Arc::new(Self { reject_containing: Some(needle.to_string()), ..Default::default() })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(DomainError::ProviderUnavailable("connection refused".into()));
        }
        if let Some(needle) = &self.reject_containing {
            if text.contains(needle.as_str()) {
                return Err(DomainError::Embedding("400 Bad Request".into()));
            }
        }
        Ok(bucket_vector(text))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[derive(Default)]
pub struct FakeMemory {
    pub ingested: Mutex<Vec<String>>,
    pub consolidations: AtomicUsize,
    pub resets: AtomicUsize,
    pub fail_consolidate: bool,
    pub fail_search: bool,
    pub reject_containing: Option<String>,
    pub search_results: Vec<String>,
}

impl FakeMemory {
    pub fn working() -> Arc<Self> {
        Arc::new(Self { search_results: vec!["graph answer".into()], ..Default::default() })
    }

    pub fn failing_consolidation() -> Arc<Self> {
        Arc::new(Self { fail_consolidate: true, ..Default::default() })
    }

    pub fn ingested(&self) -> Vec<String> {
        self.ingested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MemoryService for FakeMemory {
    async fn ingest(&self, text: &str) -> Result<(), DomainError> {
        if let Some(needle) = &self.reject_containing {
            if text.contains(needle.as_str()) {
                return Err(DomainError::Remote("quota exceeded".into()));
            }
        }
        self.ingested.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn consolidate(&self) -> Result<(), DomainError> {
        self.consolidations.fetch_add(1, Ordering::SeqCst);
        if self.fail_consolidate {
            return Err(DomainError::Remote("401 Unauthorized".into()));
        }
        Ok(())
    }

    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<String>, DomainError> {
        if self.fail_search {
            return Err(DomainError::Remote("connection reset".into()));
        }
        Ok(self.search_results.iter().take(top_k).cloned().collect())
    }

    async fn reset(&self) -> Result<(), DomainError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.ingested.lock().unwrap().clear();
        Ok(())
    }
}

/// Replies from a script, in order; records every request.
#[derive(Default)]
pub struct FakeChat {
    pub replies: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeChat {
    pub fn scripted(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatProvider for FakeChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, DomainError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DomainError::Remote("script exhausted".into()))
    }
}
