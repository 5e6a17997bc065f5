mod common;

use common::{chinese_export, setup, setup_with, simple_table, FakeEmbedder, FakeMemory};
use std::sync::Arc;
use trademind::config::AppConfig;
use trademind::domain::error::DomainError;
use trademind::domain::values::retrieval_mode::RetrievalMode;
use trademind::{Providers, TradeMind};

#[tokio::test]
async fn test_keyword_empty_ledger_or_query() {
    let tm = setup();
    assert!(tm.query("平安银行", 5).await.unwrap().is_empty());

    tm.import(&chinese_export(), None).unwrap();
    assert!(tm.query("   ", 5).await.unwrap().is_empty());
    assert!(tm.query("平安银行", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_keyword_ranking() {
    let tm = setup();
    assert_eq!(tm.mode(), RetrievalMode::Keyword);
    tm.import(
        &simple_table(&[
            ("2024-01-01", "600519", "BUY", 10, 1500.0),
            ("2024-01-05", "600519", "BUY", 5, 1600.0),
            ("2024-01-03", "600519", "SELL", 5, 1700.0),
            ("2024-01-02", "000858", "BUY", 100, 150.0),
        ]),
        None,
    )
    .unwrap();

    let hits = tm.query("600519 SELL", 10).await.unwrap();
    assert_eq!(hits.len(), 3);
    // Two tokens match the sell; the buys tie on one and come newest first.
    assert_eq!(hits[0].score, 2.0);
    assert!(hits[0].content.contains("SELL"));
    assert_eq!(hits[1].score, 1.0);
    assert!(hits[1].content.contains("2024-01-05"));
    assert!(hits[2].content.contains("2024-01-01"));
    assert!(hits.iter().all(|h| h.trade_id.is_some()));

    assert_eq!(tm.query("600519", 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_keyword_is_case_insensitive() {
    let tm = setup();
    tm.import(&simple_table(&[("2024-01-01", "1", "BUY", 10, 1.0)]), None).unwrap();
    let hits = tm.query("buy", 5).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_embedding_failure_falls_back_to_keywords() {
    let embedder = FakeEmbedder::rejecting("平安");
    let tm = setup_with(Providers { embedder: Some(embedder), ..Default::default() });
    tm.import(&chinese_export(), None).unwrap();
    tm.build_memory().await.unwrap();
    assert_eq!(tm.mode(), RetrievalMode::LocalEmbedding);

    // The query embedding itself fails, so keyword scoring answers.
    let hits = tm.query("平安银行", 5).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].score, 1.0);
    assert_eq!(tm.mode(), RetrievalMode::LocalEmbedding);
}

#[tokio::test]
async fn test_local_embedding_query_maps_back_to_trades() {
    let tm = setup_with(Providers { embedder: Some(FakeEmbedder::working()), ..Default::default() });
    tm.import(&chinese_export(), None).unwrap();
    tm.build_memory().await.unwrap();

    let hits = tm.query("万科A 000002", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.trade_id.is_some()));
    assert!(hits[0].score >= hits[1].score);
}

#[tokio::test]
async fn test_remote_graph_results() {
    let memory = Arc::new(FakeMemory {
        search_results: vec!["first".into(), "second".into(), "third".into()],
        ..Default::default()
    });
    let tm = setup_with(Providers { memory: Some(memory), ..Default::default() });
    assert_eq!(tm.mode(), RetrievalMode::RemoteGraph);

    let hits = tm.query("anything", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].content, "first");
    assert_eq!(hits[0].score, 1.0);
    assert_eq!(hits[1].score, 0.5);
    assert!(hits.iter().all(|h| h.trade_id.is_none()));
}

#[tokio::test]
async fn test_remote_graph_error_propagates() {
    let memory = Arc::new(FakeMemory { fail_search: true, ..Default::default() });
    let tm = setup_with(Providers { memory: Some(memory), ..Default::default() });
    tm.import(&chinese_export(), None).unwrap();

    let err = tm.query("平安银行", 5).await.unwrap_err();
    assert!(matches!(err, DomainError::Remote(_)), "{err}");
    assert_eq!(tm.mode(), RetrievalMode::RemoteGraph);
}

#[tokio::test]
async fn test_forced_remote_mode_without_service() {
    let tm = setup();
    tm.set_mode(RetrievalMode::RemoteGraph);
    let err = tm.query("x", 5).await.unwrap_err();
    assert!(matches!(err, DomainError::Config(_)));
}

#[tokio::test]
async fn test_forced_mode_from_config() {
    let config = AppConfig::from_lookup(|key| match key {
        "TRADEMIND_DB" => Some(":memory:".to_string()),
        "TRADEMIND_RETRIEVAL_MODE" => Some("keyword".to_string()),
        "TRADEMIND_MEMORY_URL" => Some("http://127.0.0.1:9".to_string()),
        _ => None,
    })
    .unwrap();
    let tm = TradeMind::new(&config).unwrap();
    assert_eq!(tm.mode(), RetrievalMode::Keyword);
    assert!(tm.query("anything", 3).await.unwrap().is_empty());
}
