use crate::application::index::IndexUseCase;
use crate::application::retrieval::RetrievalEngine;
use crate::domain::entities::knowledge_view::KnowledgeView;
use crate::domain::error::DomainError;
use crate::domain::ports::journal::Journal;
use crate::domain::ports::trade_repository::{TradeFilter, TradeRepository};
use crate::domain::values::retrieval_mode::RetrievalMode;
use std::sync::{Arc, RwLock};

/// Summary of one ledger-wide memory build.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct BuildReport {
    pub trades: usize,
    pub submitted: usize,
    pub failed_submissions: usize,
    pub consolidated: bool,
    pub indexed: Option<usize>,
    pub mode: Option<RetrievalMode>,
}

/// Pushes the ledger into every memory backend and moves the retrieval engine
/// to whichever backend came out usable.
pub struct MemoryBuildUseCase {
    trades: Arc<dyn TradeRepository>,
    journal: Arc<dyn Journal>,
    index: IndexUseCase,
    engine: Arc<RetrievalEngine>,
    view: RwLock<KnowledgeView>,
}

impl MemoryBuildUseCase {
    pub fn new(
        trades: Arc<dyn TradeRepository>,
        journal: Arc<dyn Journal>,
        index: IndexUseCase,
        engine: Arc<RetrievalEngine>,
    ) -> Self {
        Self { trades, journal, index, engine, view: RwLock::new(KnowledgeView::default()) }
    }

    /// Returns the number of trades the remote memory accepted.
    pub async fn build_from_ledger(&self) -> Result<usize, DomainError> {
        Ok(self.build().await?.submitted)
    }

    pub async fn build(&self) -> Result<BuildReport, DomainError> {
        let ledger = self.trades.list_trades(&TradeFilter::default())?;
        let mut report = BuildReport { trades: ledger.len(), ..Default::default() };

        if ledger.is_empty() {
            self.set_view(KnowledgeView::default());
            report.mode = Some(self.engine.mode());
            self.audit(&report)?;
            tracing::info!("ledger is empty, nothing to build");
            return Ok(report);
        }

        if let Some(memory) = self.engine.memory() {
            for trade in &ledger {
                match memory.ingest(&trade.describe()).await {
                    Ok(()) => report.submitted += 1,
                    Err(e) => {
                        report.failed_submissions += 1;
                        tracing::warn!(trade = trade.id, error = %e, "remote memory rejected trade");
                    }
                }
            }
            match memory.consolidate().await {
                Ok(()) => {
                    report.consolidated = true;
                    self.engine.set_mode(RetrievalMode::RemoteGraph);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote consolidation failed, falling back to local retrieval");
                    self.engine.set_mode(RetrievalMode::LocalEmbedding);
                }
            }
        }

        self.set_view(KnowledgeView::from_trades(&ledger));

        if let Some(embedder) = self.engine.embedder() {
            match self.index.rebuild(embedder.as_ref()).await {
                Ok(index) => {
                    report.indexed = Some(index.len());
                    self.engine.install_index(index);
                    self.engine.set_mode(RetrievalMode::LocalEmbedding);
                }
                Err(e @ DomainError::Database(_)) => return Err(e),
                Err(e) => tracing::warn!(error = %e, "embedding index rebuild failed, keeping previous index"),
            }
        }

        report.mode = Some(self.engine.mode());
        self.audit(&report)?;
        tracing::info!(
            trades = report.trades,
            submitted = report.submitted,
            failed = report.failed_submissions,
            mode = %self.engine.mode(),
            "memory build finished"
        );
        Ok(report)
    }

    /// Rebuilds only the local node/edge view from the ledger.
    pub fn refresh_view(&self) -> Result<KnowledgeView, DomainError> {
        let ledger = self.trades.list_trades(&TradeFilter::default())?;
        let view = KnowledgeView::from_trades(&ledger);
        self.set_view(view.clone());
        Ok(view)
    }

    pub fn knowledge_view(&self) -> KnowledgeView {
        self.view.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Wipes remote memory and the local view. The ledger itself is untouched.
    pub async fn reset(&self) -> Result<(), DomainError> {
        if let Some(memory) = self.engine.memory() {
            memory.reset().await?;
        }
        self.set_view(KnowledgeView::default());
        tracing::info!("memory reset");
        Ok(())
    }

    fn audit(&self, report: &BuildReport) -> Result<(), DomainError> {
        let details = serde_json::to_string(report).ok();
        self.journal.add_log(
            "INFO",
            &format!("memory build: {} of {} trades submitted", report.submitted, report.trades),
            Some("memory_build"),
            details.as_deref(),
        )
    }

    fn set_view(&self, view: KnowledgeView) {
        *self.view.write().unwrap_or_else(|e| e.into_inner()) = view;
    }
}
