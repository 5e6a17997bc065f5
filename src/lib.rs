pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::assistant::AssistantUseCase;
use crate::application::import::{ImportReport, ImportUseCase};
use crate::application::index::IndexUseCase;
use crate::application::memory_build::{BuildReport, MemoryBuildUseCase};
use crate::application::positions::PositionsUseCase;
use crate::application::retrieval::{RetrievalEngine, RetrievedMemory};
use crate::config::{AppConfig, EmbeddingKind};
use crate::domain::entities::knowledge_view::KnowledgeView;
use crate::domain::entities::position::Position;
use crate::domain::entities::source_table::SourceTable;
use crate::domain::entities::trade::StoredTrade;
use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::ChatProvider;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::journal::Journal;
use crate::domain::ports::memory_service::MemoryService;
use crate::domain::ports::position_repository::PositionRepository;
use crate::domain::ports::trade_repository::{TradeFilter, TradeRepository};
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::values::column_mapping::ColumnMapping;
use crate::domain::values::cost_basis::OversellPolicy;
use crate::domain::values::retrieval_mode::RetrievalMode;
use crate::infrastructure::chat::OpenAiChat;
use crate::infrastructure::embeddings::ollama::OllamaEmbedder;
use crate::infrastructure::embeddings::openai::OpenAiEmbedder;
use crate::infrastructure::memory::HttpMemoryService;
use crate::infrastructure::sqlite::journal_repo::SqliteJournal;
use crate::infrastructure::sqlite::position_repo::SqlitePositionRepo;
use crate::infrastructure::sqlite::trade_repo::SqliteTradeRepo;
use crate::infrastructure::sqlite::vector_store::SqliteVectorStore;
use std::sync::Arc;

/// Remote collaborators. Any of them may be absent.
#[derive(Default, Clone)]
pub struct Providers {
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub memory: Option<Arc<dyn MemoryService>>,
    pub chat: Option<Arc<dyn ChatProvider>>,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> Self {
        let embedder: Option<Arc<dyn EmbeddingProvider>> = match config.embedding {
            EmbeddingKind::Ollama => Some(Arc::new(OllamaEmbedder::new(
                config.embedding_base_url.clone(),
                config.embedding_model.clone(),
            ))),
            EmbeddingKind::OpenAi => Some(Arc::new(OpenAiEmbedder::new(
                config.embedding_base_url.clone().unwrap_or_else(|| config.llm_base_url.clone()),
                config.api_key.clone(),
                config.embedding_model.clone(),
            ))),
            EmbeddingKind::None => None,
        };
        let memory: Option<Arc<dyn MemoryService>> = match (&config.memory_url, config.memory_enabled) {
            (Some(url), true) => Some(Arc::new(HttpMemoryService::new(url.clone()))),
            _ => None,
        };
        let chat: Arc<dyn ChatProvider> =
            Arc::new(OpenAiChat::new(config.llm_base_url.clone(), config.api_key.clone(), config.chat_model.clone()));

        Self { embedder, memory, chat: Some(chat) }
    }
}

pub struct TradeMind {
    trades: Arc<dyn TradeRepository>,
    engine: Arc<RetrievalEngine>,
    positions_uc: Arc<PositionsUseCase>,
    import_uc: ImportUseCase,
    memory_uc: MemoryBuildUseCase,
    assistant_uc: AssistantUseCase,
}

impl TradeMind {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let tm = Self::with_options(&config.db_path, Providers::from_config(config), config.oversell)?;
        if let Some(mode) = config.forced_mode {
            tm.set_mode(mode);
        }
        Ok(tm)
    }

    pub fn with_providers(db_path: &str, providers: Providers) -> Result<Self, DomainError> {
        Self::with_options(db_path, providers, OversellPolicy::default())
    }

    pub fn with_options(db_path: &str, providers: Providers, oversell: OversellPolicy) -> Result<Self, DomainError> {
        let conn = infrastructure::sqlite::open(db_path)?;

        let trades: Arc<dyn TradeRepository> = Arc::new(SqliteTradeRepo::new(conn.clone()));
        let positions: Arc<dyn PositionRepository> = Arc::new(SqlitePositionRepo::new(conn.clone()));
        let journal: Arc<dyn Journal> = Arc::new(SqliteJournal::new(conn.clone()));
        let vectors: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::new(conn));

        let index_uc = IndexUseCase::new(trades.clone(), vectors);
        let engine = Arc::new(RetrievalEngine::new(
            trades.clone(),
            providers.embedder,
            providers.memory,
            index_uc.load()?,
        ));
        let positions_uc = Arc::new(PositionsUseCase::new(trades.clone(), positions).with_policy(oversell));

        Ok(Self {
            trades: trades.clone(),
            engine: engine.clone(),
            positions_uc: positions_uc.clone(),
            import_uc: ImportUseCase::new(trades.clone(), journal.clone(), positions_uc),
            memory_uc: MemoryBuildUseCase::new(trades, journal.clone(), index_uc, engine.clone()),
            assistant_uc: AssistantUseCase::new(engine, journal, providers.chat),
        })
    }

    pub fn import(&self, table: &SourceTable, mapping: Option<ColumnMapping>) -> Result<ImportReport, DomainError> {
        self.import_uc.execute(table, mapping)
    }

    pub fn trades(&self, filter: &TradeFilter) -> Result<Vec<StoredTrade>, DomainError> {
        self.trades.list_trades(filter)
    }

    pub fn recompute_positions(&self) -> Result<Vec<Position>, DomainError> {
        self.positions_uc.recompute_all()
    }

    pub fn positions(&self) -> Result<Vec<Position>, DomainError> {
        self.positions_uc.current()
    }

    pub async fn build_memory(&self) -> Result<BuildReport, DomainError> {
        self.memory_uc.build().await
    }

    pub async fn build_from_ledger(&self) -> Result<usize, DomainError> {
        self.memory_uc.build_from_ledger().await
    }

    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedMemory>, DomainError> {
        self.engine.query(text, k).await
    }

    pub async fn ask(&self, session_id: &str, question: &str) -> Result<String, DomainError> {
        self.assistant_uc.ask(session_id, question).await
    }

    pub fn knowledge_view(&self) -> KnowledgeView {
        self.memory_uc.knowledge_view()
    }

    pub fn refresh_knowledge_view(&self) -> Result<KnowledgeView, DomainError> {
        self.memory_uc.refresh_view()
    }

    pub async fn reset_memory(&self) -> Result<(), DomainError> {
        self.memory_uc.reset().await
    }

    pub fn mode(&self) -> RetrievalMode {
        self.engine.mode()
    }

    pub fn set_mode(&self, mode: RetrievalMode) {
        self.engine.set_mode(mode)
    }

    pub fn engine(&self) -> &Arc<RetrievalEngine> {
        &self.engine
    }
}
