use crate::application::retrieval::{RetrievalEngine, RetrievedMemory};
use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::{ChatMessage, ChatProvider, ChatRole};
use crate::domain::ports::journal::Journal;
use std::sync::Arc;

const RETRIEVAL_K: usize = 10;
const MAX_SQL_ROWS: usize = 200;
/// Question and answer pairs carried into the prompt.
const HISTORY_TURNS: usize = 20;

/// Questions containing any of these get a generated SQL lookup on top of
/// memory retrieval.
const STRUCTURED_KEYWORDS: &[&str] = &[
    "查询", "统计", "有多少", "多少钱", "数量", "成本", "利润", "how many", "total", "count", "cost", "profit",
];

const SCHEMA: &str = "\
trades(id INTEGER, trade_date TEXT 'YYYY-MM-DD HH:MM:SS', stock_code TEXT, stock_name TEXT, \
trade_type TEXT 'BUY'|'SELL', quantity INTEGER, price REAL, amount REAL, brokerage REAL, tax REAL, \
net_amount REAL, trade_id TEXT, created_at TEXT)
positions(id INTEGER, stock_code TEXT, stock_name TEXT, quantity INTEGER, avg_cost REAL, total_cost REAL, \
current_price REAL, market_value REAL, profit REAL, profit_rate REAL, updated_at TEXT)";

pub fn wants_structured_query(question: &str) -> bool {
    let lowered = question.to_lowercase();
    STRUCTURED_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().trim_end_matches("```").trim()
}

pub struct AssistantUseCase {
    engine: Arc<RetrievalEngine>,
    journal: Arc<dyn Journal>,
    chat: Option<Arc<dyn ChatProvider>>,
}

impl AssistantUseCase {
    pub fn new(engine: Arc<RetrievalEngine>, journal: Arc<dyn Journal>, chat: Option<Arc<dyn ChatProvider>>) -> Self {
        Self { engine, journal, chat }
    }

    pub async fn ask(&self, session_id: &str, question: &str) -> Result<String, DomainError> {
        let chat = self
            .chat
            .as_ref()
            .ok_or_else(|| DomainError::Config("no chat provider configured".into()))?;

        let memories = match self.engine.query(question, RETRIEVAL_K).await {
            Ok(memories) => memories,
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed, answering without memories");
                Vec::new()
            }
        };

        let structured = if wants_structured_query(question) {
            match self.structured_lookup(chat.as_ref(), question).await {
                Ok(rows) => Some(rows),
                Err(e) => {
                    tracing::warn!(error = %e, "structured lookup skipped");
                    None
                }
            }
        } else {
            None
        };

        let mut messages = self.journal.chat_history(session_id, 2 * HISTORY_TURNS)?;
        let prompt = build_prompt(question, &memories, structured.as_deref());
        messages.push(ChatMessage::user(prompt));

        let answer = chat.complete(&messages).await?;

        self.journal.add_chat_message(session_id, &ChatMessage::user(question), None)?;
        let metadata = serde_json::json!({ "mode": self.engine.mode(), "memories": memories.len() }).to_string();
        self.journal
            .add_chat_message(session_id, &ChatMessage::assistant(answer.clone()), Some(&metadata))?;
        Ok(answer)
    }

    async fn structured_lookup(&self, chat: &dyn ChatProvider, question: &str) -> Result<String, DomainError> {
        let request = ChatMessage {
            role: ChatRole::User,
            content: format!(
                "Translate the question into one SQLite SELECT statement. Reply with the SQL only.\n\n\
                 Schema:\n{SCHEMA}\n\nQuestion: {question}"
            ),
        };
        let reply = chat.complete(&[request]).await?;
        let sql = strip_code_fence(&reply);
        tracing::debug!(sql, "generated query");
        let rows = self.journal.run_read_only(sql, MAX_SQL_ROWS)?;
        serde_json::to_string(&rows).map_err(|e| DomainError::Parse(e.to_string()))
    }
}

fn build_prompt(question: &str, memories: &[RetrievedMemory], structured: Option<&str>) -> String {
    let mut prompt = String::from("You are a trading journal assistant. Answer using the information below.\n\nRelated memories:\n");
    if memories.is_empty() {
        prompt.push_str("(none)\n");
    }
    for m in memories {
        prompt.push_str("- ");
        prompt.push_str(&m.content);
        prompt.push('\n');
    }
    if let Some(rows) = structured {
        prompt.push_str("\nDatabase results:\n");
        prompt.push_str(rows);
        prompt.push('\n');
    }
    prompt.push_str("\nQuestion: ");
    prompt.push_str(question);
    prompt.push_str("\n\nAnswer concisely.");
    prompt
}
