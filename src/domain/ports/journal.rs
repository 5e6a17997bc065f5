use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::ChatMessage;

/// Audit trail and read-only ad hoc queries. Nothing in the ledger logic reads
/// the audit tables back.
pub trait Journal: Send + Sync {
    fn add_log(&self, level: &str, message: &str, source: Option<&str>, details: Option<&str>) -> Result<(), DomainError>;
    fn add_chat_message(&self, session_id: &str, message: &ChatMessage, metadata: Option<&str>) -> Result<(), DomainError>;
    /// Oldest first.
    fn chat_history(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, DomainError>;
    /// Runs a statement the database reports as read-only, returning rows as JSON objects.
    fn run_read_only(&self, sql: &str, max_rows: usize) -> Result<Vec<serde_json::Value>, DomainError>;
}
