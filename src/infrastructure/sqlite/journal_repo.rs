use super::{lock, SharedConnection};
use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::{ChatMessage, ChatRole};
use crate::domain::ports::journal::Journal;
use rusqlite::params;
use rusqlite::types::ValueRef;
use serde_json::{Map, Value};

pub struct SqliteJournal {
    conn: SharedConnection,
}

impl SqliteJournal {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<{} bytes>", b.len())),
    }
}

impl Journal for SqliteJournal {
    fn add_log(&self, level: &str, message: &str, source: Option<&str>, details: Option<&str>) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO logs (timestamp, level, message, source, details) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![chrono::Utc::now().to_rfc3339(), level, message, source, details],
        )?;
        Ok(())
    }

    fn add_chat_message(&self, session_id: &str, message: &ChatMessage, metadata: Option<&str>) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO chat_history (session_id, role, content, timestamp, metadata) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session_id,
                message.role.to_string(),
                message.content,
                chrono::Utc::now().to_rfc3339(),
                metadata,
            ],
        )?;
        Ok(())
    }

    fn chat_history(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT role, content FROM (
                SELECT id, role, content FROM chat_history WHERE session_id = ?1 ORDER BY id DESC LIMIT ?2
             ) ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id, limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(role, content)| {
                let role: ChatRole = role.parse().map_err(DomainError::Parse)?;
                Ok(ChatMessage { role, content })
            })
            .collect()
    }

    fn run_read_only(&self, sql: &str, max_rows: usize) -> Result<Vec<Value>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DomainError::InvalidInput(format!("Bad query: {e}")))?;
        if !stmt.readonly() {
            return Err(DomainError::InvalidInput("Only read-only statements are allowed".into()));
        }

        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            if out.len() >= max_rows {
                break;
            }
            let mut obj = Map::new();
            for (i, name) in names.iter().enumerate() {
                obj.insert(name.clone(), value_to_json(row.get_ref(i)?));
            }
            out.push(Value::Object(obj));
        }
        Ok(out)
    }
}
