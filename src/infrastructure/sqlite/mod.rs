pub mod journal_repo;
pub mod migrations;
pub mod position_repo;
pub mod trade_repo;
pub mod vector_store;

use crate::domain::error::DomainError;
use migrations::run_migrations;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// One connection shared by every repository. The mutex gives each store call an
/// exclusive session, so ledger writes never interleave.
pub type SharedConnection = Arc<Mutex<Connection>>;

pub const IN_MEMORY: &str = ":memory:";

/// Opens (creating if needed) the ledger database and brings its schema up to date.
///
/// An existing database file is copied to `<path>.bak` before migrating.
pub fn open(db_path: &str) -> Result<SharedConnection, DomainError> {
    let conn = if db_path == IN_MEMORY {
        Connection::open_in_memory().map_err(|e| DomainError::Database(format!("DB error: {e}")))?
    } else {
        let path = Path::new(db_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Database(format!("Failed to create DB directory: {e}")))?;
        }
        if path.exists() {
            let backup = format!("{db_path}.bak");
            std::fs::copy(path, &backup)
                .map_err(|e| DomainError::Database(format!("Backup to {backup} failed: {e}")))?;
        }
        let conn = Connection::open(path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        conn
    };

    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) fn lock(conn: &SharedConnection) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
    conn.lock().map_err(|e| DomainError::Database(e.to_string()))
}
