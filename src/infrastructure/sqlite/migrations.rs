use crate::domain::error::DomainError;
use rusqlite::Connection;
use std::collections::HashSet;

/// Columns added to `trades` after the first schema shipped. Older ledgers get
/// them through `ALTER TABLE`.
const TRADE_LATE_COLUMNS: &[(&str, &str)] = &[
    ("stock_name", "TEXT"),
    ("order_status", "TEXT"),
    ("filled_quantity", "INTEGER"),
    ("order_type", "TEXT"),
    ("duration", "TEXT"),
    ("time_slot", "TEXT"),
    ("currency", "TEXT"),
    ("market", "TEXT"),
    ("brokerage", "REAL DEFAULT 0"),
    ("tax", "REAL DEFAULT 0"),
    ("net_amount", "REAL NOT NULL DEFAULT 0"),
    ("trade_id", "TEXT"),
    ("created_at", "TEXT"),
];

const POSITION_LATE_COLUMNS: &[(&str, &str)] = &[
    ("total_cost", "REAL NOT NULL DEFAULT 0"),
    ("profit_rate", "REAL"),
];

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS trades (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trade_date TEXT NOT NULL,
            stock_code TEXT NOT NULL,
            stock_name TEXT,
            trade_type TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            price REAL NOT NULL,
            amount REAL NOT NULL,
            order_status TEXT,
            filled_quantity INTEGER,
            order_type TEXT,
            duration TEXT,
            time_slot TEXT,
            currency TEXT,
            market TEXT,
            brokerage REAL DEFAULT 0,
            tax REAL DEFAULT 0,
            net_amount REAL NOT NULL,
            trade_id TEXT,
            created_at TEXT
        );

        CREATE TABLE IF NOT EXISTS positions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stock_code TEXT NOT NULL UNIQUE,
            stock_name TEXT,
            quantity INTEGER NOT NULL,
            avg_cost REAL NOT NULL,
            total_cost REAL NOT NULL DEFAULT 0,
            current_price REAL,
            market_value REAL,
            profit REAL,
            profit_rate REAL,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            level TEXT NOT NULL,
            message TEXT NOT NULL,
            source TEXT,
            details TEXT
        );

        CREATE TABLE IF NOT EXISTS chat_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            metadata TEXT
        );

        CREATE TABLE IF NOT EXISTS embeddings (
            ord INTEGER PRIMARY KEY,
            trade_id INTEGER NOT NULL,
            vector BLOB NOT NULL,
            source_text TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| DomainError::Database(format!("Migration failed: {e}")))?;

    add_missing_columns(conn, "trades", TRADE_LATE_COLUMNS)?;
    add_missing_columns(conn, "positions", POSITION_LATE_COLUMNS)?;

    conn.execute_batch(
        "
        CREATE UNIQUE INDEX IF NOT EXISTS idx_trades_trade_id ON trades(trade_id);
        CREATE INDEX IF NOT EXISTS idx_trades_date ON trades(trade_date);
        CREATE INDEX IF NOT EXISTS idx_trades_code ON trades(stock_code);
        CREATE INDEX IF NOT EXISTS idx_chat_session ON chat_history(session_id);
        ",
    )
    .map_err(|e| DomainError::Database(format!("Index creation failed: {e}")))
}

pub fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>, DomainError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let cols = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(cols)
}

fn add_missing_columns(conn: &Connection, table: &str, columns: &[(&str, &str)]) -> Result<(), DomainError> {
    let existing = table_columns(conn, table)?;
    for (name, decl) in columns {
        if existing.contains(*name) {
            continue;
        }
        tracing::info!(table, column = *name, "adding missing column");
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {name} {decl}"))
            .map_err(|e| DomainError::Database(format!("Failed to add {table}.{name}: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_schema() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        for table in ["trades", "positions", "logs", "chat_history", "embeddings"] {
            assert!(!table_columns(&conn, table).unwrap().is_empty(), "{table} missing");
        }
    }

    #[test]
    fn test_migrations_are_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn test_legacy_trades_table_upgraded() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trade_date TEXT NOT NULL,
                stock_code TEXT NOT NULL,
                stock_name TEXT,
                trade_type TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                amount REAL NOT NULL
            );",
        )
        .unwrap();
        run_migrations(&conn).unwrap();
        let cols = table_columns(&conn, "trades").unwrap();
        assert!(cols.contains("order_status"));
        assert!(cols.contains("net_amount"));
        assert!(cols.contains("trade_id"));
    }
}
