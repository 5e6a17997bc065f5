use super::{lock, SharedConnection};
use crate::domain::entities::position::Position;
use crate::domain::error::DomainError;
use crate::domain::ports::position_repository::PositionRepository;
use rusqlite::params;

pub struct SqlitePositionRepo {
    conn: SharedConnection,
}

impl SqlitePositionRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_position(row: &rusqlite::Row) -> Result<Position, rusqlite::Error> {
        Ok(Position {
            stock_code: row.get(0)?,
            stock_name: row.get(1)?,
            quantity: row.get(2)?,
            avg_cost: row.get(3)?,
            total_cost: row.get(4)?,
            current_price: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
            market_value: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
            profit: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
            profit_rate: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
        })
    }
}

impl PositionRepository for SqlitePositionRepo {
    fn upsert_position(&self, p: &Position) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO positions (stock_code, stock_name, quantity, avg_cost, total_cost, current_price, market_value, profit, profit_rate, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(stock_code) DO UPDATE SET
                stock_name = excluded.stock_name,
                quantity = excluded.quantity,
                avg_cost = excluded.avg_cost,
                total_cost = excluded.total_cost,
                current_price = excluded.current_price,
                market_value = excluded.market_value,
                profit = excluded.profit,
                profit_rate = excluded.profit_rate,
                updated_at = excluded.updated_at",
            params![
                p.stock_code,
                p.stock_name,
                p.quantity,
                p.avg_cost,
                p.total_cost,
                p.current_price,
                p.market_value,
                p.profit,
                p.profit_rate,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to upsert position {}: {e}", p.stock_code)))?;
        Ok(())
    }

    fn remove_position(&self, stock_code: &str) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute("DELETE FROM positions WHERE stock_code = ?1", params![stock_code])?;
        Ok(())
    }

    fn current_positions(&self) -> Result<Vec<Position>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT stock_code, stock_name, quantity, avg_cost, total_cost, current_price, market_value, profit, profit_rate
             FROM positions WHERE quantity > 0 ORDER BY stock_code",
        )?;
        let positions = stmt
            .query_map([], Self::row_to_position)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(positions)
    }

    fn stored_codes(&self) -> Result<Vec<String>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT stock_code FROM positions ORDER BY stock_code")?;
        let codes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(codes)
    }
}
