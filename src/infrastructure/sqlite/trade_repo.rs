use super::{lock, SharedConnection};
use crate::domain::entities::trade::{OrderMetadata, StoredTrade, TradeRecord, TRADE_DATE_FORMAT};
use crate::domain::error::DomainError;
use crate::domain::ports::trade_repository::*;
use crate::domain::values::trade_type::TradeType;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, ErrorCode};

const SELECT_COLS: &str = "id, trade_date, stock_code, stock_name, trade_type, quantity, price, amount, brokerage, tax, net_amount, trade_id, order_status, filled_quantity, order_type, duration, time_slot, currency, market";

pub struct SqliteTradeRepo {
    conn: SharedConnection,
}

impl SqliteTradeRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_trade(row: &rusqlite::Row) -> Result<StoredTrade, rusqlite::Error> {
        let date_str: String = row.get(1)?;
        let type_str: String = row.get(4)?;

        let trade_date = NaiveDateTime::parse_from_str(&date_str, TRADE_DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
        let trade_type: TradeType = type_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into())
        })?;

        Ok(StoredTrade {
            id: row.get(0)?,
            record: TradeRecord {
                trade_date,
                stock_code: row.get(2)?,
                stock_name: row.get(3)?,
                trade_type,
                quantity: row.get(5)?,
                price: row.get(6)?,
                amount: row.get(7)?,
                brokerage: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
                tax: row.get::<_, Option<f64>>(9)?.unwrap_or(0.0),
                net_amount: row.get(10)?,
                trade_id: row.get(11)?,
                order: OrderMetadata {
                    order_status: row.get(12)?,
                    filled_quantity: row.get(13)?,
                    order_type: row.get(14)?,
                    duration: row.get(15)?,
                    time_slot: row.get(16)?,
                    currency: row.get(17)?,
                    market: row.get(18)?,
                },
            },
        })
    }
}

impl TradeRepository for SqliteTradeRepo {
    fn insert_trade(&self, trade: &TradeRecord) -> Result<bool, DomainError> {
        let conn = lock(&self.conn)?;
        let result = conn.execute(
            "INSERT INTO trades (trade_date, stock_code, stock_name, trade_type, quantity, price, amount, brokerage, tax, net_amount, trade_id, order_status, filled_quantity, order_type, duration, time_slot, currency, market, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                trade.trade_date_text(),
                trade.stock_code,
                trade.stock_name,
                trade.trade_type.to_string(),
                trade.quantity,
                trade.price,
                trade.amount,
                trade.brokerage,
                trade.tax,
                trade.net_amount,
                trade.trade_id,
                trade.order.order_status,
                trade.order.filled_quantity,
                trade.order.order_type,
                trade.order.duration,
                trade.order.time_slot,
                trade.order.currency,
                trade.order.market,
                chrono::Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, msg))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                tracing::warn!(
                    trade_id = trade.trade_id.as_deref().unwrap_or(""),
                    reason = msg.as_deref().unwrap_or(""),
                    "duplicate trade skipped"
                );
                Ok(false)
            }
            Err(e) => Err(DomainError::Database(format!("Failed to insert trade: {e}"))),
        }
    }

    fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<StoredTrade>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut sql = format!("SELECT {SELECT_COLS} FROM trades WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(code) = &filter.stock_code {
            sql.push_str(&format!(" AND stock_code = ?{}", param_values.len() + 1));
            param_values.push(Box::new(code.clone()));
        }
        if filter.newest_first {
            sql.push_str(" ORDER BY trade_date DESC, id DESC");
        } else {
            sql.push_str(" ORDER BY trade_date ASC, id ASC");
        }
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let trades = stmt
            .query_map(params_refs.as_slice(), Self::row_to_trade)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(trades)
    }

    fn count_trades(&self) -> Result<usize, DomainError> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM trades", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
