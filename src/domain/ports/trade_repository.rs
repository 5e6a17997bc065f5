use crate::domain::entities::trade::{StoredTrade, TradeRecord};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub limit: Option<usize>,
    pub stock_code: Option<String>,
    /// Default order is replay order: trade date ascending, then insertion order.
    pub newest_first: bool,
}

pub trait TradeRepository: Send + Sync {
    /// Returns `Ok(false)` when a trade with the same external `trade_id` exists.
    fn insert_trade(&self, trade: &TradeRecord) -> Result<bool, DomainError>;
    fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<StoredTrade>, DomainError>;
    fn count_trades(&self) -> Result<usize, DomainError>;
}
