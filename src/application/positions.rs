use crate::domain::entities::position::Position;
use crate::domain::entities::trade::StoredTrade;
use crate::domain::error::DomainError;
use crate::domain::ports::position_repository::PositionRepository;
use crate::domain::ports::trade_repository::{TradeFilter, TradeRepository};
use crate::domain::values::cost_basis::OversellPolicy;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub struct PositionsUseCase {
    trades: Arc<dyn TradeRepository>,
    positions: Arc<dyn PositionRepository>,
    policy: OversellPolicy,
}

impl PositionsUseCase {
    pub fn new(trades: Arc<dyn TradeRepository>, positions: Arc<dyn PositionRepository>) -> Self {
        Self { trades, positions, policy: OversellPolicy::default() }
    }

    pub fn with_policy(mut self, policy: OversellPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replays the whole ledger and rewrites the positions table to match it.
    /// Running it twice leaves the table unchanged.
    pub fn recompute_all(&self) -> Result<Vec<Position>, DomainError> {
        let ledger = self.trades.list_trades(&TradeFilter::default())?;

        // Ledger comes back in replay order; grouping keeps that order per code.
        let mut by_code: BTreeMap<&str, Vec<&StoredTrade>> = BTreeMap::new();
        for trade in &ledger {
            by_code.entry(trade.record.stock_code.as_str()).or_default().push(trade);
        }

        let mut open = Vec::new();
        let mut seen = HashSet::new();
        for (code, trades) in &by_code {
            seen.insert(code.to_string());
            let position = Position::replay(code, trades, self.policy)?;
            if position.is_open() {
                self.positions.upsert_position(&position)?;
                open.push(position);
            } else {
                self.positions.remove_position(code)?;
            }
        }

        for stale in self.positions.stored_codes()? {
            if !seen.contains(&stale) {
                self.positions.remove_position(&stale)?;
            }
        }

        tracing::debug!(instruments = by_code.len(), open = open.len(), "positions recomputed");
        Ok(open)
    }

    pub fn current(&self) -> Result<Vec<Position>, DomainError> {
        self.positions.current_positions()
    }
}
