use crate::domain::entities::trade::StoredTrade;
use crate::domain::error::DomainError;
use crate::domain::values::cost_basis::{Fill, OversellPolicy, RunningCost};
use serde::{Deserialize, Serialize};

/// Derived per-instrument holding. Never authored directly; always the result of
/// replaying the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub quantity: i64,
    pub avg_cost: f64,
    pub total_cost: f64,
    /// No pricing feed yet: mirrors avg_cost.
    pub current_price: f64,
    pub market_value: f64,
    pub profit: f64,
    pub profit_rate: f64,
}

impl Position {
    /// Replays one instrument's trades in the order given.
    ///
    /// Callers pass trades sorted by trade date with ties broken by row id.
    pub fn replay(
        stock_code: &str,
        trades: &[&StoredTrade],
        policy: OversellPolicy,
    ) -> Result<Self, DomainError> {
        let mut running = RunningCost::default();
        let mut stock_name: Option<String> = None;

        for trade in trades {
            let r = &trade.record;
            if let Some(name) = r.stock_name.as_ref().filter(|n| !n.is_empty()) {
                stock_name = Some(name.clone());
            }
            if let Fill::Oversold { held, requested } = running.apply(r.trade_type, r.quantity, r.amount) {
                match policy {
                    OversellPolicy::Ignore => tracing::warn!(
                        stock_code,
                        trade = trade.id,
                        held,
                        requested,
                        "sell exceeds tracked quantity, ignoring"
                    ),
                    OversellPolicy::Reject => {
                        return Err(DomainError::InvalidInput(format!(
                            "Trade {} sells {requested} of {stock_code} but only {held} held",
                            trade.id
                        )))
                    }
                }
            }
        }

        Ok(Self::from_running(stock_code, stock_name, running))
    }

    fn from_running(stock_code: &str, stock_name: Option<String>, running: RunningCost) -> Self {
        let avg_cost = running.avg_cost();
        Self {
            stock_code: stock_code.to_string(),
            stock_name,
            quantity: running.quantity,
            avg_cost,
            total_cost: if running.quantity > 0 { running.total_cost } else { 0.0 },
            current_price: avg_cost,
            market_value: avg_cost * running.quantity as f64,
            profit: 0.0,
            profit_rate: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.quantity > 0
    }
}
