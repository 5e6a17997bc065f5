//! Moving weighted-average cost basis.
//!
//! Buys add their gross amount to the running cost. Sells release a share of the
//! running cost proportional to the quantity sold, so the average cost of what
//! remains is unchanged by a disposal.

use crate::domain::values::trade_type::TradeType;
use serde::Serialize;

/// What to do with a sell larger than the tracked holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversellPolicy {
    /// Leave the running totals untouched.
    #[default]
    Ignore,
    /// Report the sell as an error.
    Reject,
}

/// Result of applying one trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Applied,
    /// The sell exceeded the holding and was not applied.
    Oversold { held: i64, requested: i64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningCost {
    pub quantity: i64,
    pub total_cost: f64,
}

impl RunningCost {
    pub fn apply(&mut self, trade_type: TradeType, quantity: i64, amount: f64) -> Fill {
        match trade_type {
            TradeType::Buy => {
                self.quantity += quantity;
                self.total_cost += amount;
                Fill::Applied
            }
            TradeType::Sell => {
                if self.quantity < quantity {
                    return Fill::Oversold {
                        held: self.quantity,
                        requested: quantity,
                    };
                }
                let sell_cost = self.total_cost / self.quantity as f64 * quantity as f64;
                self.quantity -= quantity;
                self.total_cost -= sell_cost;
                if self.quantity == 0 {
                    // float residue from repeated proportional releases
                    self.total_cost = 0.0;
                }
                Fill::Applied
            }
        }
    }

    pub fn avg_cost(&self) -> f64 {
        if self.quantity > 0 {
            self.total_cost / self.quantity as f64
        } else {
            0.0
        }
    }
}
