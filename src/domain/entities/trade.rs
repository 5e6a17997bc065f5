use crate::domain::values::trade_type::TradeType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage and display format for trade timestamps. Sorts lexicographically in
/// chronological order.
pub const TRADE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Optional order bookkeeping carried through from the broker export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderMetadata {
    pub order_status: Option<String>,
    pub filled_quantity: Option<i64>,
    pub order_type: Option<String>,
    pub duration: Option<String>,
    pub time_slot: Option<String>,
    pub currency: Option<String>,
    pub market: Option<String>,
}

/// A normalized trade. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_date: NaiveDateTime,
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub trade_type: TradeType,
    pub quantity: i64,
    pub price: f64,
    pub amount: f64,
    pub brokerage: f64,
    pub tax: f64,
    pub net_amount: f64,
    pub trade_id: Option<String>,
    #[serde(flatten)]
    pub order: OrderMetadata,
}

impl TradeRecord {
    /// Cash effect of a trade: fees are paid on top of a buy and deducted from a sell.
    pub fn net_amount_for(trade_type: TradeType, amount: f64, brokerage: f64, tax: f64) -> f64 {
        match trade_type {
            TradeType::Buy => amount + brokerage + tax,
            TradeType::Sell => amount - brokerage - tax,
        }
    }

    pub fn trade_date_text(&self) -> String {
        self.trade_date.format(TRADE_DATE_FORMAT).to_string()
    }
}

/// A trade as read back from the ledger, keyed by its insertion-ordered row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrade {
    pub id: i64,
    #[serde(flatten)]
    pub record: TradeRecord,
}

impl StoredTrade {
    /// Natural-language description used for memory ingestion and embeddings.
    pub fn describe(&self) -> String {
        let r = &self.record;
        format!(
            "Trade {}: on {} {} {} shares of {} ({}) at price {}, amount {}",
            self.id,
            r.trade_date_text(),
            r.trade_type,
            r.quantity,
            r.stock_code,
            r.stock_name.as_deref().unwrap_or(""),
            r.price,
            r.amount
        )
    }

    /// Lower-cased blob that keyword search matches against.
    pub fn keyword_text(&self) -> String {
        let r = &self.record;
        format!(
            "{} {} {} {} {} {} {}",
            r.stock_code,
            r.stock_name.as_deref().unwrap_or(""),
            r.trade_date_text(),
            r.trade_type,
            r.quantity,
            r.price,
            r.amount
        )
        .to_lowercase()
    }
}
