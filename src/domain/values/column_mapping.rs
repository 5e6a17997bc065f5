//! Binding of logical trade fields to source column names.
//!
//! Broker exports name their columns in English or Chinese and rarely agree on
//! wording. [`ColumnMapping::detect`] guesses a binding from the header row;
//! callers may override any field before normalizing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical fields a source column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeField {
    TradeDate,
    StockCode,
    StockName,
    TradeType,
    Quantity,
    Price,
    Amount,
    OrderStatus,
    FilledQuantity,
    OrderType,
    Duration,
    TimeSlot,
    Currency,
    Market,
    Brokerage,
    Tax,
    NetAmount,
    TradeId,
}

impl TradeField {
    pub const ALL: [TradeField; 18] = [
        TradeField::TradeDate,
        TradeField::StockCode,
        TradeField::StockName,
        TradeField::TradeType,
        TradeField::Quantity,
        TradeField::Price,
        TradeField::Amount,
        TradeField::OrderStatus,
        TradeField::FilledQuantity,
        TradeField::OrderType,
        TradeField::Duration,
        TradeField::TimeSlot,
        TradeField::Currency,
        TradeField::Market,
        TradeField::Brokerage,
        TradeField::Tax,
        TradeField::NetAmount,
        TradeField::TradeId,
    ];

    /// Fields whose column must be bound for an import to make sense.
    pub const REQUIRED: [TradeField; 5] = [
        TradeField::TradeDate,
        TradeField::StockCode,
        TradeField::TradeType,
        TradeField::Quantity,
        TradeField::Price,
    ];

    /// Header keywords, matched as lower-cased substrings.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            TradeField::TradeDate => &["date", "trade_date", "成交日期", "交易日期", "日期", "下单时间", "成交时间"],
            TradeField::StockCode => &["code", "stock_code", "股票代码", "代码", "证券代码"],
            TradeField::StockName => &["name", "stock_name", "股票名称", "名称", "证券名称"],
            TradeField::TradeType => &["type", "trade_type", "买卖", "交易类型", "操作", "方向", "交易方向"],
            TradeField::Quantity => &["quantity", "股数", "数量", "成交数量", "成交量", "订单数量"],
            TradeField::Price => &["price", "价格", "成交价格", "成交价", "订单价格"],
            TradeField::Amount => &["amount", "金额", "成交金额", "成交额", "订单金额"],
            TradeField::OrderStatus => &["order_status", "交易状态", "状态"],
            TradeField::FilledQuantity => &["filled_quantity", "已成交", "成交数量"],
            TradeField::OrderType => &["order_type", "订单类型", "类型"],
            TradeField::Duration => &["duration", "期限", "有效期"],
            TradeField::TimeSlot => &["time_slot", "时段", "时间范围"],
            TradeField::Currency => &["currency", "币种", "货币"],
            TradeField::Market => &["market", "市场", "交易所"],
            TradeField::Brokerage => &["brokerage", "佣金", "手续费", "费用"],
            TradeField::Tax => &["tax", "税", "印花税", "过户费"],
            TradeField::NetAmount => &["net", "净额", "净金额", "实际金额"],
            TradeField::TradeId => &["id", "trade_id", "成交编号", "流水号", "订单号"],
        }
    }
}

impl fmt::Display for TradeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeField::TradeDate => "trade_date",
            TradeField::StockCode => "stock_code",
            TradeField::StockName => "stock_name",
            TradeField::TradeType => "trade_type",
            TradeField::Quantity => "quantity",
            TradeField::Price => "price",
            TradeField::Amount => "amount",
            TradeField::OrderStatus => "order_status",
            TradeField::FilledQuantity => "filled_quantity",
            TradeField::OrderType => "order_type",
            TradeField::Duration => "duration",
            TradeField::TimeSlot => "time_slot",
            TradeField::Currency => "currency",
            TradeField::Market => "market",
            TradeField::Brokerage => "brokerage",
            TradeField::Tax => "tax",
            TradeField::NetAmount => "net_amount",
            TradeField::TradeId => "trade_id",
        };
        write!(f, "{name}")
    }
}

/// One optional source column per logical field. `None` means unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub trade_date: Option<String>,
    pub stock_code: Option<String>,
    pub stock_name: Option<String>,
    pub trade_type: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub amount: Option<String>,
    pub order_status: Option<String>,
    pub filled_quantity: Option<String>,
    pub order_type: Option<String>,
    pub duration: Option<String>,
    pub time_slot: Option<String>,
    pub currency: Option<String>,
    pub market: Option<String>,
    pub brokerage: Option<String>,
    pub tax: Option<String>,
    pub net_amount: Option<String>,
    pub trade_id: Option<String>,
}

impl ColumnMapping {
    /// Binds each field to the first column (in header order) whose lower-cased
    /// name contains one of the field's keywords.
    ///
    /// Required fields are bound first, and a column claimed by a required field
    /// is never reused for an optional one.
    pub fn detect(columns: &[String]) -> Self {
        let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
        let mut mapping = ColumnMapping::default();
        let mut claimed = vec![false; columns.len()];

        let optional = TradeField::ALL.into_iter().filter(|f| !TradeField::REQUIRED.contains(f));
        for field in TradeField::REQUIRED.into_iter().chain(optional) {
            let required = TradeField::REQUIRED.contains(&field);
            let hit = lowered.iter().enumerate().position(|(idx, col)| {
                (required || !claimed[idx]) && field.keywords().iter().any(|kw| header_matches(col, kw))
            });
            if let Some(idx) = hit {
                if required {
                    claimed[idx] = true;
                }
                *mapping.slot_mut(field) = Some(columns[idx].clone());
            }
        }
        mapping
    }

    pub fn get(&self, field: TradeField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: TradeField, column: Option<String>) {
        *self.slot_mut(field) = column;
    }

    /// Required fields that have no column bound.
    pub fn missing_required(&self) -> Vec<TradeField> {
        TradeField::REQUIRED
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    fn slot(&self, field: TradeField) -> &Option<String> {
        match field {
            TradeField::TradeDate => &self.trade_date,
            TradeField::StockCode => &self.stock_code,
            TradeField::StockName => &self.stock_name,
            TradeField::TradeType => &self.trade_type,
            TradeField::Quantity => &self.quantity,
            TradeField::Price => &self.price,
            TradeField::Amount => &self.amount,
            TradeField::OrderStatus => &self.order_status,
            TradeField::FilledQuantity => &self.filled_quantity,
            TradeField::OrderType => &self.order_type,
            TradeField::Duration => &self.duration,
            TradeField::TimeSlot => &self.time_slot,
            TradeField::Currency => &self.currency,
            TradeField::Market => &self.market,
            TradeField::Brokerage => &self.brokerage,
            TradeField::Tax => &self.tax,
            TradeField::NetAmount => &self.net_amount,
            TradeField::TradeId => &self.trade_id,
        }
    }

    fn slot_mut(&mut self, field: TradeField) -> &mut Option<String> {
        match field {
            TradeField::TradeDate => &mut self.trade_date,
            TradeField::StockCode => &mut self.stock_code,
            TradeField::StockName => &mut self.stock_name,
            TradeField::TradeType => &mut self.trade_type,
            TradeField::Quantity => &mut self.quantity,
            TradeField::Price => &mut self.price,
            TradeField::Amount => &mut self.amount,
            TradeField::OrderStatus => &mut self.order_status,
            TradeField::FilledQuantity => &mut self.filled_quantity,
            TradeField::OrderType => &mut self.order_type,
            TradeField::Duration => &mut self.duration,
            TradeField::TimeSlot => &mut self.time_slot,
            TradeField::Currency => &mut self.currency,
            TradeField::Market => &mut self.market,
            TradeField::Brokerage => &mut self.brokerage,
            TradeField::Tax => &mut self.tax,
            TradeField::NetAmount => &mut self.net_amount,
            TradeField::TradeId => &mut self.trade_id,
        }
    }
}

/// Substring match, except that two-letter ASCII keywords such as `id` must
/// stand alone so "side" or "paid" do not count.
fn header_matches(column: &str, keyword: &str) -> bool {
    if keyword.len() > 2 || !keyword.is_ascii() {
        return column.contains(keyword);
    }
    column
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == keyword)
}
