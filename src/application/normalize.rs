//! Row-level conversion from a loosely typed broker export to a [`TradeRecord`].
//!
//! Pure: no I/O, no logging. Callers decide what to do with a rejection.

use crate::domain::entities::source_table::SourceRow;
use crate::domain::entities::trade::{OrderMetadata, TradeRecord};
use crate::domain::values::column_mapping::{ColumnMapping, TradeField};
use crate::domain::values::trade_type::TradeType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Tried in order; the first that parses the whole cell wins. The flag marks
/// formats that carry a time of day.
const DATE_FORMATS: &[(&str, bool)] = &[
    ("%Y-%m-%d %H:%M:%S", true),
    ("%Y-%m-%d %H:%M", true),
    ("%Y-%m-%d", false),
    ("%Y/%m/%d %H:%M:%S", true),
    ("%Y/%m/%d %H:%M", true),
    ("%Y/%m/%d", false),
    ("%d/%m/%Y", false),
    ("%d-%m-%Y", false),
];

static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"（.*?）|\(.*?\)").expect("static regex"));
static EXCHANGE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(SH|SZ|HK|US)$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowRejection {
    #[error("{0} is missing")]
    Missing(TradeField),

    #[error("{field} has unusable value {value:?}")]
    Invalid { field: TradeField, value: String },
}

fn invalid(field: TradeField, value: &Value) -> RowRejection {
    RowRejection::Invalid { field, value: cell_text(value).unwrap_or_default() }
}

pub fn normalize_row(row: &SourceRow<'_>, mapping: &ColumnMapping) -> Result<TradeRecord, RowRejection> {
    let cell = |field: TradeField| mapping.get(field).and_then(|col| row.cell(col));
    let required = |field: TradeField| cell(field).ok_or(RowRejection::Missing(field));

    let date_cell = required(TradeField::TradeDate)?;
    let trade_date = parse_date(date_cell).ok_or_else(|| invalid(TradeField::TradeDate, date_cell))?;

    let code_cell = required(TradeField::StockCode)?;
    let stock_code = parse_code(code_cell).ok_or_else(|| invalid(TradeField::StockCode, code_cell))?;

    let type_cell = required(TradeField::TradeType)?;
    let trade_type: TradeType = cell_text(type_cell)
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| invalid(TradeField::TradeType, type_cell))?;

    let qty_cell = required(TradeField::Quantity)?;
    let quantity = parse_integral(qty_cell)
        .filter(|q| *q > 0)
        .ok_or_else(|| invalid(TradeField::Quantity, qty_cell))?;

    let price_cell = required(TradeField::Price)?;
    let price = parse_number(price_cell)
        .filter(|p| *p > 0.0)
        .ok_or_else(|| invalid(TradeField::Price, price_cell))?;

    let number_or = |field: TradeField, default: f64| cell(field).and_then(parse_number).unwrap_or(default);
    let text = |field: TradeField| cell(field).and_then(cell_text);

    let amount = number_or(TradeField::Amount, quantity as f64 * price);
    let brokerage = number_or(TradeField::Brokerage, 0.0);
    let tax = number_or(TradeField::Tax, 0.0);
    let net_amount = number_or(
        TradeField::NetAmount,
        TradeRecord::net_amount_for(trade_type, amount, brokerage, tax),
    );

    Ok(TradeRecord {
        trade_date,
        stock_code,
        stock_name: text(TradeField::StockName),
        trade_type,
        quantity,
        price,
        amount,
        brokerage,
        tax,
        net_amount,
        trade_id: text(TradeField::TradeId),
        order: OrderMetadata {
            order_status: text(TradeField::OrderStatus),
            filled_quantity: cell(TradeField::FilledQuantity).and_then(parse_integral),
            order_type: text(TradeField::OrderType),
            duration: text(TradeField::Duration),
            time_slot: text(TradeField::TimeSlot),
            currency: text(TradeField::Currency),
            market: text(TradeField::Market),
        },
    })
}

/// Trimmed text of a cell. Whole-number floats render without a fraction so a
/// numeric `1.0` reads as `"1"`.
fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.replace(',', "").trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_integral(value: &Value) -> Option<i64> {
    let n = parse_number(value)?;
    (n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => from_unix(n.as_f64()?),
        Value::String(s) => {
            let cleaned = ANNOTATION.replace_all(s, "");
            let cleaned = cleaned.trim();
            DATE_FORMATS
                .iter()
                .find_map(|(fmt, has_time)| {
                    if *has_time {
                        NaiveDateTime::parse_from_str(cleaned, fmt).ok()
                    } else {
                        NaiveDate::parse_from_str(cleaned, fmt).ok()?.and_hms_opt(0, 0, 0)
                    }
                })
                .or_else(|| cleaned.parse::<f64>().ok().and_then(from_unix))
        }
        _ => None,
    }
}

/// Seconds since the epoch, read as UTC.
fn from_unix(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}

fn parse_code(value: &Value) -> Option<String> {
    if let Value::Number(n) = value {
        let i = n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?;
        return Some(format!("{i:06}"));
    }
    let text = cell_text(value)?;
    let code = EXCHANGE_SUFFIX.replace(&text, "").trim().to_string();
    if code.is_empty() {
        return None;
    }
    Some(code)
}
