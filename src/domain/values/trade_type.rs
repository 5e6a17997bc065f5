use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => write!(f, "BUY"),
            TradeType::Sell => write!(f, "SELL"),
        }
    }
}

/// Accepts the broker export spellings: English words and initials, Chinese
/// 买入/卖出 and their one-character forms, and the numeric codes 1/2.
impl FromStr for TradeType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "买入" | "买" | "BUY" | "B" | "1" => Ok(TradeType::Buy),
            "卖出" | "卖" | "SELL" | "S" | "2" => Ok(TradeType::Sell),
            _ => Err(format!("Unknown trade type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilingual_synonyms() {
        assert_eq!("买入".parse::<TradeType>(), Ok(TradeType::Buy));
        assert_eq!(" b ".parse::<TradeType>(), Ok(TradeType::Buy));
        assert_eq!("Sell".parse::<TradeType>(), Ok(TradeType::Sell));
        assert_eq!("卖".parse::<TradeType>(), Ok(TradeType::Sell));
        assert_eq!("2".parse::<TradeType>(), Ok(TradeType::Sell));
    }

    #[test]
    fn test_unknown_rejected() {
        assert!("hold".parse::<TradeType>().is_err());
        assert!("".parse::<TradeType>().is_err());
    }
}
