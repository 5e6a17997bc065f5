use crate::domain::entities::trade::StoredTrade;
use crate::domain::values::trade_type::TradeType;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KnowledgeNode {
    Stock {
        id: String,
        stock_code: String,
        stock_name: Option<String>,
    },
    Trade {
        id: String,
        trade_id: Option<String>,
        trade_date: String,
        trade_type: TradeType,
        quantity: i64,
        price: f64,
        amount: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeEdge {
    pub source: String,
    pub target: String,
    pub relation: TradeType,
}

/// Lightweight node/edge picture of the ledger for display. Independent of
/// whichever backend answers queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KnowledgeView {
    pub nodes: Vec<KnowledgeNode>,
    pub edges: Vec<KnowledgeEdge>,
}

impl KnowledgeView {
    pub fn from_trades(trades: &[StoredTrade]) -> Self {
        let mut seen = HashSet::new();
        let mut view = KnowledgeView::default();

        for trade in trades {
            let r = &trade.record;
            let trade_node = format!("trade_{}", trade.id);
            let stock_node = format!("stock_{}", r.stock_code);

            if seen.insert(stock_node.clone()) {
                view.nodes.push(KnowledgeNode::Stock {
                    id: stock_node.clone(),
                    stock_code: r.stock_code.clone(),
                    stock_name: r.stock_name.clone(),
                });
            }
            if seen.insert(trade_node.clone()) {
                view.nodes.push(KnowledgeNode::Trade {
                    id: trade_node.clone(),
                    trade_id: r.trade_id.clone(),
                    trade_date: r.trade_date_text(),
                    trade_type: r.trade_type,
                    quantity: r.quantity,
                    price: r.price,
                    amount: r.amount,
                });
            }
            view.edges.push(KnowledgeEdge {
                source: trade_node,
                target: stock_node,
                relation: r.trade_type,
            });
        }

        view
    }
}
