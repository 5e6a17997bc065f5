pub mod column_mapping;
pub mod cost_basis;
pub mod retrieval_mode;
pub mod similarity;
pub mod trade_type;
