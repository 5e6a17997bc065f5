pub mod embedding;
pub mod knowledge_view;
pub mod position;
pub mod source_table;
pub mod trade;
