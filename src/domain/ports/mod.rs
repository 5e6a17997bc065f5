pub mod chat_port;
pub mod embedding_port;
pub mod journal;
pub mod memory_service;
pub mod position_repository;
pub mod trade_repository;
pub mod vector_store;
