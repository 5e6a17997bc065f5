pub mod assistant;
pub mod import;
pub mod index;
pub mod memory_build;
pub mod normalize;
pub mod positions;
pub mod retrieval;
