use crate::domain::entities::position::Position;
use crate::domain::error::DomainError;

pub trait PositionRepository: Send + Sync {
    /// Replaces the stored row for the position's instrument.
    fn upsert_position(&self, position: &Position) -> Result<(), DomainError>;
    fn remove_position(&self, stock_code: &str) -> Result<(), DomainError>;
    /// Open positions ordered by instrument code.
    fn current_positions(&self) -> Result<Vec<Position>, DomainError>;
    fn stored_codes(&self) -> Result<Vec<String>, DomainError>;
}
