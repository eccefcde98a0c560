use super::domain::BoardDecisionRecord;

/// Append-only storage for board decisions.
pub trait DecisionLedger: Send + Sync {
    /// Inserts one record atomically. An existing decision id is a conflict, never an update.
    fn append(&self, record: BoardDecisionRecord) -> Result<BoardDecisionRecord, LedgerError>;
    /// Newest first; `None` returns every record.
    fn recent(&self, limit: Option<usize>) -> Result<Vec<BoardDecisionRecord>, LedgerError>;
}

/// Error enumeration for ledger failures.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("decision already recorded")]
    Conflict,
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("ledger holds an unreadable record: {0}")]
    Corrupt(String),
}
