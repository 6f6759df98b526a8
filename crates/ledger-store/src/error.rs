use thiserror::Error;

use crate::MovementId;

/// Errors that can occur when interacting with the ledger store.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    /// No movement with this id exists in the ledger.
    #[error("Movement not found: {0}")]
    MovementNotFound(MovementId),

    /// A commit guarded by `CommitOptions::require_stock` found too little stock.
    #[error("Insufficient stock: {available} kg available, {requested} kg requested")]
    InsufficientStock { available: f64, requested: f64 },

    /// The movement changed between being read and being committed.
    #[error("Movement {0} was modified concurrently")]
    StaleMovement(MovementId),

    /// The singleton summary row is missing.
    #[error("Stock summary has not been initialized")]
    SummaryMissing,

    /// A stored row could not be mapped back into a movement.
    #[error("Corrupt ledger row: {0}")]
    CorruptRow(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for ledger store operations.
pub type Result<T> = std::result::Result<T, LedgerStoreError>;
