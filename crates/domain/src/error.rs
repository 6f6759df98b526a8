//! Domain error types.

use common::MovementId;
use ledger_store::LedgerStoreError;
use thiserror::Error;

use crate::movement::ValidationError;

/// Errors that can occur during movement operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request carried a missing or invalid weight or amount.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An outbound movement asked for more gas than is in stock.
    #[error("Insufficient stock: {available_kg} kg on hand, {requested_kg} kg requested")]
    InsufficientStock { available_kg: f64, requested_kg: f64 },

    /// No movement with this id exists.
    #[error("Movement not found: {0}")]
    NotFound(MovementId),

    /// An error occurred in the ledger store.
    #[error("Ledger store error: {0}")]
    Store(LedgerStoreError),
}

impl From<LedgerStoreError> for DomainError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::MovementNotFound(id) => DomainError::NotFound(id),
            LedgerStoreError::InsufficientStock {
                available,
                requested,
            } => DomainError::InsufficientStock {
                available_kg: available,
                requested_kg: requested,
            },
            other => DomainError::Store(other),
        }
    }
}
