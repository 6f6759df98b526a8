//! Domain layer for the gas stock ledger.
//!
//! This crate provides:
//! - Weight units and the fixed jin/kilogram conversion
//! - Movement commands with input validation
//! - `MovementService`, which keeps the ledger and the stock summary in
//!   agreement on every create, update and delete
//! - `RecordQuery`, which filters the ledger by local calendar dates

pub mod error;
pub mod movement;
pub mod query;
pub mod units;

pub use error::DomainError;
pub use movement::{
    MovementService, Reconciliation, RecordInbound, RecordOutbound, ReviseMovement,
    ValidationError, contribution, movement_contribution, removal_delta, revision_delta,
    summary_of, validate_input,
};
pub use query::{DateRange, RecordQuery};
pub use units::{Jin, KG_PER_JIN, Kilograms};
