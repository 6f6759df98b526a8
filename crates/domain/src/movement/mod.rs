//! Stock movements: commands, summary contributions and the service.

mod commands;
mod contribution;
mod service;

pub use commands::*;
pub use contribution::{contribution, movement_contribution, removal_delta, revision_delta, summary_of};
pub use service::{MovementService, Reconciliation};

use thiserror::Error;

/// Reasons a weight/amount pair is rejected.
///
/// A zero weight or amount counts as missing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Weight is absent or zero.
    #[error("weight is required")]
    MissingWeight,

    /// Amount is absent or zero.
    #[error("amount is required")]
    MissingAmount,

    /// Weight is below zero.
    #[error("invalid weight: {0} (must be greater than 0)")]
    NonPositiveWeight(f64),

    /// Amount is below zero.
    #[error("invalid amount: {0} (must not be negative)")]
    NegativeAmount(f64),

    /// NaN or infinite input.
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}

impl ValidationError {
    /// True for the absent/zero cases.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingWeight | ValidationError::MissingAmount
        )
    }
}
