//! Movement commands.

use common::MovementId;

use super::ValidationError;
use crate::units::{Jin, Kilograms};

/// Checks a raw weight/amount pair.
///
/// Both must be present, finite and non-zero; weight must be positive and
/// amount must not be negative.
pub fn validate_input(weight: Option<f64>, amount: Option<f64>) -> Result<(f64, f64), ValidationError> {
    let weight = weight.ok_or(ValidationError::MissingWeight)?;
    let amount = amount.ok_or(ValidationError::MissingAmount)?;

    if !weight.is_finite() {
        return Err(ValidationError::NotFinite("weight"));
    }
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite("amount"));
    }
    if weight == 0.0 {
        return Err(ValidationError::MissingWeight);
    }
    if amount == 0.0 {
        return Err(ValidationError::MissingAmount);
    }
    if weight < 0.0 {
        return Err(ValidationError::NonPositiveWeight(weight));
    }
    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount(amount));
    }

    Ok((weight, amount))
}

/// Command to record a purchase of gas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordInbound {
    /// Weight bought.
    pub weight: Kilograms,

    /// Purchase cost.
    pub amount: f64,
}

impl RecordInbound {
    /// Creates a validated RecordInbound command.
    pub fn new(weight_kg: f64, amount: f64) -> Result<Self, ValidationError> {
        Self::try_from_input(Some(weight_kg), Some(amount))
    }

    /// Creates the command from optional request fields.
    pub fn try_from_input(weight_kg: Option<f64>, amount: Option<f64>) -> Result<Self, ValidationError> {
        let (weight, amount) = validate_input(weight_kg, amount)?;
        Ok(Self {
            weight: Kilograms::new(weight),
            amount,
        })
    }
}

/// Command to record a sale of gas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordOutbound {
    /// Weight sold.
    pub weight: Jin,

    /// Sale revenue.
    pub amount: f64,
}

impl RecordOutbound {
    /// Creates a validated RecordOutbound command.
    pub fn new(weight_jin: f64, amount: f64) -> Result<Self, ValidationError> {
        Self::try_from_input(Some(weight_jin), Some(amount))
    }

    /// Creates the command from optional request fields.
    pub fn try_from_input(weight_jin: Option<f64>, amount: Option<f64>) -> Result<Self, ValidationError> {
        let (weight, amount) = validate_input(weight_jin, amount)?;
        Ok(Self {
            weight: Jin::new(weight),
            amount,
        })
    }
}

/// Command to change the weight and amount of an existing movement.
///
/// The weight is in the movement's own unit; direction cannot change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviseMovement {
    pub id: MovementId,
    pub weight: f64,
    pub amount: f64,
}

impl ReviseMovement {
    /// Creates a validated ReviseMovement command.
    pub fn new(id: MovementId, weight: f64, amount: f64) -> Result<Self, ValidationError> {
        Self::try_from_input(id, Some(weight), Some(amount))
    }

    /// Creates the command from optional request fields.
    pub fn try_from_input(
        id: MovementId,
        weight: Option<f64>,
        amount: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let (weight, amount) = validate_input(weight, amount)?;
        Ok(Self { id, weight, amount })
    }
}
