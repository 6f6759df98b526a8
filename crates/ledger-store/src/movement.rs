use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MovementId;

/// Which way gas moved.
///
/// Inbound movements are purchases weighed in kilograms; outbound movements
/// are sales weighed in jin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Storage code used by the database backend.
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Inbound => "in",
            Direction::Outbound => "out",
        }
    }

    /// Parses a storage code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "in" => Some(Direction::Inbound),
            "out" => Some(Direction::Outbound),
            _ => None,
        }
    }

    /// The unit weights are recorded in for this direction.
    pub fn unit(&self) -> WeightUnit {
        match self {
            Direction::Inbound => WeightUnit::Kilogram,
            Direction::Outbound => WeightUnit::Jin,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Unit tag kept on each movement for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kilogram,
    Jin,
}

impl WeightUnit {
    /// Storage code used by the database backend.
    pub fn code(&self) -> &'static str {
        match self {
            WeightUnit::Kilogram => "kg",
            WeightUnit::Jin => "jin",
        }
    }

    /// Parses a storage code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "kg" => Some(WeightUnit::Kilogram),
            "jin" => Some(WeightUnit::Jin),
            _ => None,
        }
    }
}

/// A movement as it is about to be written; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    pub direction: Direction,
    /// Weight in the direction's native unit.
    pub weight: f64,
    pub amount: f64,
    pub recorded_at: DateTime<Utc>,
}

impl NewMovement {
    /// Creates a movement stamped with the current instant.
    pub fn now(direction: Direction, weight: f64, amount: f64) -> Self {
        Self::at(direction, weight, amount, Utc::now())
    }

    /// Creates a movement stamped with an explicit instant.
    pub fn at(direction: Direction, weight: f64, amount: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            direction,
            weight,
            amount,
            recorded_at,
        }
    }

    pub(crate) fn into_movement(self, id: MovementId) -> StockMovement {
        StockMovement {
            id,
            direction: self.direction,
            weight: self.weight,
            amount: self.amount,
            unit: self.direction.unit(),
            recorded_at: self.recorded_at,
        }
    }
}

/// One persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub direction: Direction,
    /// Weight in `unit`.
    pub weight: f64,
    /// Purchase cost for inbound movements, sale revenue for outbound ones.
    pub amount: f64,
    pub unit: WeightUnit,
    pub recorded_at: DateTime<Utc>,
}

impl StockMovement {
    /// Returns true if `weight` and `amount` still match this record.
    pub fn matches_values(&self, weight: f64, amount: f64) -> bool {
        self.weight == weight && self.amount == amount
    }
}
