//! Weight units.
//!
//! Purchases are weighed in kilograms, sales in jin. Stock is always kept
//! in kilograms.

use serde::{Deserialize, Serialize};

/// Kilograms in one jin.
pub const KG_PER_JIN: f64 = 0.5;

/// A weight in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(f64);

impl Kilograms {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Kilograms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

/// A weight in jin (half kilograms).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jin(f64);

impl Jin {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Converts to kilograms.
    pub fn to_kilograms(self) -> Kilograms {
        Kilograms(self.0 * KG_PER_JIN)
    }
}

impl std::fmt::Display for Jin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} jin", self.0)
    }
}

impl From<Jin> for Kilograms {
    fn from(jin: Jin) -> Self {
        jin.to_kilograms()
    }
}
