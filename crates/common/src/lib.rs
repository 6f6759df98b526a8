//! Shared types for the gas stock ledger.

pub mod time;
pub mod types;

pub use time::{LocalZone, ZoneParseError};
pub use types::MovementId;
