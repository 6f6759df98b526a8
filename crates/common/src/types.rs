use serde::{Deserialize, Serialize};

/// Identifier of a single stock movement in the ledger.
///
/// Assigned by the ledger store when the movement is recorded and never
/// changed afterwards. Wraps the store's integer key so movement ids cannot
/// be mixed up with weights or amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(i64);

impl MovementId {
    /// Creates a movement ID from a raw store key.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying store key.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MovementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MovementId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MovementId> for i64 {
    fn from(id: MovementId) -> Self {
        id.0
    }
}
