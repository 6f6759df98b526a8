use chrono::{DateTime, Utc};

use crate::StockMovement;

/// Filter for listing ledger movements.
///
/// Both bounds are inclusive instants. Results are always returned newest
/// first; there is no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementQuery {
    /// Movements recorded at or after this instant.
    pub from: Option<DateTime<Utc>>,

    /// Movements recorded at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl MovementQuery {
    /// Creates a query matching every movement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive lower bound.
    pub fn since(mut self, instant: DateTime<Utc>) -> Self {
        self.from = Some(instant);
        self
    }

    /// Sets the inclusive upper bound.
    pub fn until(mut self, instant: DateTime<Utc>) -> Self {
        self.to = Some(instant);
        self
    }

    /// Returns true if the movement falls inside the bounds.
    pub fn matches(&self, movement: &StockMovement) -> bool {
        if let Some(from) = self.from
            && movement.recorded_at < from
        {
            return false;
        }
        if let Some(to) = self.to
            && movement.recorded_at > to
        {
            return false;
        }
        true
    }
}

/// Orders movements newest first, newer ids first on equal timestamps.
pub fn sort_newest_first(movements: &mut [StockMovement]) {
    movements.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
}
