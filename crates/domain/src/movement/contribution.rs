//! How each movement adds to the stock summary.
//!
//! An inbound movement adds its weight to stock and its amount to cost.
//! An outbound movement removes its weight converted from jin and adds its
//! amount to sales. Revisions and removals are expressed as the inverse of
//! the old contribution, plus the new one for revisions.

use ledger_store::{Direction, StockMovement, StockSummary, SummaryDelta};

use crate::units::Jin;

/// Summary delta of a movement with `weight` in the direction's native unit.
pub fn contribution(direction: Direction, weight: f64, amount: f64) -> SummaryDelta {
    match direction {
        Direction::Inbound => SummaryDelta::new(weight, amount, 0.0),
        Direction::Outbound => {
            SummaryDelta::new(-Jin::new(weight).to_kilograms().value(), 0.0, amount)
        }
    }
}

/// Summary delta a stored movement currently accounts for.
pub fn movement_contribution(movement: &StockMovement) -> SummaryDelta {
    contribution(movement.direction, movement.weight, movement.amount)
}

/// Delta for replacing a movement's weight and amount, keeping its direction.
pub fn revision_delta(previous: &StockMovement, weight: f64, amount: f64) -> SummaryDelta {
    movement_contribution(previous).inverse() + contribution(previous.direction, weight, amount)
}

/// Delta for deleting a movement.
pub fn removal_delta(previous: &StockMovement) -> SummaryDelta {
    movement_contribution(previous).inverse()
}

/// Recomputes the summary from scratch over the surviving movements.
pub fn summary_of<'a>(movements: impl IntoIterator<Item = &'a StockMovement>) -> StockSummary {
    movements
        .into_iter()
        .fold(StockSummary::zero(), |summary, m| {
            summary.with(movement_contribution(m))
        })
}
