//! Record listing by local calendar date.

use chrono::NaiveDate;
use common::LocalZone;
use ledger_store::{LedgerStore, MovementQuery, StockMovement};

use crate::error::DomainError;

/// An optional, inclusive range of local calendar dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day included, from local midnight.
    pub start: Option<NaiveDate>,

    /// Last day included, through local 23:59:59.999999.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Converts the local dates into an instant filter.
    pub fn to_query(&self, zone: &LocalZone) -> MovementQuery {
        let mut query = MovementQuery::new();
        if let Some(start) = self.start {
            query = query.since(zone.start_of_day(start));
        }
        if let Some(end) = self.end {
            query = query.until(zone.end_of_day(end));
        }
        query
    }
}

/// Read side of the ledger: lists movements for a local date range.
#[derive(Clone)]
pub struct RecordQuery<S: LedgerStore> {
    store: S,
    zone: LocalZone,
}

impl<S: LedgerStore> RecordQuery<S> {
    /// Creates a query layer interpreting dates in `zone`.
    pub fn new(store: S, zone: LocalZone) -> Self {
        Self { store, zone }
    }

    /// The zone used for both filtering and display.
    pub fn zone(&self) -> &LocalZone {
        &self.zone
    }

    /// Lists movements in the range, most recent first, without any limit.
    #[tracing::instrument(skip(self))]
    pub async fn list_movements(
        &self,
        range: DateRange,
    ) -> Result<Vec<StockMovement>, DomainError> {
        let movements = self.store.list_movements(range.to_query(&self.zone)).await?;
        tracing::debug!(count = movements.len(), "movements listed");
        Ok(movements)
    }
}
