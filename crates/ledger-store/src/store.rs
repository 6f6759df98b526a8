use async_trait::async_trait;

use crate::{MovementId, MovementQuery, NewMovement, Result, StockMovement, StockSummary, SummaryDelta};

/// The ledger half of a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerWrite {
    /// Append a new movement.
    Insert(NewMovement),

    /// Replace the weight and amount of an existing movement.
    ///
    /// `previous` is the record as the caller last read it; the commit fails
    /// with `StaleMovement` if the stored record no longer matches.
    Revise {
        previous: StockMovement,
        weight: f64,
        amount: f64,
    },

    /// Delete an existing movement, with the same staleness check as `Revise`.
    Remove { previous: StockMovement },
}

impl LedgerWrite {
    /// The id this write targets, if the movement already exists.
    pub fn target(&self) -> Option<MovementId> {
        match self {
            LedgerWrite::Insert(_) => None,
            LedgerWrite::Revise { previous, .. } | LedgerWrite::Remove { previous } => {
                Some(previous.id)
            }
        }
    }
}

/// Options for committing a ledger change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommitOptions {
    /// Minimum stock (kg) that must be on hand before the delta is applied.
    /// If None, no stock check is performed.
    pub required_stock: Option<f64>,
}

impl CommitOptions {
    /// Creates options with no stock check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options requiring at least `kg` on hand.
    pub fn require_stock(kg: f64) -> Self {
        Self {
            required_stock: Some(kg),
        }
    }
}

/// A ledger write paired with the summary delta it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerCommit {
    pub write: LedgerWrite,
    pub delta: SummaryDelta,
    pub options: CommitOptions,
}

impl LedgerCommit {
    pub fn new(write: LedgerWrite, delta: SummaryDelta) -> Self {
        Self {
            write,
            delta,
            options: CommitOptions::new(),
        }
    }

    pub fn with_options(mut self, options: CommitOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    /// The inserted or revised movement, or the removed one as it was.
    pub movement: StockMovement,

    /// The summary after the delta was applied.
    pub summary: StockSummary,
}

/// Core trait for ledger store implementations.
///
/// A ledger store persists stock movements and the singleton summary.
/// Every write goes through [`LedgerStore::commit`], which applies the
/// ledger change and the summary delta atomically: either both are visible
/// afterwards or neither is. All implementations must be thread-safe.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Applies a ledger write and its summary delta as one unit.
    ///
    /// Fails with `InsufficientStock` if `options.required_stock` exceeds the
    /// stock on hand, `MovementNotFound` if a revised or removed movement is
    /// gone, and `StaleMovement` if it changed since it was read. Nothing is
    /// written on failure.
    async fn commit(&self, commit: LedgerCommit) -> Result<Committed>;

    /// Returns a snapshot of the summary.
    async fn summary(&self) -> Result<StockSummary>;

    /// Retrieves a single movement.
    ///
    /// Returns None if the movement doesn't exist.
    async fn get_movement(&self, id: MovementId) -> Result<Option<StockMovement>>;

    /// Retrieves movements matching a query, newest first.
    async fn list_movements(&self, query: MovementQuery) -> Result<Vec<StockMovement>>;
}

/// Extension trait providing convenience methods for ledger stores.
#[async_trait]
pub trait LedgerStoreExt: LedgerStore {
    /// Retrieves every movement, newest first.
    async fn all_movements(&self) -> Result<Vec<StockMovement>> {
        self.list_movements(MovementQuery::new()).await
    }
}

// Blanket implementation for all LedgerStore implementations
impl<T: LedgerStore + ?Sized> LedgerStoreExt for T {}
