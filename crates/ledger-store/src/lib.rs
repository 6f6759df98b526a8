pub mod error;
pub mod memory;
pub mod movement;
pub mod postgres;
pub mod query;
pub mod store;
pub mod summary;

pub use common::MovementId;
pub use error::{LedgerStoreError, Result};
pub use memory::InMemoryLedgerStore;
pub use movement::{Direction, NewMovement, StockMovement, WeightUnit};
pub use postgres::PostgresLedgerStore;
pub use query::MovementQuery;
pub use store::{CommitOptions, Committed, LedgerCommit, LedgerStore, LedgerStoreExt, LedgerWrite};
pub use summary::{StockSummary, SummaryDelta};
