use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::query::sort_newest_first;
use crate::{
    LedgerStoreError, MovementId, MovementQuery, Result, StockMovement, StockSummary,
    store::{Committed, LedgerCommit, LedgerStore, LedgerWrite},
};

/// Ledger and summary guarded together so a commit is one critical section.
#[derive(Debug, Default)]
struct LedgerState {
    movements: BTreeMap<MovementId, StockMovement>,
    summary: StockSummary,
    last_id: i64,
}

impl LedgerState {
    /// Looks up the movement a revise/remove targets and checks it is unchanged.
    fn current_for(&self, previous: &StockMovement) -> Result<&StockMovement> {
        let stored = self
            .movements
            .get(&previous.id)
            .ok_or(LedgerStoreError::MovementNotFound(previous.id))?;
        if !stored.matches_values(previous.weight, previous.amount) {
            return Err(LedgerStoreError::StaleMovement(previous.id));
        }
        Ok(stored)
    }
}

/// In-memory ledger store implementation.
///
/// Holds every movement and the summary behind a single lock. Clones share
/// the same state. Used for tests and for running without a database.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Creates a new empty ledger with a zero summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of movements stored.
    pub async fn movement_count(&self) -> usize {
        self.state.read().await.movements.len()
    }

    /// Clears all movements, resets the summary to zero and restarts ids at 1.
    pub async fn clear(&self) {
        *self.state.write().await = LedgerState::default();
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn commit(&self, commit: LedgerCommit) -> Result<Committed> {
        let mut state = self.state.write().await;

        if let Some(required) = commit.options.required_stock
            && state.summary.current_stock < required
        {
            return Err(LedgerStoreError::InsufficientStock {
                available: state.summary.current_stock,
                requested: required,
            });
        }

        // Revise and remove check their target before mutating anything.
        let movement = match commit.write {
            LedgerWrite::Insert(new) => {
                state.last_id += 1;
                let movement = new.into_movement(MovementId::new(state.last_id));
                state.movements.insert(movement.id, movement.clone());
                movement
            }
            LedgerWrite::Revise {
                previous,
                weight,
                amount,
            } => {
                let mut revised = state.current_for(&previous)?.clone();
                revised.weight = weight;
                revised.amount = amount;
                state.movements.insert(revised.id, revised.clone());
                revised
            }
            LedgerWrite::Remove { previous } => {
                state.current_for(&previous)?;
                state
                    .movements
                    .remove(&previous.id)
                    .ok_or(LedgerStoreError::MovementNotFound(previous.id))?
            }
        };

        state.summary.apply(commit.delta);
        tracing::debug!(
            movement_id = %movement.id,
            current_stock = state.summary.current_stock,
            "ledger commit applied"
        );

        Ok(Committed {
            movement,
            summary: state.summary,
        })
    }

    async fn summary(&self) -> Result<StockSummary> {
        Ok(self.state.read().await.summary)
    }

    async fn get_movement(&self, id: MovementId) -> Result<Option<StockMovement>> {
        Ok(self.state.read().await.movements.get(&id).cloned())
    }

    async fn list_movements(&self, query: MovementQuery) -> Result<Vec<StockMovement>> {
        let state = self.state.read().await;
        let mut movements: Vec<_> = state
            .movements
            .values()
            .filter(|m| query.matches(m))
            .cloned()
            .collect();
        sort_newest_first(&mut movements);
        Ok(movements)
    }
}
