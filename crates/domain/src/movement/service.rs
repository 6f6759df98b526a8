//! Movement service: the only writer of the ledger and the stock summary.

use common::MovementId;
use ledger_store::{
    CommitOptions, Committed, Direction, LedgerCommit, LedgerStore, LedgerStoreExt, LedgerWrite,
    NewMovement, StockMovement, StockSummary,
};
use tokio::sync::Mutex;

use super::{RecordInbound, RecordOutbound, ReviseMovement};
use super::{contribution, removal_delta, revision_delta, summary_of};
use crate::error::DomainError;

/// Stored versus recomputed summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    /// Summary as persisted.
    pub stored: StockSummary,

    /// Summary recomputed from the surviving movements.
    pub derived: StockSummary,
}

impl Reconciliation {
    /// Largest field difference between the two.
    pub fn drift(&self) -> f64 {
        self.stored.drift(&self.derived)
    }

    /// True if every field agrees within `tolerance`.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        self.drift() <= tolerance
    }
}

/// Service for recording, revising and deleting stock movements.
///
/// Every operation pairs its ledger write with the matching summary delta in
/// a single store commit. Writers are additionally serialized through a
/// write gate so the movement a revision reverses is the one it replaces.
pub struct MovementService<S: LedgerStore> {
    store: S,
    write_gate: Mutex<()>,
}

impl<S: LedgerStore> MovementService<S> {
    /// Creates a new movement service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    /// Returns a reference to the underlying ledger store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a purchase: stock and cost go up.
    #[tracing::instrument(skip(self))]
    pub async fn record_inbound(&self, cmd: RecordInbound) -> Result<StockMovement, DomainError> {
        let _gate = self.write_gate.lock().await;

        let weight = cmd.weight.value();
        let commit = LedgerCommit::new(
            LedgerWrite::Insert(NewMovement::now(Direction::Inbound, weight, cmd.amount)),
            contribution(Direction::Inbound, weight, cmd.amount),
        );
        let committed = self.store.commit(commit).await?;

        metrics::counter!("stock_movements_recorded_total", "direction" => "in").increment(1);
        record_stock_gauge(&committed);
        tracing::info!(
            movement_id = %committed.movement.id,
            weight_kg = weight,
            amount = cmd.amount,
            "inbound movement recorded"
        );

        Ok(committed.movement)
    }

    /// Records a sale: stock goes down by the weight in kilograms, sales go up.
    ///
    /// Fails with `InsufficientStock` if less than the sold weight is on hand.
    #[tracing::instrument(skip(self))]
    pub async fn record_outbound(&self, cmd: RecordOutbound) -> Result<StockMovement, DomainError> {
        let _gate = self.write_gate.lock().await;

        let weight_kg = cmd.weight.to_kilograms().value();
        let summary = self.store.summary().await?;
        if summary.current_stock < weight_kg {
            return Err(reject_outbound(summary.current_stock, weight_kg));
        }

        let weight = cmd.weight.value();
        // The store re-checks inside the commit in case another process sold first.
        let commit = LedgerCommit::new(
            LedgerWrite::Insert(NewMovement::now(Direction::Outbound, weight, cmd.amount)),
            contribution(Direction::Outbound, weight, cmd.amount),
        )
        .with_options(CommitOptions::require_stock(weight_kg));
        let committed = match self.store.commit(commit).await.map_err(DomainError::from) {
            Err(DomainError::InsufficientStock {
                available_kg,
                requested_kg,
            }) => return Err(reject_outbound(available_kg, requested_kg)),
            other => other?,
        };

        metrics::counter!("stock_movements_recorded_total", "direction" => "out").increment(1);
        record_stock_gauge(&committed);
        tracing::info!(
            movement_id = %committed.movement.id,
            weight_jin = weight,
            weight_kg,
            amount = cmd.amount,
            "outbound movement recorded"
        );

        Ok(committed.movement)
    }

    /// Replaces a movement's weight and amount.
    ///
    /// The old contribution is reversed and the new one applied using the
    /// movement's existing direction. The resulting stock is not checked
    /// against zero.
    #[tracing::instrument(skip(self))]
    pub async fn update_movement(&self, cmd: ReviseMovement) -> Result<StockMovement, DomainError> {
        let _gate = self.write_gate.lock().await;

        let previous = self.load(cmd.id).await?;
        self.revise(previous, cmd).await
    }

    /// Like [`update_movement`](Self::update_movement), but validates the raw
    /// fields only after the movement is found, so an unknown id is reported
    /// as `NotFound` whatever the input.
    #[tracing::instrument(skip(self))]
    pub async fn update_movement_from_input(
        &self,
        id: MovementId,
        weight: Option<f64>,
        amount: Option<f64>,
    ) -> Result<StockMovement, DomainError> {
        let _gate = self.write_gate.lock().await;

        let previous = self.load(id).await?;
        let cmd = ReviseMovement::try_from_input(id, weight, amount)?;
        self.revise(previous, cmd).await
    }

    // Caller holds the write gate.
    async fn revise(
        &self,
        previous: StockMovement,
        cmd: ReviseMovement,
    ) -> Result<StockMovement, DomainError> {
        let delta = revision_delta(&previous, cmd.weight, cmd.amount);
        let commit = LedgerCommit::new(
            LedgerWrite::Revise {
                previous,
                weight: cmd.weight,
                amount: cmd.amount,
            },
            delta,
        );
        let committed = self.store.commit(commit).await?;

        metrics::counter!("stock_movements_revised_total").increment(1);
        record_stock_gauge(&committed);
        warn_if_negative(&committed, "update");
        tracing::info!(
            movement_id = %cmd.id,
            weight = cmd.weight,
            amount = cmd.amount,
            "movement revised"
        );

        Ok(committed.movement)
    }

    /// Deletes a movement and reverses its contribution.
    ///
    /// Returns the movement as it was before deletion. The resulting stock is
    /// not checked against zero.
    #[tracing::instrument(skip(self))]
    pub async fn delete_movement(&self, id: MovementId) -> Result<StockMovement, DomainError> {
        let _gate = self.write_gate.lock().await;

        let previous = self.load(id).await?;
        let delta = removal_delta(&previous);
        let committed = self
            .store
            .commit(LedgerCommit::new(LedgerWrite::Remove { previous }, delta))
            .await?;

        metrics::counter!("stock_movements_removed_total").increment(1);
        record_stock_gauge(&committed);
        warn_if_negative(&committed, "delete");
        tracing::info!(movement_id = %id, "movement deleted");

        Ok(committed.movement)
    }

    /// Returns the current summary.
    pub async fn summary(&self) -> Result<StockSummary, DomainError> {
        Ok(self.store.summary().await?)
    }

    /// Loads a single movement.
    pub async fn get_movement(&self, id: MovementId) -> Result<StockMovement, DomainError> {
        self.load(id).await
    }

    /// Compares the stored summary with one recomputed from the ledger.
    ///
    /// Holds the write gate so no commit lands between the two reads.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<Reconciliation, DomainError> {
        let _gate = self.write_gate.lock().await;

        let stored = self.store.summary().await?;
        let movements = self.store.all_movements().await?;
        let derived = summary_of(&movements);

        Ok(Reconciliation { stored, derived })
    }

    async fn load(&self, id: MovementId) -> Result<StockMovement, DomainError> {
        self.store
            .get_movement(id)
            .await?
            .ok_or(DomainError::NotFound(id))
    }
}

fn reject_outbound(available_kg: f64, requested_kg: f64) -> DomainError {
    metrics::counter!("stock_outbound_rejected_total").increment(1);
    tracing::warn!(
        available_kg,
        requested_kg,
        "outbound movement rejected: insufficient stock"
    );
    DomainError::InsufficientStock {
        available_kg,
        requested_kg,
    }
}

fn record_stock_gauge(committed: &Committed) {
    metrics::gauge!("stock_current_kg").set(committed.summary.current_stock);
}

fn warn_if_negative(committed: &Committed, operation: &'static str) {
    if committed.summary.current_stock < 0.0 {
        tracing::warn!(
            movement_id = %committed.movement.id,
            current_stock = committed.summary.current_stock,
            operation,
            "stock is negative"
        );
    }
}
