//! HTTP API server for the gas stock ledger.
//!
//! Provides REST endpoints for recording purchases and sales, editing and
//! deleting records, and reading the stock summary, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use common::LocalZone;
use domain::{MovementService, RecordQuery};
use ledger_store::LedgerStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::metrics::MetricsState;
use routes::stock::AppState;

/// Largest summary drift tolerated at startup before a warning is logged.
pub const STARTUP_DRIFT_TOLERANCE: f64 = 1e-6;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: LedgerStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get::<S>))
        .with_state(Arc::new(MetricsState {
            handle: metrics_handle,
            app: state.clone(),
        }));

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/stock/in", post(routes::stock::record_in::<S>))
        .route("/stock/out", post(routes::stock::record_out::<S>))
        .route("/stock/summary", get(routes::stock::summary::<S>))
        .route("/stock/records", get(routes::stock::records::<S>))
        .route(
            "/stock/records/{id}",
            put(routes::stock::update_record::<S>).delete(routes::stock::delete_record::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a ledger store.
///
/// The movement service and the record query share the same store.
pub fn create_default_state<S: LedgerStore + Clone + 'static>(
    store: S,
    zone: LocalZone,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        movements: MovementService::new(store.clone()),
        records: RecordQuery::new(store, zone),
    })
}

/// Compares the stored summary with the ledger and logs any drift.
///
/// Returns `false` when the summary disagrees with the ledger by more than
/// [`STARTUP_DRIFT_TOLERANCE`]. The stored summary is left untouched.
pub async fn check_summary<S: LedgerStore + Clone + 'static>(state: &AppState<S>) -> bool {
    match state.movements.reconcile().await {
        Ok(reconciliation) if reconciliation.is_consistent(STARTUP_DRIFT_TOLERANCE) => {
            metrics::gauge!("stock_current_kg").set(reconciliation.stored.current_stock);
            tracing::info!(
                current_stock = reconciliation.stored.current_stock,
                total_cost = reconciliation.stored.total_cost,
                total_sales = reconciliation.stored.total_sales,
                "stock summary matches ledger"
            );
            true
        }
        Ok(reconciliation) => {
            tracing::warn!(
                drift = reconciliation.drift(),
                stored = ?reconciliation.stored,
                derived = ?reconciliation.derived,
                "stock summary drifted from ledger"
            );
            false
        }
        Err(err) => {
            tracing::error!(error = %err, "could not reconcile stock summary");
            false
        }
    }
}
