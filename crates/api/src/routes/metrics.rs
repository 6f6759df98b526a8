//! Prometheus metrics endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use ledger_store::LedgerStore;
use metrics_exporter_prometheus::PrometheusHandle;

use super::stock::AppState;

/// State for the metrics route: the exporter handle plus the ledger, so the
/// stock gauge reflects the stored summary even before the first write.
pub struct MetricsState<S: LedgerStore> {
    pub handle: PrometheusHandle,
    pub app: Arc<AppState<S>>,
}

/// GET /metrics — returns Prometheus-formatted metrics.
pub async fn get<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<MetricsState<S>>>,
) -> impl IntoResponse {
    match state.app.movements.summary().await {
        Ok(summary) => metrics::gauge!("stock_current_kg").set(summary.current_stock),
        Err(err) => tracing::warn!(error = %err, "could not refresh stock gauge"),
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}
