//! Stock movement and summary endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use common::{LocalZone, MovementId};
use domain::{DateRange, MovementService, RecordInbound, RecordOutbound, RecordQuery};
use ledger_store::{Direction, LedgerStore, StockMovement, StockSummary, WeightUnit};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, RECORD_NOT_FOUND};

/// Shared application state accessible from all handlers.
pub struct AppState<S: LedgerStore> {
    pub movements: MovementService<S>,
    pub records: RecordQuery<S>,
}

// -- Request types --

/// Body of every movement write. Fields are optional so absence is
/// reported as a validation error rather than a decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct MovementRequest {
    pub weight: Option<f64>,
    pub amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordsParams {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: &'static str,
}

impl SuccessResponse {
    fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub current_stock: f64,
    pub total_sales: f64,
    pub total_cost: f64,
    pub profit: f64,
}

impl From<StockSummary> for SummaryResponse {
    fn from(summary: StockSummary) -> Self {
        Self {
            current_stock: summary.current_stock,
            total_sales: summary.total_sales,
            total_cost: summary.total_cost,
            profit: summary.profit(),
        }
    }
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub weight: f64,
    pub unit: &'static str,
    pub amount: f64,
    pub created_at: String,
}

impl RecordResponse {
    fn render(movement: &StockMovement, zone: &LocalZone) -> Self {
        Self {
            id: movement.id.as_i64(),
            kind: direction_label(movement.direction),
            weight: movement.weight,
            unit: unit_label(movement.unit),
            amount: movement.amount,
            created_at: zone.format(movement.recorded_at),
        }
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Inbound => "入库",
        Direction::Outbound => "出库",
    }
}

fn unit_label(unit: WeightUnit) -> &'static str {
    match unit {
        WeightUnit::Kilogram => "公斤",
        WeightUnit::Jin => "斤",
    }
}

// -- Handlers --

/// POST /stock/in — record a purchase in kilograms.
#[tracing::instrument(skip(state, payload))]
pub async fn record_in<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<MovementRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;
    let cmd = RecordInbound::try_from_input(req.weight, req.amount)?;
    state.movements.record_inbound(cmd).await?;
    Ok(SuccessResponse::ok("入库成功"))
}

/// POST /stock/out — record a sale in jin.
#[tracing::instrument(skip(state, payload))]
pub async fn record_out<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<MovementRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;
    let cmd = RecordOutbound::try_from_input(req.weight, req.amount)?;
    state.movements.record_outbound(cmd).await?;
    Ok(SuccessResponse::ok("出库成功"))
}

/// GET /stock/summary — current totals and profit.
#[tracing::instrument(skip(state))]
pub async fn summary<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.movements.summary().await?;
    Ok(Json(summary.into()))
}

/// GET /stock/records — movements filtered by local date, newest first.
#[tracing::instrument(skip(state))]
pub async fn records<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<RecordsParams>,
) -> Result<Json<Vec<RecordResponse>>, ApiError> {
    let range = DateRange::new(
        parse_date_param("start_time", params.start_time.as_deref())?,
        parse_date_param("end_time", params.end_time.as_deref())?,
    );

    let zone = state.records.zone();
    let movements = state.records.list_movements(range).await?;
    let responses: Vec<RecordResponse> = movements
        .iter()
        .map(|m| RecordResponse::render(m, zone))
        .collect();

    Ok(Json(responses))
}

/// PUT /stock/records/:id — change a movement's weight and amount.
///
/// An unknown id is reported as 404 before the body is looked at.
#[tracing::instrument(skip(state, payload))]
pub async fn update_record<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MovementRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_record_id(id)?;
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            state.movements.get_movement(id).await?;
            return Err(rejection.into());
        }
    };
    state
        .movements
        .update_movement_from_input(id, req.weight, req.amount)
        .await?;
    Ok(SuccessResponse::ok("记录更新成功"))
}

/// DELETE /stock/records/:id — delete a movement and reverse its effect.
#[tracing::instrument(skip(state))]
pub async fn delete_record<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_record_id(id)?;
    state.movements.delete_movement(id).await?;
    Ok(SuccessResponse::ok("记录删除成功"))
}

/// Blank values count as absent.
fn parse_date_param(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => LocalZone::parse_date(v)
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("Invalid {name} '{v}': {e}"))),
    }
}

// A non-numeric id cannot name a record.
fn parse_record_id(id: Result<Path<i64>, PathRejection>) -> Result<MovementId, ApiError> {
    id.map(|Path(id)| MovementId::new(id))
        .map_err(|_| ApiError::NotFound(RECORD_NOT_FOUND.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn records_render_with_local_labels_and_time() {
        let movement = StockMovement {
            id: MovementId::new(7),
            direction: Direction::Outbound,
            weight: 4.0,
            amount: 10.0,
            unit: WeightUnit::Jin,
            recorded_at: Utc.with_ymd_and_hms(2024, 3, 15, 15, 50, 0).unwrap(),
        };

        let rendered = RecordResponse::render(&movement, &LocalZone::shanghai());
        let json = serde_json::to_value(&rendered).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "出库");
        assert_eq!(json["unit"], "斤");
        assert_eq!(json["created_at"], "2024-03-15 23:50:00");
    }

    #[test]
    fn summary_response_includes_profit() {
        let summary = StockSummary {
            current_stock: 8.0,
            total_cost: 30.0,
            total_sales: 10.0,
        };
        let response = SummaryResponse::from(summary);
        assert_eq!(response.profit, -20.0);
    }

    #[test]
    fn date_params_accept_blank_and_reject_garbage() {
        assert_eq!(parse_date_param("start_time", None).unwrap(), None);
        assert_eq!(parse_date_param("start_time", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_date_param("end_time", Some("2024-03-15")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert!(matches!(
            parse_date_param("end_time", Some("15/03/2024")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
