//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDate};
use common::LocalZone;
use ledger_store::{
    Direction, InMemoryLedgerStore, LedgerCommit, LedgerStore, LedgerWrite, NewMovement,
    SummaryDelta,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_store().0
}

fn setup_with_store() -> (axum::Router, InMemoryLedgerStore) {
    let store = InMemoryLedgerStore::new();
    let state = api::create_default_state(store.clone(), LocalZone::shanghai());
    (api::create_app(state, get_metrics_handle()), store)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn summary(app: &axum::Router) -> Value {
    let (status, json) = send(app, get("/stock/summary")).await;
    assert_eq!(status, StatusCode::OK);
    json
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint_renders_text() {
    let app = setup();
    send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 1, "amount": 1})),
    )
    .await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_empty_summary() {
    let app = setup();

    let json = summary(&app).await;

    assert_eq!(json["current_stock"], 0.0);
    assert_eq!(json["total_sales"], 0.0);
    assert_eq!(json["total_cost"], 0.0);
    assert_eq!(json["profit"], 0.0);
}

#[tokio::test]
async fn test_inbound_updates_summary() {
    let app = setup();

    let (status, json) = send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 5, "amount": 20})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "入库成功");

    let json = summary(&app).await;
    assert_eq!(json["current_stock"], 5.0);
    assert_eq!(json["total_cost"], 20.0);
    assert_eq!(json["total_sales"], 0.0);
    assert_eq!(json["profit"], -20.0);
}

#[tokio::test]
async fn test_outbound_converts_jin_to_kilograms() {
    let app = setup();
    send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 10, "amount": 30})),
    )
    .await;

    let (status, json) = send(
        &app,
        json_request("POST", "/stock/out", json!({"weight": 4, "amount": 10})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "出库成功");

    let json = summary(&app).await;
    assert_eq!(json["current_stock"], 8.0);
    assert_eq!(json["total_sales"], 10.0);
    assert_eq!(json["profit"], -20.0);
}

#[tokio::test]
async fn test_outbound_insufficient_stock() {
    let app = setup();
    send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 3, "amount": 12})),
    )
    .await;

    let (status, json) = send(
        &app,
        json_request("POST", "/stock/out", json!({"weight": 10, "amount": 50})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "库存不足");

    let json = summary(&app).await;
    assert_eq!(json["current_stock"], 3.0);
    assert_eq!(json["total_sales"], 0.0);
}

#[tokio::test]
async fn test_missing_parameters() {
    let app = setup();

    for body in [
        json!({}),
        json!({"weight": 5}),
        json!({"amount": 5}),
        json!({"weight": 0, "amount": 5}),
        json!({"weight": 5, "amount": null}),
    ] {
        let (status, json) = send(&app, json_request("POST", "/stock/in", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "缺少必要参数");
    }

    assert_eq!(summary(&app).await["current_stock"], 0.0);
}

#[tokio::test]
async fn test_negative_values_are_rejected() {
    let app = setup();

    let (status, json) = send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": -5, "amount": 20})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());
    assert_eq!(summary(&app).await["current_stock"], 0.0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup();

    let request = Request::builder()
        .method("POST")
        .uri("/stock/in")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_records_are_listed_newest_first() {
    let app = setup();
    send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 10, "amount": 30})),
    )
    .await;
    send(
        &app,
        json_request("POST", "/stock/out", json!({"weight": 4, "amount": 10})),
    )
    .await;

    let (status, json) = send(&app, get("/stock/records")).await;

    assert_eq!(status, StatusCode::OK);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["id"], 2);
    assert_eq!(records[0]["type"], "出库");
    assert_eq!(records[0]["unit"], "斤");
    assert_eq!(records[0]["weight"], 4.0);

    assert_eq!(records[1]["id"], 1);
    assert_eq!(records[1]["type"], "入库");
    assert_eq!(records[1]["unit"], "公斤");
    assert_eq!(records[1]["amount"], 30.0);

    let created_at = records[1]["created_at"].as_str().unwrap();
    assert!(NaiveDate::parse_from_str(&created_at[..10], "%Y-%m-%d").is_ok());
    assert_eq!(created_at.len(), "2024-01-01 00:00:00".len());
}

#[tokio::test]
async fn test_records_date_filter_uses_local_days() {
    let (app, store) = setup_with_store();
    let zone = LocalZone::shanghai();
    let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    // 23:50 local on the day, then 00:10 local on the next day
    for offset in [
        Duration::hours(23) + Duration::minutes(50),
        Duration::hours(24) + Duration::minutes(10),
    ] {
        store
            .commit(LedgerCommit::new(
                LedgerWrite::Insert(NewMovement::at(
                    Direction::Inbound,
                    1.0,
                    2.0,
                    zone.start_of_day(day) + offset,
                )),
                SummaryDelta::new(1.0, 2.0, 0.0),
            ))
            .await
            .unwrap();
    }

    let (status, json) = send(
        &app,
        get("/stock/records?start_time=2024-03-15&end_time=2024-03-15"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["created_at"], "2024-03-15 23:50:00");

    let (_, json) = send(&app, get("/stock/records?start_time=2024-03-16")).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = send(&app, get("/stock/records?start_time=&end_time=")).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_records_rejects_malformed_date() {
    let app = setup();

    let (status, json) = send(&app, get("/stock/records?start_time=15-03-2024")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_update_reverses_old_contribution() {
    let app = setup();
    send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 10, "amount": 30})),
    )
    .await;
    send(
        &app,
        json_request("POST", "/stock/out", json!({"weight": 4, "amount": 10})),
    )
    .await;

    let (status, json) = send(
        &app,
        json_request("PUT", "/stock/records/2", json!({"weight": 2, "amount": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "记录更新成功");

    let json = summary(&app).await;
    assert_eq!(json["current_stock"], 9.0);
    assert_eq!(json["total_sales"], 5.0);

    let (_, json) = send(&app, get("/stock/records")).await;
    assert_eq!(json[0]["weight"], 2.0);
    assert_eq!(json[0]["type"], "出库");
}

#[tokio::test]
async fn test_update_errors() {
    let app = setup();
    send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 1, "amount": 1})),
    )
    .await;

    let (status, json) = send(
        &app,
        json_request("PUT", "/stock/records/99", json!({"weight": 2, "amount": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "记录不存在");

    // An unknown id wins over a missing or unreadable body.
    let (status, json) = send(&app, json_request("PUT", "/stock/records/99", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "记录不存在");

    let request = Request::builder()
        .method("PUT")
        .uri("/stock/records/99")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &app,
        json_request("PUT", "/stock/records/1", json!({"weight": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "缺少必要参数");

    let (status, _) = send(
        &app,
        json_request("PUT", "/stock/records/abc", json!({"weight": 2, "amount": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_reverses_contribution() {
    let app = setup();
    send(
        &app,
        json_request("POST", "/stock/in", json!({"weight": 3, "amount": 12})),
    )
    .await;

    let (status, json) = send(&app, delete("/stock/records/1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "记录删除成功");

    let json = summary(&app).await;
    assert_eq!(json["current_stock"], 0.0);
    assert_eq!(json["total_cost"], 0.0);

    let (_, json) = send(&app, get("/stock/records")).await;
    assert!(json.as_array().unwrap().is_empty());

    let (status, json) = send(&app, delete("/stock/records/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "记录不存在");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inbound_requests() {
    let app = Arc::new(setup());

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                send(
                    &app,
                    json_request("POST", "/stock/in", json!({"weight": 1, "amount": 2})),
                )
                .await
                .0
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let json = summary(&app).await;
    assert_eq!(json["current_stock"], 50.0);
    assert_eq!(json["total_cost"], 100.0);
}

#[tokio::test]
async fn test_startup_check_reports_consistent_summary() {
    let store = InMemoryLedgerStore::new();
    let state = api::create_default_state(store, LocalZone::shanghai());
    state
        .movements
        .record_inbound(domain::RecordInbound::new(2.0, 4.0).unwrap())
        .await
        .unwrap();

    assert!(api::check_summary(&state).await);
}
