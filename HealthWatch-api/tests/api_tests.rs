use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use health_watch_api::api::{routes::create_app, AppState};
use health_watch_data::repository::{AlertRepository, ReadingRepository, ReportRepository};
use health_watch_domain::config::EngineConfig;
use health_watch_domain::services::{AlertService, ReadingService, ReportService};
use health_watch_domain::testing::MockHealthService;

/// Router over in-memory repositories; the services share one alert store
async fn test_app() -> Router {
    let config = EngineConfig::default();
    let alerts = AlertRepository::in_memory();
    let state = AppState {
        readings: Arc::new(ReadingService::new(ReadingRepository::in_memory(), alerts.clone(), &config)),
        alerts: Arc::new(AlertService::new(alerts.clone(), &config)),
        reports: Arc::new(ReportService::new(ReportRepository::in_memory(), alerts, &config)),
        health: Arc::new(MockHealthService::new()),
    };
    create_app(state).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn vitals(systolic: u16, diastolic: u16, heart_rate: u16, sugar: f64, sleep_hours: f64) -> Value {
    json!({
        "bp": {"systolic": systolic, "diastolic": diastolic},
        "heartRate": heart_rate,
        "sugar": sugar,
        "sleepHours": sleep_hours,
        "weight": 70.0
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_normal_reading_raises_no_alert() {
    let app = test_app().await;
    let patient = Uuid::new_v4();

    let uri = format!("/api/v1/patients/{}/readings", patient);
    let (status, body) = send(&app, Method::POST, &uri, Some(vitals(118, 76, 72, 95.0, 7.5))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["abnormality"]["level"], "normal");
    assert_eq!(body["healthStatus"]["title"], "All Good!");
    assert_eq!(body["alerts"].as_array().unwrap().len(), 0);

    let (status, body) = send(&app, Method::GET, &format!("{}/latest", uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bp"]["systolic"], 118);
}

#[tokio::test]
async fn test_danger_reading_creates_unread_alert() {
    let app = test_app().await;
    let patient = Uuid::new_v4();

    let uri = format!("/api/v1/patients/{}/readings", patient);
    let (status, body) = send(&app, Method::POST, &uri, Some(vitals(185, 95, 72, 95.0, 7.5))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["abnormality"]["level"], "danger");
    assert_eq!(body["abnormality"]["flags"]["highBP"], true);
    assert_eq!(body["alerts"][0]["severity"], "danger");
    assert_eq!(body["alerts"][0]["priority"], 10);

    let alerts_uri = format!("/api/v1/patients/{}/alerts", patient);
    let (status, page) = send(&app, Method::GET, &alerts_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["summary"]["unreadCount"], 1);
    assert_eq!(page["summary"]["bySeverity"]["danger"], 1);

    let alert_id = page["alerts"][0]["id"].as_str().unwrap().to_string();
    let (status, alert) = send(&app, Method::PUT, &format!("/api/v1/alerts/{}/acknowledge", alert_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alert["isRead"], true);
    assert_eq!(alert["isAcknowledged"], true);

    let (_, page) = send(&app, Method::GET, &alerts_uri, None).await;
    assert_eq!(page["summary"]["unreadCount"], 0);
}

#[tokio::test]
async fn test_incomplete_reading_is_rejected() {
    let app = test_app().await;
    let uri = format!("/api/v1/patients/{}/readings", Uuid::new_v4());

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({"heartRate": 80}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "incomplete_input");

    let (status, body) = send(&app, Method::POST, &uri, Some(vitals(400, 80, 72, 95.0, 7.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_trends_need_readings() {
    let app = test_app().await;
    let uri = format!("/api/v1/patients/{}/readings/trends", Uuid::new_v4());

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "insufficient_data");
}

#[tokio::test]
async fn test_reading_delete_is_owner_only() {
    let app = test_app().await;
    let patient = Uuid::new_v4();
    let uri = format!("/api/v1/patients/{}/readings", patient);
    let (_, body) = send(&app, Method::POST, &uri, Some(vitals(118, 76, 72, 95.0, 7.5))).await;
    let id = body["reading"]["id"].as_str().unwrap().to_string();

    let stranger = format!("/api/v1/patients/{}/readings/{}", Uuid::new_v4(), id);
    let (status, _) = send(&app, Method::DELETE, &stranger, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &format!("{}/{}", uri, id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/readings/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_extraction_flow() {
    let app = test_app().await;
    let patient = Uuid::new_v4();

    let reports_uri = format!("/api/v1/patients/{}/reports", patient);
    let (status, report) = send(
        &app,
        Method::POST,
        &reports_uri,
        Some(json!({"reportType": "blood_test", "fileName": "cbc.pdf", "fileType": "pdf"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["status"], "uploaded");
    let id = report["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, &format!("/api/v1/reports/{}/processing", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, &format!("/api/v1/reports/{}/processing", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");

    let extraction = json!({
        "extraction": {"bloodTest": {"hemoglobin": 7.2, "wbc": "5600"}, "confidence": 88},
        "processingTimeMs": 950
    });
    let (status, outcome) =
        send(&app, Method::POST, &format!("/api/v1/reports/{}/extraction", id), Some(extraction)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["report"]["status"], "completed");
    assert_eq!(outcome["report"]["findings"][0]["parameter"], "Hemoglobin");
    assert_eq!(outcome["report"]["findings"][0]["severity"], "critical");
    assert_eq!(outcome["summary"]["critical"], 1);
    assert_eq!(outcome["alerts"][0]["type"], "report_critical");

    let (status, stats) = send(&app, Method::GET, &format!("{}/stats", reports_uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["byStatus"]["completed"], 1);
    assert_eq!(stats["totalFindings"], 1);

    let alerts_uri = format!("/api/v1/patients/{}/alerts?type=report_critical", patient);
    let (_, page) = send(&app, Method::GET, &alerts_uri, None).await;
    assert_eq!(page["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_manual_alert_and_notification_bookkeeping() {
    let app = test_app().await;
    let patient = Uuid::new_v4();
    let alerts_uri = format!("/api/v1/patients/{}/alerts", patient);

    let manual = json!({
        "type": "medication_reminder",
        "severity": "info",
        "title": "Evening dose",
        "message": "Take your evening medication"
    });
    let (status, alert) = send(&app, Method::POST, &alerts_uri, Some(manual)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(alert["priority"], 3);
    let id = alert["id"].as_str().unwrap().to_string();

    let (_, pending) = send(&app, Method::GET, &format!("{}/pending", alerts_uri), None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, alert) = send(&app, Method::PUT, &format!("/api/v1/alerts/{}/notification-sent", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alert["notificationSent"], true);

    let (_, pending) = send(&app, Method::GET, &format!("{}/pending", alerts_uri), None).await;
    assert!(pending.as_array().unwrap().is_empty());

    let (status, count) = send(&app, Method::PUT, &format!("{}/read-all", alerts_uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["count"], 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/alerts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/alerts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_query_parameters() {
    let app = test_app().await;
    let patient = Uuid::new_v4();

    let (status, body) =
        send(&app, Method::GET, &format!("/api/v1/patients/{}/alerts?sortBy=color", patient), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = send(&app, Method::GET, "/api/v1/patients/not-a-uuid/reports", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
