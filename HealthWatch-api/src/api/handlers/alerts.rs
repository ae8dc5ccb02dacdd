use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use health_watch_domain::entities::alert::{Alert, ManualAlert};
use health_watch_domain::services::alerts::{AlertFilter, AlertPage};

use super::SharedAlertService;
use crate::api::ApiError;
use crate::entities::common::{CountResponse, ErrorResponse};
use crate::entities::requests::AlertListParams;

/// List a patient's active alerts with unread and per-severity counts
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/alerts",
    params(("patient_id" = String, Path, description = "Patient ID"), AlertListParams),
    responses(
        (status = 200, description = "Page of alerts", body = AlertPage),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn list_alerts(
    State(service): State<SharedAlertService>,
    Path(patient_id): Path<String>,
    Query(params): Query<AlertListParams>,
) -> Result<Json<AlertPage>, ApiError> {
    let filter = AlertFilter::try_from(params).map_err(ApiError::BadRequest)?;
    Ok(Json(service.list_alerts(&patient_id, filter).await?))
}

/// Raise an alert outside the classifiers, such as a reminder or advice
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/alerts",
    params(("patient_id" = String, Path, description = "Patient ID")),
    request_body = ManualAlert,
    responses(
        (status = 201, description = "Alert created", body = Alert),
        (status = 400, description = "Missing title or message", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service, input))]
pub async fn create_manual_alert(
    State(service): State<SharedAlertService>,
    Path(patient_id): Path<String>,
    Json(input): Json<ManualAlert>,
) -> Result<impl IntoResponse, ApiError> {
    let alert = service.create_manual_alert(&patient_id, input).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{patient_id}/alerts/read-all",
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses((status = 200, description = "Number of alerts marked read", body = CountResponse)),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn mark_all_read(
    State(service): State<SharedAlertService>,
    Path(patient_id): Path<String>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = service.mark_all_read(&patient_id).await?;
    info!("Marked {} alerts as read", count);
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/alerts/pending",
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses((status = 200, description = "Alerts awaiting dispatch", body = [Alert])),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn patient_pending_notifications(
    State(service): State<SharedAlertService>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(service.pending_notifications(Some(&patient_id)).await?))
}

/// Alerts awaiting dispatch across all patients
#[utoipa::path(
    get,
    path = "/api/v1/alerts/pending",
    responses((status = 200, description = "Alerts awaiting dispatch", body = [Alert])),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn pending_notifications(State(service): State<SharedAlertService>) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(service.pending_notifications(None).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/alerts/{id}",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert found", body = Alert),
        (status = 404, description = "Alert not found or expired", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn get_alert(State(service): State<SharedAlertService>, Path(id): Path<String>) -> Result<Json<Alert>, ApiError> {
    Ok(Json(service.get_alert(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}/read",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert marked read", body = Alert),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn mark_read(State(service): State<SharedAlertService>, Path(id): Path<String>) -> Result<Json<Alert>, ApiError> {
    Ok(Json(service.mark_read(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}/acknowledge",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert acknowledged", body = Alert),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn acknowledge(State(service): State<SharedAlertService>, Path(id): Path<String>) -> Result<Json<Alert>, ApiError> {
    Ok(Json(service.acknowledge(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}/notification-sent",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Notification recorded", body = Alert),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn mark_notification_sent(
    State(service): State<SharedAlertService>,
    Path(id): Path<String>,
) -> Result<Json<Alert>, ApiError> {
    Ok(Json(service.mark_notification_sent(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}/family-notified",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Family notification recorded", body = Alert),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn mark_family_notified(
    State(service): State<SharedAlertService>,
    Path(id): Path<String>,
) -> Result<Json<Alert>, ApiError> {
    Ok(Json(service.mark_family_notified(&id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/alerts/{id}",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 204, description = "Alert deleted"),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    tag = "alerts"
)]
#[instrument(skip(service))]
pub async fn delete_alert(State(service): State<SharedAlertService>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    service.delete_alert(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
