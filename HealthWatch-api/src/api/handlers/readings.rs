use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use health_watch_domain::engine::TrendSummary;
use health_watch_domain::entities::reading::{Reading, ReadingSubmission};
use health_watch_domain::errors::ServiceError;
use health_watch_domain::services::readings::{ReadingFilter, ReadingOutcome, ReadingPage};

use super::SharedReadingService;
use crate::api::ApiError;
use crate::entities::common::ErrorResponse;
use crate::entities::requests::ReadingListParams;

/// Submit a vitals reading; it is classified and an alert raised when abnormal
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/readings",
    params(("patient_id" = String, Path, description = "Patient ID")),
    request_body = ReadingSubmission,
    responses(
        (status = 201, description = "Reading classified and stored", body = ReadingOutcome),
        (status = 400, description = "Missing or out-of-range vitals", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service, submission))]
pub async fn submit_reading(
    State(service): State<SharedReadingService>,
    Path(patient_id): Path<String>,
    Json(submission): Json<ReadingSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = service.submit_reading(&patient_id, submission).await?;
    info!("Reading created with ID: {}", outcome.reading.id);
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// List a patient's readings newest first, with trend statistics
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/readings",
    params(("patient_id" = String, Path, description = "Patient ID"), ReadingListParams),
    responses(
        (status = 200, description = "Page of readings", body = ReadingPage),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn list_readings(
    State(service): State<SharedReadingService>,
    Path(patient_id): Path<String>,
    Query(params): Query<ReadingListParams>,
) -> Result<Json<ReadingPage>, ApiError> {
    let filter = ReadingFilter::try_from(params).map_err(ApiError::BadRequest)?;
    Ok(Json(service.list_readings(&patient_id, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/readings/latest",
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Most recent reading", body = Reading),
        (status = 404, description = "No readings yet", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn get_latest_reading(
    State(service): State<SharedReadingService>,
    Path(patient_id): Path<String>,
) -> Result<Json<Reading>, ApiError> {
    Ok(Json(service.get_latest_reading(&patient_id).await?))
}

/// Averages and direction of change over the most recent readings
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/readings/trends",
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Trend statistics", body = TrendSummary),
        (status = 404, description = "No readings yet", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn get_trends(
    State(service): State<SharedReadingService>,
    Path(patient_id): Path<String>,
) -> Result<Json<TrendSummary>, ApiError> {
    let summary = service.get_trends(&patient_id).await?.ok_or_else(|| {
        ServiceError::InsufficientData("Not enough readings to compute trends".to_string())
    })?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1/readings/{id}",
    params(("id" = String, Path, description = "Reading ID")),
    responses(
        (status = 200, description = "Reading found", body = Reading),
        (status = 404, description = "Reading not found", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn get_reading(
    State(service): State<SharedReadingService>,
    Path(id): Path<String>,
) -> Result<Json<Reading>, ApiError> {
    Ok(Json(service.get_reading(&id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}/readings/{id}",
    params(
        ("patient_id" = String, Path, description = "Patient ID"),
        ("id" = String, Path, description = "Reading ID")
    ),
    responses(
        (status = 204, description = "Reading deleted"),
        (status = 403, description = "Reading belongs to another patient", body = ErrorResponse),
        (status = 404, description = "Reading not found", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn delete_reading(
    State(service): State<SharedReadingService>,
    Path((patient_id, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    service.delete_reading(&patient_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
