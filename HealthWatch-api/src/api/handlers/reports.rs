use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use health_watch_domain::entities::report::{NewReport, Report};
use health_watch_domain::services::reports::{ExtractionOutcome, ReportFilter, ReportPage, ReportStats};

use super::SharedReportService;
use crate::api::ApiError;
use crate::entities::common::ErrorResponse;
use crate::entities::requests::{ExtractionRequest, FailureRequest, ReportListParams};

/// Register a document stored by the file-storage service
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/reports",
    params(("patient_id" = String, Path, description = "Patient ID")),
    request_body = NewReport,
    responses(
        (status = 201, description = "Report registered", body = Report),
        (status = 400, description = "Invalid patient ID", body = ErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(service, input))]
pub async fn register_report(
    State(service): State<SharedReportService>,
    Path(patient_id): Path<String>,
    Json(input): Json<NewReport>,
) -> Result<impl IntoResponse, ApiError> {
    let report = service.register_report(&patient_id, input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/reports",
    params(("patient_id" = String, Path, description = "Patient ID"), ReportListParams),
    responses(
        (status = 200, description = "Page of reports", body = ReportPage),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(service))]
pub async fn list_reports(
    State(service): State<SharedReportService>,
    Path(patient_id): Path<String>,
    Query(params): Query<ReportListParams>,
) -> Result<Json<ReportPage>, ApiError> {
    let filter = ReportFilter::try_from(params).map_err(ApiError::BadRequest)?;
    Ok(Json(service.list_reports(&patient_id, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/reports/stats",
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses((status = 200, description = "Report totals", body = ReportStats)),
    tag = "reports"
)]
#[instrument(skip(service))]
pub async fn report_stats(
    State(service): State<SharedReportService>,
    Path(patient_id): Path<String>,
) -> Result<Json<ReportStats>, ApiError> {
    Ok(Json(service.report_stats(&patient_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report found", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(service))]
pub async fn get_report(State(service): State<SharedReportService>, Path(id): Path<String>) -> Result<Json<Report>, ApiError> {
    Ok(Json(service.get_report(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/processing",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report is processing", body = Report),
        (status = 409, description = "Report is already processing", body = ErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(service))]
pub async fn mark_processing(
    State(service): State<SharedReportService>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(service.mark_processing(&id).await?))
}

/// Classify extracted lab values, replacing earlier findings and alerts
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/extraction",
    params(("id" = String, Path, description = "Report ID")),
    request_body = ExtractionRequest,
    responses(
        (status = 200, description = "Report classified", body = ExtractionOutcome),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Report processing failed earlier", body = ErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(service, request))]
pub async fn apply_extraction(
    State(service): State<SharedReportService>,
    Path(id): Path<String>,
    Json(request): Json<ExtractionRequest>,
) -> Result<Json<ExtractionOutcome>, ApiError> {
    let outcome = service
        .apply_extraction(&id, &request.extraction, request.processing_time_ms)
        .await?;
    info!("Report {} classified with {} findings", id, outcome.report.findings.len());
    Ok(Json(outcome))
}

#[utoipa::path(
    put,
    path = "/api/v1/reports/{id}/failed",
    params(("id" = String, Path, description = "Report ID")),
    request_body = FailureRequest,
    responses(
        (status = 200, description = "Failure recorded", body = Report),
        (status = 409, description = "Report is already completed", body = ErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(service, request))]
pub async fn mark_failed(
    State(service): State<SharedReportService>,
    Path(id): Path<String>,
    Json(request): Json<FailureRequest>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(service.mark_failed(&id, &request.message).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}/reports/{id}",
    params(
        ("patient_id" = String, Path, description = "Patient ID"),
        ("id" = String, Path, description = "Report ID")
    ),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 403, description = "Report belongs to another patient", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(service))]
pub async fn delete_report(
    State(service): State<SharedReportService>,
    Path((patient_id, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    service.delete_report(&patient_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
