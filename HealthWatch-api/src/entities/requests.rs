use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use health_watch_data::models::AlertSortField;
use health_watch_domain::engine::severity::AlertSeverity;
use health_watch_domain::entities::alert::AlertType;
use health_watch_domain::entities::report::{ReportStatus, ReportType};
use health_watch_domain::services::alerts::AlertFilter;
use health_watch_domain::services::readings::ReadingFilter;
use health_watch_domain::services::reports::ReportFilter;

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|date| date.with_timezone(&Utc))
                .map_err(|_| format!("Invalid {} format. Use ISO 8601 (e.g. 2024-03-15T08:30:00Z)", field))
        })
        .transpose()
}

/// Query parameters for listing readings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReadingListParams {
    /// ISO 8601 start of the range
    pub start_date: Option<String>,
    /// ISO 8601 end of the range
    pub end_date: Option<String>,
    /// Page number starting at 1
    pub page: Option<usize>,
    /// Page size (default: 30, max: 100)
    pub limit: Option<usize>,
}

impl TryFrom<ReadingListParams> for ReadingFilter {
    type Error = String;

    fn try_from(params: ReadingListParams) -> Result<Self, Self::Error> {
        Ok(ReadingFilter {
            start: parse_date("startDate", params.start_date.as_deref())?,
            end: parse_date("endDate", params.end_date.as_deref())?,
            page: params.page,
            limit: params.limit,
        })
    }
}

/// Query parameters for listing alerts
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AlertListParams {
    /// info, warning, danger or critical
    pub severity: Option<String>,
    /// Alert type, e.g. reading_abnormal
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub is_read: Option<bool>,
    /// createdAt (default), priority or severity
    pub sort_by: Option<String>,
    /// asc or desc (default)
    pub order: Option<String>,
    pub page: Option<usize>,
    /// Page size (default: 50, max: 100)
    pub limit: Option<usize>,
}

impl TryFrom<AlertListParams> for AlertFilter {
    type Error = String;

    fn try_from(params: AlertListParams) -> Result<Self, Self::Error> {
        let severity = params
            .severity
            .map(|s| AlertSeverity::parse(&s).ok_or_else(|| format!("Unknown severity: {}", s)))
            .transpose()?;
        let alert_type = params
            .alert_type
            .map(|t| AlertType::parse(&t).ok_or_else(|| format!("Unknown alert type: {}", t)))
            .transpose()?;
        let sort_by = match params.sort_by.as_deref() {
            None | Some("createdAt") => AlertSortField::CreatedAt,
            Some("priority") => AlertSortField::Priority,
            Some("severity") => AlertSortField::Severity,
            Some(other) => return Err(format!("Unknown sort field: {}", other)),
        };
        let descending = match params.order.as_deref() {
            None | Some("desc") => true,
            Some("asc") => false,
            Some(other) => return Err(format!("Unknown sort order: {}", other)),
        };

        Ok(AlertFilter {
            severity,
            alert_type,
            is_read: params.is_read,
            sort_by,
            descending: Some(descending),
            page: params.page,
            limit: params.limit,
        })
    }
}

/// Query parameters for listing reports
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportListParams {
    /// uploaded, processing, completed or failed
    pub status: Option<String>,
    pub report_type: Option<String>,
    pub page: Option<usize>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<usize>,
}

impl TryFrom<ReportListParams> for ReportFilter {
    type Error = String;

    fn try_from(params: ReportListParams) -> Result<Self, Self::Error> {
        Ok(ReportFilter {
            status: params
                .status
                .map(|s| ReportStatus::parse(&s).ok_or_else(|| format!("Unknown report status: {}", s)))
                .transpose()?,
            report_type: params
                .report_type
                .map(|t| ReportType::parse(&t).ok_or_else(|| format!("Unknown report type: {}", t)))
                .transpose()?,
            page: params.page,
            limit: params.limit,
        })
    }
}

/// Structured output of the extraction service for one report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    /// Parameter groups (bloodTest, lipidProfile, ...) and an optional confidence
    #[schema(value_type = Object)]
    pub extraction: serde_json::Value,
    pub processing_time_ms: Option<u64>,
}

/// Reason a report could not be processed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FailureRequest {
    pub message: String,
}
