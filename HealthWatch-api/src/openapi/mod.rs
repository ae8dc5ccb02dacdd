use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Reading endpoints
        crate::api::handlers::readings::submit_reading,
        crate::api::handlers::readings::list_readings,
        crate::api::handlers::readings::get_latest_reading,
        crate::api::handlers::readings::get_trends,
        crate::api::handlers::readings::get_reading,
        crate::api::handlers::readings::delete_reading,

        // Alert endpoints
        crate::api::handlers::alerts::list_alerts,
        crate::api::handlers::alerts::create_manual_alert,
        crate::api::handlers::alerts::mark_all_read,
        crate::api::handlers::alerts::patient_pending_notifications,
        crate::api::handlers::alerts::pending_notifications,
        crate::api::handlers::alerts::get_alert,
        crate::api::handlers::alerts::mark_read,
        crate::api::handlers::alerts::acknowledge,
        crate::api::handlers::alerts::mark_notification_sent,
        crate::api::handlers::alerts::mark_family_notified,
        crate::api::handlers::alerts::delete_alert,

        // Report endpoints
        crate::api::handlers::reports::register_report,
        crate::api::handlers::reports::list_reports,
        crate::api::handlers::reports::report_stats,
        crate::api::handlers::reports::get_report,
        crate::api::handlers::reports::mark_processing,
        crate::api::handlers::reports::apply_extraction,
        crate::api::handlers::reports::mark_failed,
        crate::api::handlers::reports::delete_report
    ),
    components(
        schemas(
            // API entities
            crate::entities::common::ErrorResponse,
            crate::entities::common::CountResponse,
            crate::entities::requests::ExtractionRequest,
            crate::entities::requests::FailureRequest,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,

            // Readings
            health_watch_domain::entities::reading::Reading,
            health_watch_domain::entities::reading::ReadingSubmission,
            health_watch_domain::entities::reading::BloodPressureInput,
            health_watch_domain::entities::reading::BloodPressure,
            health_watch_domain::entities::reading::StatusFlags,
            health_watch_domain::entities::reading::AbnormalityStatus,
            health_watch_domain::engine::severity::VitalLevel,
            health_watch_domain::engine::trends::TrendSummary,
            health_watch_domain::engine::trends::TrendDirection,
            health_watch_domain::engine::trends::Averages,
            health_watch_domain::engine::trends::Trends,
            health_watch_domain::engine::trends::LevelCounts,
            health_watch_domain::services::Pagination,
            health_watch_domain::services::readings::ReadingOutcome,
            health_watch_domain::services::readings::ReadingPage,

            // Alerts
            health_watch_domain::entities::alert::Alert,
            health_watch_domain::entities::alert::AlertType,
            health_watch_domain::entities::alert::ManualAlert,
            health_watch_domain::engine::severity::AlertSeverity,
            health_watch_domain::services::alerts::AlertPage,
            health_watch_domain::services::alerts::AlertSummary,
            health_watch_domain::services::alerts::SeverityCounts,

            // Reports
            health_watch_domain::entities::report::Report,
            health_watch_domain::entities::report::NewReport,
            health_watch_domain::entities::report::ReportType,
            health_watch_domain::entities::report::ReportStatus,
            health_watch_domain::entities::report::FileType,
            health_watch_domain::entities::report::ReportData,
            health_watch_domain::entities::report::ReportFinding,
            health_watch_domain::entities::report::BloodTest,
            health_watch_domain::entities::report::LipidProfile,
            health_watch_domain::entities::report::KidneyFunction,
            health_watch_domain::entities::report::LiverFunction,
            health_watch_domain::entities::report::DiabetesMarkers,
            health_watch_domain::entities::report::ThyroidFunction,
            health_watch_domain::entities::report::UrineTest,
            health_watch_domain::entities::report::EcgFindings,
            health_watch_domain::engine::severity::FindingSeverity,
            health_watch_domain::engine::report::SeveritySummary,
            health_watch_domain::services::reports::ReportPage,
            health_watch_domain::services::reports::ExtractionOutcome,
            health_watch_domain::services::reports::ReportStats,
            health_watch_domain::services::reports::StatusCounts
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "readings", description = "Vitals readings, classification and trends"),
        (name = "alerts", description = "Alert listing and lifecycle"),
        (name = "reports", description = "Lab report registration and classification")
    ),
    info(
        title = "HealthWatch API",
        version = "0.1.0",
        description = "Classifies vitals and lab reports into severity levels and manages the resulting alerts",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "HealthWatch API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags are declared");
        for name in ["health", "readings", "alerts", "reports"] {
            assert!(tags.iter().any(|tag| tag.name == name), "missing tag {}", name);
        }

        for path in [
            "/health",
            "/api/v1/patients/{patient_id}/readings",
            "/api/v1/patients/{patient_id}/readings/trends",
            "/api/v1/alerts/{id}/acknowledge",
            "/api/v1/reports/{id}/extraction",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }
}
