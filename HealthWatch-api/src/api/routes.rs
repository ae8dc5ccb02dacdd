use axum::{
    extract::FromRef,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use health_watch_domain::config::EngineConfig;
use health_watch_domain::health::HealthService;
use health_watch_domain::services::{
    create_default_alert_service, create_default_reading_service, create_default_report_service,
};

use crate::api::handlers::{
    alerts, health, readings, reports, SharedAlertService, SharedHealthService, SharedReadingService,
    SharedReportService,
};
use crate::openapi::configure_swagger_routes;

/// Services shared by every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub readings: SharedReadingService,
    pub alerts: SharedAlertService,
    pub reports: SharedReportService,
    pub health: SharedHealthService,
}

impl AppState {
    /// Build the state from the default repositories of the data layer
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            readings: Arc::new(create_default_reading_service(config)),
            alerts: Arc::new(create_default_alert_service(config)),
            reports: Arc::new(create_default_report_service(config)),
            health: Arc::new(HealthService),
        }
    }
}

/// Create the application router
pub async fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Static segments are registered next to the parametrized ones they shadow
    let patient_routes = Router::new()
        .route("/readings", get(readings::list_readings).post(readings::submit_reading))
        .route("/readings/latest", get(readings::get_latest_reading))
        .route("/readings/trends", get(readings::get_trends))
        .route("/readings/:id", delete(readings::delete_reading))
        .route("/alerts", get(alerts::list_alerts).post(alerts::create_manual_alert))
        .route("/alerts/read-all", put(alerts::mark_all_read))
        .route("/alerts/pending", get(alerts::patient_pending_notifications))
        .route("/reports", get(reports::list_reports).post(reports::register_report))
        .route("/reports/stats", get(reports::report_stats))
        .route("/reports/:id", delete(reports::delete_report));

    let api_routes = Router::new()
        .nest("/patients/:patient_id", patient_routes)
        .route("/readings/:id", get(readings::get_reading))
        .route("/alerts/pending", get(alerts::pending_notifications))
        .route("/alerts/:id", get(alerts::get_alert).delete(alerts::delete_alert))
        .route("/alerts/:id/read", put(alerts::mark_read))
        .route("/alerts/:id/acknowledge", put(alerts::acknowledge))
        .route("/alerts/:id/notification-sent", put(alerts::mark_notification_sent))
        .route("/alerts/:id/family-notified", put(alerts::mark_family_notified))
        .route("/reports/:id", get(reports::get_report))
        .route("/reports/:id/processing", post(reports::mark_processing))
        .route("/reports/:id/extraction", post(reports::apply_extraction))
        .route("/reports/:id/failed", put(reports::mark_failed));

    debug!("API routes configured");

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state);

    // Initialize health check service startup time
    health::initialize_server_start_time();

    add_swagger_ui(app)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
