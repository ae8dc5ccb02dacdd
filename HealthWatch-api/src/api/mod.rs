pub mod error;
pub mod handlers;
pub mod routes;

use axum::Router;
use health_watch_domain::config::EngineConfig;

pub use error::ApiError;
pub use routes::AppState;

/// Create the application router backed by the default services
pub async fn create_application(config: &EngineConfig) -> Router {
    routes::create_app(AppState::from_config(config)).await
}
