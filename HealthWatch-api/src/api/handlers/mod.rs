pub mod alerts;
pub mod health;
pub mod readings;
pub mod reports;

use std::sync::Arc;

use health_watch_domain::health::HealthServiceTrait;
use health_watch_domain::services::{AlertServiceTrait, ReadingServiceTrait, ReportServiceTrait};

/// Service types for dependency injection
pub type SharedReadingService = Arc<dyn ReadingServiceTrait + Send + Sync>;
pub type SharedAlertService = Arc<dyn AlertServiceTrait + Send + Sync>;
pub type SharedReportService = Arc<dyn ReportServiceTrait + Send + Sync>;
pub type SharedHealthService = Arc<dyn HealthServiceTrait + Send + Sync>;

pub use health::health_check;
