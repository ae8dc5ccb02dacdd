// Domain services
// Orchestrate validation, classification, alert creation and persistence.
// Callers must keep at most one classification pass in flight per reading or
// report; the services do not lock.

pub mod alerts;
pub mod readings;
pub mod reports;

use serde::Serialize;
use uuid::Uuid;

use crate::entities::conversions::parse_string_to_uuid;
use crate::errors::{EngineError, ServiceError};

// Re-export service traits and factory functions
pub use alerts::{create_default_alert_service, AlertService, AlertServiceTrait};
pub use readings::{create_default_reading_service, ReadingService, ReadingServiceTrait};
pub use reports::{create_default_report_service, ReportService, ReportServiceTrait};

/// Largest page size any listing accepts
pub const MAX_PAGE_SIZE: usize = 100;

/// Paging metadata returned with every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct Pagination {
    pub total: usize,
    /// 1-based page number
    pub page: usize,
    pub limit: usize,
    pub pages: usize,
}

impl Pagination {
    /// Normalize a requested page and limit: page starts at 1, limit is 1..=100
    pub(crate) fn request(page: Option<usize>, limit: Option<usize>, default_limit: usize) -> (usize, usize) {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }

    /// Rows to skip; a page past the end saturates instead of overflowing
    pub(crate) fn offset(page: usize, limit: usize) -> usize {
        page.saturating_sub(1).saturating_mul(limit)
    }

    pub(crate) fn new(total: usize, page: usize, limit: usize) -> Self {
        Self {
            total,
            page,
            limit,
            pages: total.div_ceil(limit),
        }
    }
}

/// Parse an id supplied by a caller
pub(crate) fn parse_id(id: &str) -> Result<Uuid, ServiceError> {
    parse_string_to_uuid(id).map_err(|msg| ServiceError::Engine(EngineError::Validation(msg)))
}

/// A stored record that no longer converts into an entity
pub(crate) fn corrupt_record(msg: String) -> ServiceError {
    ServiceError::Repository(format!("Corrupt record: {}", msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_request_is_normalized() {
        assert_eq!(Pagination::request(None, None, 30), (1, 30));
        assert_eq!(Pagination::request(Some(0), Some(500), 30), (1, MAX_PAGE_SIZE));
        assert_eq!(Pagination::request(Some(3), Some(0), 30), (3, 1));
        assert_eq!(Pagination::offset(3, 10), 20);
    }

    #[test]
    fn test_offset_saturates() {
        assert_eq!(Pagination::offset(usize::MAX, MAX_PAGE_SIZE), usize::MAX);
        assert_eq!(Pagination::offset(0, 10), 0);
    }

    #[test]
    fn test_pages_round_up() {
        assert_eq!(Pagination::new(0, 1, 10).pages, 0);
        assert_eq!(Pagination::new(21, 1, 10).pages, 3);
        assert_eq!(Pagination::new(20, 2, 10).pages, 2);
    }

    #[test]
    fn test_parse_id_is_validation_error() {
        assert!(matches!(
            parse_id("abc"),
            Err(ServiceError::Engine(EngineError::Validation(msg))) if msg == "Invalid UUID format: abc"
        ));
    }
}
