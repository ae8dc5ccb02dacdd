// Storage models. These mirror the domain entities with plain field types
// (string ids, string enums) so the storage layer has no domain knowledge.
pub mod alert;
pub mod reading;
pub mod report;

pub use alert::{AlertQuery, AlertRecord, AlertSortField};
pub use reading::{NewReadingRecord, ReadingQuery, ReadingRecord, StatusFlagsRecord};
pub use report::{FindingRecord, ReportQuery, ReportRecord};
