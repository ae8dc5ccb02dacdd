// Domain entities and value objects
pub mod alert;
pub mod conversions;
pub mod reading;
pub mod report;

// Re-export common types for easier imports
pub use alert::{Alert, AlertState, AlertType, ManualAlert};
pub use reading::{AbnormalityStatus, BloodPressure, Reading, ReadingSubmission, StatusFlags, Vitals};
pub use report::{FileType, NewReport, Report, ReportData, ReportFinding, ReportStatus, ReportType};
