// Repository module structure
pub mod errors;
mod alerts;
mod in_memory;
mod readings;
mod reports;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use alerts::{AlertRepository, AlertRepositoryTrait};
pub use readings::{ReadingRepository, ReadingRepositoryTrait};
pub use reports::{ReportRepository, ReportRepositoryTrait};
