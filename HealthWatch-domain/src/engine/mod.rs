//! Classification and alerting engine.
//!
//! Everything here is a pure computation over already-fetched data: no I/O,
//! no shared mutable state, safe to call concurrently on independent inputs.
//! Persistence and locking belong to the services layer and its callers.

pub mod alerts;
pub mod report;
pub mod rules;
pub mod severity;
pub mod trends;
pub mod vitals;
pub mod wellness;

pub use alerts::AlertFactory;
pub use severity::{AlertSeverity, FindingSeverity, Severity, VitalLevel};
pub use trends::{TrendDirection, TrendSummary};
