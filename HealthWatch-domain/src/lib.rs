// HealthWatch Domain
// Classification and alerting engine plus the services that persist its output

// Rule sets, classifiers, trends and alert policy
pub mod engine;

// Engine and retention settings
pub mod config;

// Services that orchestrate classification and persistence
pub mod services;

// Domain entities
pub mod entities;

pub mod errors;

// Health checks and system status
pub mod health;

// Re-export the database module from health_watch_data for convenience
pub use health_watch_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
