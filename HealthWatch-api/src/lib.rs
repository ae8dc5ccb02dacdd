// HealthWatch-api lib.rs
//
// HTTP surface over the HealthWatch domain services.

pub mod api;
pub mod entities;
pub mod openapi;
