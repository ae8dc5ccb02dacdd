// Public entities for the HealthWatch API
// Request bodies and query parameters that only exist at the HTTP boundary.
// Domain entities are serialized directly.

// Error and bulk-operation responses
pub mod common;

// Query parameters and request bodies
pub mod requests;
