use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use health_watch_data::repository::RepositoryError;

/// Errors raised by the classification engine before any classification runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A numeric field lies outside its plausible physiological bound
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required vitals field is missing
    #[error("Incomplete input: {0}")]
    IncompleteInput(String),
}

/// Errors returned by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Map repository errors to service errors
pub(crate) fn map_repo_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
        RepositoryError::Validation(msg) => ServiceError::Engine(EngineError::Validation(msg)),
        _ => ServiceError::Repository(err.to_string()),
    }
}

/// Flatten nested validator errors into sorted `path: message` fragments joined by `; `.
///
/// Paths use the camelCase wire names so they match incomplete-input messages.
pub fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut fragments = Vec::new();
    collect_validation_errors(errors, "", &mut fragments);
    fragments.sort();
    fragments.join("; ")
}

fn collect_validation_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let field = wire_name(field);
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", path),
                    })
                    .collect();
                out.push(format!("{}: {}", path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_errors(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

/// `sleep_hours` -> `sleepHours`
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !name.is_empty();
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_watch_data::database::DatabaseError;

    #[test]
    fn test_map_repo_error() {
        let not_found = map_repo_error(RepositoryError::NotFound("abc".to_string()));
        assert!(matches!(not_found, ServiceError::NotFound(id) if id == "abc"));

        let invalid = map_repo_error(RepositoryError::Validation("bad".to_string()));
        assert!(matches!(invalid, ServiceError::Engine(EngineError::Validation(_))));

        let db = map_repo_error(RepositoryError::Database(DatabaseError::PoolNotInitialized));
        assert!(matches!(db, ServiceError::Repository(msg) if msg.contains("not initialized")));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(wire_name("sleep_hours"), "sleepHours");
        assert_eq!(wire_name("heart_rate"), "heartRate");
        assert_eq!(wire_name("bp"), "bp");
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err: ServiceError = EngineError::IncompleteInput("heartRate".to_string()).into();
        assert_eq!(err.to_string(), "Incomplete input: heartRate");
    }
}
