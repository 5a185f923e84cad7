//! Error types for pattern resolution
//!
//! Structural failures, validation failures and catalog loading problems are
//! kept apart so a batch caller can report each document on its own terms.
//! Missing sizing or cost data is not an error and never shows up here.

use thiserror::Error;

/// Main error type for resolution operations
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Input could not be parsed into a request document
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// One or more validation rules were violated
    #[error("Invalid request: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// A pattern definition or sizing table could not be loaded
    #[error("Catalog error: {message}")]
    Catalog { message: String },
}

impl ResolveError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema { message: message.into() }
    }

    /// Create a validation error from the validator's full error list
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog { message: message.into() }
    }

    /// Error strings to report for a single document
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Result type for resolution operations
pub type ResolveResult<T> = Result<T, ResolveError>;

impl From<serde_yaml::Error> for ResolveError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Schema { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolveError::schema("expected a mapping");
        assert_eq!(err.to_string(), "Schema error: expected a mapping");

        let err = ResolveError::validation(vec![
            "Missing required field: pattern".to_string(),
            "Invalid environment: qa. Must be dev, staging, or prod".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid request: Missing required field: pattern; Invalid environment: qa. Must be dev, staging, or prod"
        );
    }

    #[test]
    fn test_messages_keep_every_violation() {
        let err = ResolveError::validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.messages(), vec!["a", "b"]);

        let err = ResolveError::catalog("bad file");
        assert_eq!(err.messages(), vec!["Catalog error: bad file"]);
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("key: [unclosed").unwrap_err();
        let err: ResolveError = yaml_err.into();
        assert!(matches!(err, ResolveError::Schema { .. }));
    }
}
