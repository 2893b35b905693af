//! Error types for the creature catalog
//!
//! One enum covers every failure mode the coordinator can surface. NotFound
//! and ingestion failures stay distinct so the HTTP layer can map them to
//! their own status codes; storage failures collapse into a generic 500.

use crate::catalog::ValidationError;
use std::fmt;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Which stage of the ingestion pipeline failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStep {
    /// Fetching the page of summaries
    Listing,
    /// Fetching a single creature's detail record
    Detail,
    /// Turning a detail record into a creature
    Mapping,
}

impl fmt::Display for IngestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestStep::Listing => "listing",
            IngestStep::Detail => "detail",
            IngestStep::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// Error type for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Requested creature id is absent
    #[error("Pokemon with ID {0} not found")]
    NotFound(i64),

    /// Talking to the ingestion source failed
    #[error("Ingestion failed at {step} step after {persisted} creature(s) persisted: {message}")]
    UpstreamIngestion {
        step: IngestStep,
        persisted: usize,
        message: String,
    },

    /// Record store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cache client failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Input rejected at the mutation boundary
    #[error("Validation failed: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors outside of ingestion
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CatalogError {
    /// Build an ingestion failure for `step` with the count persisted so far
    pub fn ingestion(step: IngestStep, persisted: usize, message: impl Into<String>) -> Self {
        CatalogError::UpstreamIngestion {
            step,
            persisted,
            message: message.into(),
        }
    }

    /// True for failures a caller should render as "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

impl From<redis::RedisError> for CatalogError {
    fn from(e: redis::RedisError) -> Self {
        CatalogError::Cache(e.to_string())
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::NotFound(42);
        assert_eq!(err.to_string(), "Pokemon with ID 42 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ingestion_message_names_step() {
        let err = CatalogError::ingestion(IngestStep::Detail, 10, "connection reset");
        let msg = err.to_string();
        assert!(msg.contains("detail"));
        assert!(msg.contains("10"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_validation_message_joins_fields() {
        let err = CatalogError::Validation(vec![
            ValidationError::new("name", "must not be empty"),
            ValidationError::new("imageUrl", "must be a valid URL"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: name: must not be empty; imageUrl: must be a valid URL"
        );
    }
}
