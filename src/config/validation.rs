//! Configuration validation
//!
//! Validates catalog configuration for correctness:
//! - Listener port is non-zero
//! - Ingestion base URL parses and page size is sane
//! - Timeouts are non-zero

use super::catalog_config::{CacheBackendKind, CatalogConfig};
use crate::catalog::ValidationError;
use crate::CatalogError;
use url::Url;

/// Largest page the source accepts in one listing call
const MAX_PAGE_SIZE: u32 = 1000;

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a catalog configuration
pub fn validate_config(config: &CatalogConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::new(
            "server.port",
            "Port must be greater than 0",
        ));
    }

    if let Err(e) = Url::parse(&config.ingest.base_url) {
        errors.push(ValidationError::new(
            "ingest.base_url",
            format!("Invalid URL '{}': {}", config.ingest.base_url, e),
        ));
    }

    if config.ingest.page_size == 0 || config.ingest.page_size > MAX_PAGE_SIZE {
        errors.push(ValidationError::new(
            "ingest.page_size",
            format!("Must be between 1 and {}", MAX_PAGE_SIZE),
        ));
    }

    if config.ingest.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "ingest.timeout_secs",
            "Timeout must be greater than 0",
        ));
    }

    if config.cache.backend == CacheBackendKind::Redis {
        if !config.cache.redis_url.starts_with("redis://")
            && !config.cache.redis_url.starts_with("rediss://")
        {
            errors.push(ValidationError::new(
                "cache.redis_url",
                "Must start with redis:// or rediss://",
            ));
        }
        if config.cache.timeout_ms == 0 {
            errors.push(ValidationError::new(
                "cache.timeout_ms",
                "Timeout must be greater than 0",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate and convert the error list into a single config error
pub fn validate_config_result(config: &CatalogConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        CatalogError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
