//! Configuration system
//!
//! Loads ~/.config/creature-catalog/config.yaml with support for:
//! - HTTP listener address
//! - Record store location
//! - Cache backend selection (memory, sqlite, redis)
//! - Ingestion source URL, page size and timeouts
//!
//! Deployment environment variables override file values.

mod catalog_config;
pub mod validation;

pub use catalog_config::{
    CacheBackendKind, CacheSettings, CatalogConfig, IngestSettings, ServerSettings,
    StorageSettings,
};
pub use validation::{validate_config, validate_config_result};
