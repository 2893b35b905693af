//! Creature Catalog - cached CRUD catalog seeded from PokeAPI
//!
//! A small service that keeps a catalog of creatures in a record store,
//! fronts the full-collection read with a shared cache, and seeds itself
//! from a third-party source on first start.
//!
//! # Architecture
//!
//! - **catalog**: Records, validation, and the coordinator tying the layers together
//! - **storage**: Record store (SQLite)
//! - **cache**: Cache clients (in-memory, SQLite, Redis)
//! - **ingest**: Ingestion source adapter (PokeAPI) and the seeding pipeline
//! - **config**: YAML configuration with environment overrides
//! - **server**: HTTP surface (axum)

// Core modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;

// Adapters
pub mod cache;
pub mod ingest;
pub mod logging;
pub mod server;

// Re-exports
pub use error::{CatalogError, IngestStep, Result};
