//! Bulk ingestion from a third-party creature source
//!
//! # Overview
//!
//! The catalog is seeded from a remote, read-only listing. The source is
//! unreliable, so every call is fallible and bounded by a timeout.
//!
//! # Pipeline
//!
//! 1. **Listing**: fetch one page of summaries (`page_size`, default 30)
//! 2. **Detail**: fetch each summary's detail record, one at a time
//! 3. **Mapping**: build a creature from the summary name and detail
//! 4. **Persist**: insert immediately, so earlier items survive a later failure
//!
//! The first failure aborts the page. Nothing is rolled back.

mod pipeline;
mod pokeapi;

pub use pipeline::{map_detail, run_pipeline, IngestReport};
pub use pokeapi::PokeApiSource;

use async_trait::async_trait;
use thiserror::Error;

/// One entry of the source listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureSummary {
    pub name: String,
    /// Where to fetch the detail record
    pub detail_url: String,
}

impl CreatureSummary {
    pub fn new(name: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail_url: detail_url.into(),
        }
    }
}

/// Fields the catalog takes from a detail record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureDetail {
    /// Type names in source order
    pub types: Vec<String>,
    /// Primary sprite, when the source has one
    pub image_url: Option<String>,
}

/// Errors raised by an ingestion source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Remote listing plus per-creature detail fetch
#[async_trait]
pub trait IngestionSource: Send + Sync {
    /// First `limit` summaries of the listing
    async fn list_summaries(&self, limit: u32) -> Result<Vec<CreatureSummary>, SourceError>;

    /// Detail record behind a summary's `detail_url`
    async fn fetch_detail(&self, detail_url: &str) -> Result<CreatureDetail, SourceError>;
}
