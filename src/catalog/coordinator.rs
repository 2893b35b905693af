//! Catalog coordinator
//!
//! Owns every read and write against the catalog and keeps the cached
//! collection consistent with the record store:
//!
//! - `list_all` is cache-aside on a single key holding the whole ordered scan
//! - every mutation writes the store first, then deletes that key
//! - seeding and reinitialize run the ingestion pipeline and invalidate once
//!
//! Cache failures never fail an operation. A failed read is a miss, a failed
//! invalidation is logged and skipped.
//!
//! A reader that misses, scans, and fills the cache can race a writer that
//! invalidates in between; the stale fill lives until the next mutation.

use super::model::{Creature, CreaturePatch, Deleted, NewCreature};
use crate::cache::CacheClient;
use crate::ingest::{run_pipeline, IngestReport, IngestionSource};
use crate::storage::RecordStore;
use crate::{CatalogError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Cache key holding the serialized full collection
pub const ALL_CREATURES_KEY: &str = "all_pokemon";

/// Ingestion knobs the coordinator needs
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Summaries fetched per seed
    pub page_size: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { page_size: 30 }
    }
}

/// What the startup seed check did
#[derive(Debug)]
pub enum SeedOutcome {
    /// Store already had records; nothing fetched
    Skipped { existing: u64 },
    /// Store was empty and the pipeline completed
    Seeded(IngestReport),
    /// Store was empty and the pipeline failed; startup continues
    Failed(CatalogError),
}

/// Acknowledgement for a completed reinitialize
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Reinitialized {
    pub message: String,
    pub ingested: usize,
}

/// Coordinates the record store, the cache, and the ingestion source
pub struct CatalogCoordinator {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheClient>,
    source: Arc<dyn IngestionSource>,
    config: IngestConfig,
    /// Serializes seed and reinitialize so clears and bulk inserts never interleave
    reload_lock: Mutex<()>,
}

impl CatalogCoordinator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn CacheClient>,
        source: Arc<dyn IngestionSource>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            cache,
            source,
            config,
            reload_lock: Mutex::new(()),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Every creature, ascending by id
    pub async fn list_all(&self) -> Result<Vec<Creature>> {
        if let Some(cached) = self.cached_collection().await {
            debug!(count = cached.len(), "Serving creature list from cache");
            return Ok(cached);
        }

        let creatures = self.store.scan_all().await?;

        // Empty results are not cached so a failed seed is retried on every read
        if !creatures.is_empty() {
            let bytes = serde_json::to_vec(&creatures)?;
            if let Err(e) = self.cache.set(ALL_CREATURES_KEY, &bytes).await {
                warn!(error = %e, "Failed to populate creature cache");
            }
        }

        debug!(count = creatures.len(), "Serving creature list from store");
        Ok(creatures)
    }

    async fn cached_collection(&self) -> Option<Vec<Creature>> {
        let bytes = match self.cache.get(ALL_CREATURES_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(creatures) => Some(creatures),
            Err(e) => {
                warn!(error = %e, "Discarding undecodable cached creature list");
                self.invalidate().await;
                None
            }
        }
    }

    /// A single creature. Never served from cache.
    pub async fn get(&self, id: i64) -> Result<Creature> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Persist a new creature. Input is expected to be validated already.
    pub async fn create(&self, input: NewCreature) -> Result<Creature> {
        let saved = self.store.insert(input).await.map_err(|e| {
            error!(error = %e, "Error creating creature");
            e
        })?;
        self.invalidate().await;

        info!(id = saved.id, name = %saved.name, "Created creature");
        Ok(saved)
    }

    /// Apply the fields present in `patch` to an existing creature
    pub async fn update(&self, id: i64, patch: CreaturePatch) -> Result<Creature> {
        let mut creature = self.get(id).await?;
        if patch.is_empty() {
            debug!(id, "Empty patch, nothing to update");
            return Ok(creature);
        }
        patch.apply_to(&mut creature);

        if !self.store.update(&creature).await? {
            // Deleted between the lookup and the write
            return Err(CatalogError::NotFound(id));
        }
        self.invalidate().await;

        info!(id, "Updated creature");
        Ok(creature)
    }

    /// Remove a creature
    pub async fn delete(&self, id: i64) -> Result<Deleted> {
        self.get(id).await?;

        if !self.store.delete_by_id(id).await? {
            return Err(CatalogError::NotFound(id));
        }
        self.invalidate().await;

        info!(id, "Deleted creature");
        Ok(Deleted::new(id))
    }

    // ========================================================================
    // Bulk reload
    // ========================================================================

    /// Seed the catalog if the store is empty.
    ///
    /// Failures are logged and returned as [`SeedOutcome::Failed`] rather than
    /// an error, so process startup continues with whatever was ingested.
    pub async fn seed_if_empty(&self) -> SeedOutcome {
        let _guard = self.reload_lock.lock().await;

        let existing = match self.store.count().await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "Failed to count creatures before seeding");
                return SeedOutcome::Failed(e);
            }
        };

        if existing > 0 {
            debug!(existing, "Catalog already populated, skipping seed");
            return SeedOutcome::Skipped { existing };
        }

        info!(page_size = self.config.page_size, "Initializing catalog with default data");
        match self.ingest().await {
            Ok(report) => SeedOutcome::Seeded(report),
            Err(e) => {
                error!(error = %e, "Failed to initialize catalog data");
                SeedOutcome::Failed(e)
            }
        }
    }

    /// Clear the store and re-run ingestion.
    ///
    /// The clear is not undone on failure: the catalog is left empty or
    /// partially seeded and the ingestion error is returned.
    pub async fn reinitialize(&self) -> Result<Reinitialized> {
        let _guard = self.reload_lock.lock().await;

        self.store.clear_all().await?;
        self.invalidate().await;

        match self.ingest().await {
            Ok(report) => Ok(Reinitialized {
                message: "Pokemon data reinitialized successfully".to_string(),
                ingested: report.persisted,
            }),
            Err(e) => {
                error!(error = %e, "Error reinitializing catalog data");
                Err(e)
            }
        }
    }

    /// Run the pipeline, then invalidate the collection key once.
    ///
    /// The key is invalidated on failure too, so partially ingested records
    /// show up on the next list.
    async fn ingest(&self) -> Result<IngestReport> {
        let result = run_pipeline(
            self.source.as_ref(),
            self.store.as_ref(),
            self.config.page_size,
        )
        .await;
        self.invalidate().await;

        if let Ok(ref report) = result {
            info!(
                listed = report.listed,
                persisted = report.persisted,
                "Successfully initialized catalog"
            );
        }
        result
    }

    async fn invalidate(&self) {
        if let Err(e) = self.cache.delete(ALL_CREATURES_KEY).await {
            warn!(error = %e, key = ALL_CREATURES_KEY, "Cache invalidation failed");
        }
    }
}
