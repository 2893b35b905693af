//! Storage layer
//!
//! The record store is the catalog's source of truth. The coordinator only
//! talks to it through [`RecordStore`], so tests and alternative engines can
//! be swapped in without touching the cache or ingestion logic.

mod sqlite;

pub use sqlite::{SqliteStore, StoreConfig};

use crate::catalog::{Creature, NewCreature};
use crate::Result;
use async_trait::async_trait;

/// Ordered collection of creature records keyed by a generated id
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record; the store assigns the id
    async fn insert(&self, creature: NewCreature) -> Result<Creature>;

    /// Look up a record by id
    async fn find_by_id(&self, id: i64) -> Result<Option<Creature>>;

    /// All records, ascending by id
    async fn scan_all(&self) -> Result<Vec<Creature>>;

    /// Overwrite an existing record; returns false if the id is gone
    async fn update(&self, creature: &Creature) -> Result<bool>;

    /// Remove a record; returns false if the id was absent
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Number of stored records
    async fn count(&self) -> Result<u64>;

    /// Remove every record. Ids keep counting up afterwards.
    async fn clear_all(&self) -> Result<()>;
}
