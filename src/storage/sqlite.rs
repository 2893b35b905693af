//! SQLite record store

use super::RecordStore;
use crate::catalog::{Creature, NewCreature};
use crate::{CatalogError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Record store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to SQLite database file
    pub path: PathBuf,

    /// Enable WAL mode for better concurrency
    pub wal_mode: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("creature-catalog");
        path.push("catalog.db");

        Self {
            path,
            wal_mode: true,
        }
    }
}

/// SQLite-backed [`RecordStore`]
///
/// `AUTOINCREMENT` keeps ids monotonic across deletes and `clear_all`, so an
/// id is never handed out twice for the lifetime of the database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create a store database
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %config.path.display(), "Opening record store");

        let conn = Connection::open(&config.path)?;

        if config.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        let store = Self {
            conn: Mutex::new(conn),
            path: Some(config.path.clone()),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Open a private in-memory store
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Database file path, if the store is on disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        self.lock()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS creatures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                types TEXT NOT NULL,
                image_url TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CatalogError::Storage(format!("Lock poisoned: {}", e)))
    }
}

fn encode_types(types: &[String]) -> Result<String> {
    Ok(serde_json::to_string(types)?)
}

fn row_to_creature(row: &Row<'_>) -> rusqlite::Result<Creature> {
    let types_json: String = row.get(2)?;
    let types = serde_json::from_str(&types_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Creature {
        id: row.get(0)?,
        name: row.get(1)?,
        types,
        image_url: row.get(3)?,
    })
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, creature: NewCreature) -> Result<Creature> {
        let types = encode_types(&creature.types)?;
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO creatures (name, types, image_url) VALUES (?, ?, ?)",
            params![&creature.name, types, &creature.image_url],
        )?;
        let id = conn.last_insert_rowid();

        tracing::debug!(id, name = %creature.name, "Inserted creature");
        Ok(creature.with_id(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Creature>> {
        let conn = self.lock()?;
        let creature = conn
            .query_row(
                "SELECT id, name, types, image_url FROM creatures WHERE id = ?",
                params![id],
                row_to_creature,
            )
            .optional()?;
        Ok(creature)
    }

    async fn scan_all(&self) -> Result<Vec<Creature>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, name, types, image_url FROM creatures ORDER BY id ASC")?;
        let creatures = stmt
            .query_map([], row_to_creature)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(creatures)
    }

    async fn update(&self, creature: &Creature) -> Result<bool> {
        let types = encode_types(&creature.types)?;
        let changed = self.lock()?.execute(
            "UPDATE creatures SET name = ?, types = ?, image_url = ? WHERE id = ?",
            params![&creature.name, types, &creature.image_url, creature.id],
        )?;
        Ok(changed > 0)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let changed = self
            .lock()?
            .execute("DELETE FROM creatures WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM creatures", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    async fn clear_all(&self) -> Result<()> {
        tracing::info!("Clearing record store");
        self.lock()?.execute("DELETE FROM creatures", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bulbasaur() -> NewCreature {
        NewCreature::new(
            "bulbasaur",
            ["grass", "poison"],
            "https://img.example/1.png",
        )
    }

    #[tokio::test]
    async fn test_store_creation_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            path: temp_dir.path().join("nested").join("catalog.db"),
            ..Default::default()
        };

        let store = SqliteStore::open(&config).unwrap();
        assert!(store.path().unwrap().exists());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_preserves_type_order() {
        let store = SqliteStore::in_memory().unwrap();

        let first = store.insert(bulbasaur()).await.unwrap();
        let second = store
            .insert(NewCreature::new("ivysaur", ["grass", "poison"], "https://img.example/2.png"))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let loaded = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(loaded.types, vec!["grass", "poison"]);
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_is_ordered_by_id() {
        let store = SqliteStore::in_memory().unwrap();
        for name in ["c", "a", "b"] {
            store
                .insert(NewCreature::new(name, ["normal"], "https://img.example/x.png"))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .scan_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        assert_eq!(
            names,
            vec![(1, "c".to_string()), (2, "a".to_string()), (3, "b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_ids() {
        let store = SqliteStore::in_memory().unwrap();
        let mut creature = store.insert(bulbasaur()).await.unwrap();

        creature.name = "venusaur".to_string();
        assert!(store.update(&creature).await.unwrap());
        assert_eq!(store.find_by_id(creature.id).await.unwrap().unwrap().name, "venusaur");

        assert!(store.delete_by_id(creature.id).await.unwrap());
        assert!(!store.delete_by_id(creature.id).await.unwrap());
        assert!(!store.update(&creature).await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_clear() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(bulbasaur()).await.unwrap();
        store.insert(bulbasaur()).await.unwrap();

        store.clear_all().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let next = store.insert(bulbasaur()).await.unwrap();
        assert_eq!(next.id, 3);
    }
}
