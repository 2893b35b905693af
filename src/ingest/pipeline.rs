//! Sequential ingestion pipeline

use super::{CreatureDetail, CreatureSummary, IngestionSource};
use crate::catalog::NewCreature;
use crate::error::IngestStep;
use crate::storage::RecordStore;
use crate::{CatalogError, Result};
use tracing::{info, warn};

/// Outcome of a fully ingested page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Summaries returned by the listing
    pub listed: usize,
    /// Creatures inserted into the store
    pub persisted: usize,
}

/// Build a creature from a summary and its detail record
pub fn map_detail(
    summary: &CreatureSummary,
    detail: CreatureDetail,
) -> std::result::Result<NewCreature, String> {
    let image_url = detail
        .image_url
        .ok_or_else(|| format!("{} has no sprite image", summary.name))?;

    Ok(NewCreature {
        name: summary.name.clone(),
        types: detail.types,
        image_url,
    })
}

/// Fetch one page from `source` and persist every creature into `store`.
///
/// Details are fetched one at a time. Each creature is inserted as soon as it
/// is mapped, so on failure everything before the failing item stays stored
/// and the error carries that count.
pub async fn run_pipeline(
    source: &dyn IngestionSource,
    store: &dyn RecordStore,
    page_size: u32,
) -> Result<IngestReport> {
    let summaries = source.list_summaries(page_size).await.map_err(|e| {
        warn!(error = %e, "Listing fetch failed");
        CatalogError::ingestion(IngestStep::Listing, 0, e.to_string())
    })?;

    let mut report = IngestReport {
        listed: summaries.len(),
        persisted: 0,
    };

    for summary in &summaries {
        let detail = source
            .fetch_detail(&summary.detail_url)
            .await
            .map_err(|e| {
                warn!(
                    name = %summary.name,
                    persisted = report.persisted,
                    error = %e,
                    "Detail fetch failed, aborting ingestion"
                );
                CatalogError::ingestion(IngestStep::Detail, report.persisted, e.to_string())
            })?;

        let creature = map_detail(summary, detail).map_err(|msg| {
            warn!(name = %summary.name, "Detail record could not be mapped");
            CatalogError::ingestion(IngestStep::Mapping, report.persisted, msg)
        })?;

        let saved = store.insert(creature).await?;
        report.persisted += 1;
        info!(id = saved.id, name = %saved.name, "Added creature");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::SourceError;
    use crate::storage::SqliteStore;
    use async_trait::async_trait;

    /// Source with a fixed listing; details past `fail_after` error out
    struct FakeSource {
        names: Vec<&'static str>,
        fail_listing: bool,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl IngestionSource for FakeSource {
        async fn list_summaries(
            &self,
            limit: u32,
        ) -> std::result::Result<Vec<CreatureSummary>, SourceError> {
            if self.fail_listing {
                return Err(SourceError::Timeout);
            }
            Ok(self
                .names
                .iter()
                .enumerate()
                .take(limit as usize)
                .map(|(i, n)| CreatureSummary::new(*n, i.to_string()))
                .collect())
        }

        async fn fetch_detail(
            &self,
            detail_url: &str,
        ) -> std::result::Result<CreatureDetail, SourceError> {
            let index: usize = detail_url.parse().unwrap();
            if self.fail_after.is_some_and(|n| index >= n) {
                return Err(SourceError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(CreatureDetail {
                types: vec!["water".to_string(), "ice".to_string()],
                image_url: Some(format!("https://img.example/{}.png", index)),
            })
        }
    }

    #[tokio::test]
    async fn test_persists_whole_page_in_order() {
        let store = SqliteStore::in_memory().unwrap();
        let source = FakeSource {
            names: vec!["squirtle", "wartortle", "blastoise"],
            fail_listing: false,
            fail_after: None,
        };

        let report = run_pipeline(&source, &store, 30).await.unwrap();

        assert_eq!(report, IngestReport { listed: 3, persisted: 3 });
        let stored = store.scan_all().await.unwrap();
        assert_eq!(stored[0].name, "squirtle");
        assert_eq!(stored[2].name, "blastoise");
        assert_eq!(stored[1].types, vec!["water", "ice"]);
    }

    #[tokio::test]
    async fn test_page_size_limits_listing() {
        let store = SqliteStore::in_memory().unwrap();
        let source = FakeSource {
            names: vec!["a", "b", "c", "d"],
            fail_listing: false,
            fail_after: None,
        };

        let report = run_pipeline(&source, &store, 2).await.unwrap();
        assert_eq!(report.persisted, 2);
    }

    #[tokio::test]
    async fn test_detail_failure_keeps_earlier_items() {
        let store = SqliteStore::in_memory().unwrap();
        let source = FakeSource {
            names: vec!["a", "b", "c", "d", "e"],
            fail_listing: false,
            fail_after: Some(2),
        };

        let err = run_pipeline(&source, &store, 30).await.unwrap_err();

        match err {
            CatalogError::UpstreamIngestion {
                step, persisted, ..
            } => {
                assert_eq!(step, IngestStep::Detail);
                assert_eq!(persisted, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_listing_failure_persists_nothing() {
        let store = SqliteStore::in_memory().unwrap();
        let source = FakeSource {
            names: vec!["a"],
            fail_listing: true,
            fail_after: None,
        };

        let err = run_pipeline(&source, &store, 30).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UpstreamIngestion {
                step: IngestStep::Listing,
                persisted: 0,
                ..
            }
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn test_map_detail_requires_sprite() {
        let summary = CreatureSummary::new("missingno", "x");
        let detail = CreatureDetail {
            types: vec!["bird".to_string()],
            image_url: None,
        };
        assert_eq!(
            map_detail(&summary, detail).unwrap_err(),
            "missingno has no sprite image"
        );
    }
}
