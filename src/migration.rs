//! One-shot merge of the legacy `platforms` key into `social_platforms`
//!
//! Safe to run on every startup: once the legacy key is gone, a run does
//! nothing. On slug collisions the canonical record wins, and canonical
//! records are never rewritten or removed, including ones that do not
//! parse.

use serde_json::Value;

use crate::catalog::CatalogRepository;
use crate::database::{read_json, KEY_LEGACY_PLATFORMS};
use crate::error::{StoreError, StoreResult};
use crate::model::{Platform, RawPlatform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Legacy key absent or empty
    NothingToDo,
    /// Legacy records merged and the legacy key deleted
    ///
    /// `legacy` readable legacy records, `added` of them appended,
    /// `total` records stored under the canonical key afterwards.
    Merged {
        legacy: usize,
        added: usize,
        total: usize,
    },
    /// Legacy value unreadable; left in place for the next run
    Aborted,
}

pub struct MigrationRunner<'a> {
    catalog: &'a CatalogRepository,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(catalog: &'a CatalogRepository) -> Self {
        Self { catalog }
    }

    /// Runs the migration once
    ///
    /// 1. Reads the legacy key; absent or empty means there is nothing to do
    /// 2. Parses legacy records, skipping ones without a usable slug
    /// 3. Appends those whose slug is not yet stored under the canonical key
    /// 4. Deletes the legacy key
    ///
    /// # Returns
    ///
    /// * `Ok(MigrationOutcome::Merged { .. })` - legacy data merged
    /// * `Ok(MigrationOutcome::NothingToDo)` - no legacy data
    /// * `Ok(MigrationOutcome::Aborted)` - legacy value is not JSON; kept for a retry
    /// * `Err(StoreError)` - the store itself failed
    pub fn run_once(&self) -> StoreResult<MigrationOutcome> {
        let legacy = match read_json::<Vec<Value>>(self.catalog.store(), KEY_LEGACY_PLATFORMS) {
            Ok(Some(list)) if !list.is_empty() => list,
            Ok(_) => return Ok(MigrationOutcome::NothingToDo),
            Err(StoreError::Corrupt { key, source }) => {
                tracing::warn!(%key, error = %source, "Legacy platforms unreadable, migration aborted");
                return Ok(MigrationOutcome::Aborted);
            }
            Err(err) => return Err(err),
        };

        let legacy: Vec<Platform> = legacy
            .into_iter()
            .filter_map(|value| {
                serde_json::from_value::<RawPlatform>(value)
                    .ok()
                    .and_then(RawPlatform::into_platform)
            })
            .collect();
        let legacy_count = legacy.len();

        // Stored canonical records are kept verbatim; only new slugs are appended
        let (added, total) = self.catalog.append_new_platforms(legacy)?;
        self.catalog.store().remove(KEY_LEGACY_PLATFORMS)?;

        tracing::info!(legacy = legacy_count, added, total, "Migrated legacy platforms");
        Ok(MigrationOutcome::Merged {
            legacy: legacy_count,
            added,
            total,
        })
    }
}
