//! Startup sequence for the catalog

use crate::catalog::CatalogRepository;
use crate::error::StoreResult;
use crate::migration::{MigrationOutcome, MigrationRunner};
use crate::seed::{ensure_essentials, seed_if_empty};

/// What happened while preparing the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub migration: MigrationOutcome,
    pub seeded: bool,
    pub backfilled: Vec<String>,
}

/// Migrates legacy data, seeds an empty catalog, backfills essentials and
/// finally marks the catalog ready
pub fn bootstrap<S: AsRef<str>>(
    catalog: &CatalogRepository,
    required_slugs: &[S],
) -> StoreResult<BootstrapReport> {
    let migration = MigrationRunner::new(catalog).run_once()?;
    let seeded = seed_if_empty(catalog)?;
    let backfilled = ensure_essentials(catalog, required_slugs)?
        .into_iter()
        .map(|p| p.slug)
        .collect();

    catalog.mark_ready();
    tracing::info!(?migration, seeded, "Catalog ready");

    Ok(BootstrapReport {
        migration,
        seeded,
        backfilled,
    })
}
