//! Platform and service catalog
//!
//! The catalog owns the `social_platforms` and `social_services` keys.
//! Every mutation rewrites the whole collection; there are no partial
//! updates. One [`CatalogRepository`] is shared by every consumer, and
//! consumers learn about changes through [`CatalogEvent`]s and the
//! readiness flag instead of polling storage.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{broadcast, watch};

use crate::database::{read_list_lenient, write_json, KeyValueStore, KEY_PLATFORMS, KEY_SERVICES};
use crate::dedupe::dedupe;
use crate::error::{StoreError, StoreResult};
use crate::model::{Platform, RawPlatform, RawService, Service, ServiceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// Platform collection changed (added, replaced, toggled or reset)
    PlatformsUpdated { at: DateTime<Utc> },
}

pub struct CatalogRepository {
    store: Arc<dyn KeyValueStore>,
    /// Parsed platform list; must be dropped whenever storage changes underneath
    cache: RwLock<Option<Vec<Platform>>>,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
    events: broadcast::Sender<CatalogEvent>,
    ready: watch::Sender<bool>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        let (ready, _) = watch::channel(false);
        Self {
            store,
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
            events,
            ready,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Signals that bootstrap finished and the catalog can be rendered
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolves once [`mark_ready`](Self::mark_ready) has been called
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Drops the cached platform list after an external mutation
    pub fn invalidate(&self) {
        *self.cache.write().unwrap() = None;
    }

    fn notify(&self) {
        // No subscribers is fine
        let _ = self.events.send(CatalogEvent::PlatformsUpdated { at: Utc::now() });
    }

    /// Parses the stored platform list, dropping unusable and duplicate records
    fn load_platforms(&self) -> StoreResult<Vec<Platform>> {
        let raw = self.load_raw_platforms()?;
        let platforms = coerce_platforms(&raw);

        if platforms.len() != raw.len() {
            tracing::debug!(
                kept = platforms.len(),
                dropped = raw.len() - platforms.len(),
                "Dropped malformed or duplicate platform records"
            );
        }
        Ok(platforms)
    }

    /// Returns the canonical platform list, empty if absent or corrupt
    pub fn get_platforms(&self) -> StoreResult<Vec<Platform>> {
        if let Some(cached) = self.cache.read().unwrap().as_ref() {
            return Ok(cached.clone());
        }

        let platforms = self.load_platforms()?;
        *self.cache.write().unwrap() = Some(platforms.clone());
        Ok(platforms)
    }

    /// Platforms shown on the storefront
    pub fn get_active_platforms(&self) -> StoreResult<Vec<Platform>> {
        let mut platforms = self.get_platforms()?;
        platforms.retain(|p| p.active);
        Ok(platforms)
    }

    pub fn find_platform(&self, slug: &str) -> StoreResult<Option<Platform>> {
        let slug = slug.trim().to_lowercase();
        Ok(self.get_platforms()?.into_iter().find(|p| p.slug == slug))
    }

    /// Stored platform records exactly as written, malformed ones included
    fn load_raw_platforms(&self) -> StoreResult<Vec<Value>> {
        read_list_lenient(self.store(), KEY_PLATFORMS)
    }

    /// Writes `raw` back untouched and drops the parsed cache
    fn write_raw_platforms(&self, raw: &[Value]) -> StoreResult<()> {
        write_json(self.store(), KEY_PLATFORMS, raw)?;
        self.invalidate();
        self.notify();
        Ok(())
    }

    /// Writes `platforms` only when nothing is stored under the canonical key
    ///
    /// Emptiness is judged on the stored records, not on the parsed view:
    /// a list holding only unreadable records is still not empty. A
    /// non-JSON value counts as empty.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - `platforms` was written
    /// * `Ok(false)` - stored records exist, nothing was written
    pub fn replace_if_empty(&self, platforms: Vec<Platform>) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().unwrap();
        if !self.load_raw_platforms()?.is_empty() {
            return Ok(false);
        }

        write_json(self.store(), KEY_PLATFORMS, &platforms)?;
        *self.cache.write().unwrap() = Some(platforms);
        self.notify();
        Ok(true)
    }

    /// Appends `platform` unless its slug (or id) is already present
    ///
    /// Existing stored records, including ones the parsed view skips, are
    /// written back unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - the platform was appended
    /// * `Ok(false)` - slug or id already taken
    pub fn add_platform(&self, platform: Platform) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().unwrap();
        let mut raw = self.load_raw_platforms()?;
        let platforms = coerce_platforms(&raw);

        if platforms.iter().any(|p| p.slug == platform.slug) {
            return Ok(false);
        }
        if platforms.iter().any(|p| p.id == platform.id) {
            tracing::warn!(id = %platform.id, slug = %platform.slug, "Platform id already taken");
            return Ok(false);
        }

        tracing::info!(slug = %platform.slug, "Adding platform");
        raw.push(serde_json::to_value(&platform).map_err(StoreError::Serialize)?);
        self.write_raw_platforms(&raw)?;
        Ok(true)
    }

    /// Appends every candidate whose slug is new to the canonical collection
    ///
    /// Stored records win: candidates with a slug already present are
    /// skipped. A candidate whose slug is new but whose id is taken is kept
    /// under a fresh id: the slug, else `<slug>-legacy`, else `<slug>-legacy-N`.
    /// Nothing is written when no candidate is appended.
    ///
    /// # Returns
    ///
    /// `(appended, total)` - how many candidates were appended and how many
    /// records the stored list holds afterwards.
    pub fn append_new_platforms(&self, candidates: Vec<Platform>) -> StoreResult<(usize, usize)> {
        let _guard = self.write_lock.lock().unwrap();
        let mut raw = self.load_raw_platforms()?;
        let existing = coerce_platforms(&raw);

        let mut slugs: HashSet<String> = existing.iter().map(|p| p.slug.clone()).collect();
        let mut ids: HashSet<String> = existing.iter().map(|p| p.id.clone()).collect();
        let mut appended = 0;

        for mut platform in candidates {
            if !slugs.insert(platform.slug.clone()) {
                continue;
            }
            if ids.contains(&platform.id) {
                let mut fallback = platform.slug.clone();
                let mut n = 1;
                while ids.contains(&fallback) {
                    fallback = match n {
                        1 => format!("{}-legacy", platform.slug),
                        _ => format!("{}-legacy-{}", platform.slug, n),
                    };
                    n += 1;
                }
                tracing::warn!(slug = %platform.slug, from = %platform.id, to = %fallback, "Platform id taken, re-keying");
                platform.id = fallback;
            }
            ids.insert(platform.id.clone());
            raw.push(serde_json::to_value(&platform).map_err(StoreError::Serialize)?);
            appended += 1;
        }

        if appended > 0 {
            self.write_raw_platforms(&raw)?;
        }
        Ok((appended, raw.len()))
    }

    /// Toggles storefront visibility; returns false if the slug is unknown
    ///
    /// Only the `active` field of the visible record is touched.
    pub fn set_platform_active(&self, slug: &str, active: bool) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().unwrap();
        let mut raw = self.load_raw_platforms()?;

        let target = raw.iter_mut().find(|value| {
            coerce_platform(value).is_some_and(|p| p.slug == slug)
        });
        let Some(Value::Object(record)) = target else {
            return Ok(false);
        };
        record.insert("active".to_string(), Value::Bool(active));

        self.write_raw_platforms(&raw)?;
        Ok(true)
    }

    fn load_services(&self) -> StoreResult<Vec<Service>> {
        let raw: Vec<Value> = read_list_lenient(self.store(), KEY_SERVICES)?;
        let total = raw.len();

        let parsed = raw.into_iter().filter_map(|value| {
            serde_json::from_value::<RawService>(value)
                .ok()
                .and_then(RawService::into_service)
        });
        let services = dedupe(parsed, |s: &Service| Some(s.id.clone()));

        if services.len() != total {
            tracing::debug!(
                kept = services.len(),
                dropped = total - services.len(),
                "Dropped malformed or duplicate service records"
            );
        }
        Ok(services)
    }

    /// Returns services, optionally only those that can be sold right now
    ///
    /// With `active_only`, a service must be active and reference an
    /// existing, active platform. Orphans are filtered, not repaired.
    pub fn get_services(&self, active_only: bool) -> StoreResult<Vec<Service>> {
        let services = self.load_services()?;
        if !active_only {
            return Ok(services);
        }

        let platforms = self.get_platforms()?;
        Ok(services
            .into_iter()
            .filter(|s| {
                s.active
                    && platforms
                        .iter()
                        .any(|p| p.active && p.id == s.platform_id)
            })
            .collect())
    }

    pub fn find_service(&self, id: &ServiceId) -> StoreResult<Option<Service>> {
        Ok(self.load_services()?.into_iter().find(|s| s.id.matches(id)))
    }

    /// Appends `service` unless its id is already present
    pub fn add_service(&self, service: Service) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().unwrap();
        let mut services = self.load_services()?;

        if services.iter().any(|s| s.id.matches(&service.id)) {
            return Ok(false);
        }

        tracing::info!(id = %service.id, platform = %service.platform_id, "Adding service");
        services.push(service);
        write_json(self.store(), KEY_SERVICES, &services)?;
        Ok(true)
    }

    /// Deletes both catalog collections and drops the cache
    pub fn reset(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().unwrap();
        self.store.remove(KEY_PLATFORMS)?;
        self.store.remove(KEY_SERVICES)?;
        self.invalidate();
        self.notify();
        tracing::info!("Catalog reset");
        Ok(())
    }
}

fn coerce_platform(value: &Value) -> Option<Platform> {
    serde_json::from_value::<RawPlatform>(value.clone())
        .ok()
        .and_then(RawPlatform::into_platform)
}

/// Parsed view of stored records: unusable ones dropped, then first-seen
/// wins by slug and by id
pub fn coerce_platforms(raw: &[Value]) -> Vec<Platform> {
    let by_slug = dedupe(raw.iter().filter_map(coerce_platform), |p: &Platform| {
        Some(p.slug.clone())
    });
    dedupe(by_slug, |p: &Platform| Some(p.id.clone()))
}
