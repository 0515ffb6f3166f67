// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Caching of discovery snapshots
//!
//! Two layers:
//! - [`DiscoveryCache`] keeps the snapshot in memory for a TTL (default 5 minutes)
//!   and can be invalidated explicitly.
//! - [`SnapshotStore`] persists snapshots per kube context on disk for one hour,
//!   so a fresh process can resolve names without walking every API group.
//!
//! Cache location: ~/.kubeget/cache/discovery/<context>.json

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::providers::{ApiResourceList, DiscoveryProvider};
use crate::config;

/// How long an in-memory snapshot is served before refetching
pub const DEFAULT_DISCOVERY_TTL: Duration = Duration::from_secs(300);

/// How long a persisted snapshot stays usable
const SNAPSHOT_TTL: Duration = Duration::from_secs(60 * 60);

/// Get current UNIX timestamp in seconds
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn is_cache_fresh(created_at: u64, ttl: Duration) -> bool {
    current_timestamp().saturating_sub(created_at) < ttl.as_secs()
}

/// Write via a temp file in the same directory and rename into place
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))
        .context("Failed to create temp file")?;

    std::fs::write(temp_file.path(), content)
        .with_context(|| format!("Failed to write temp file {:?}", temp_file.path()))?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file to {:?}", path))?;

    Ok(())
}

/// Replace anything but alphanumerics, dash and underscore
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSnapshot {
    created_at: u64,
    resources: Vec<ApiResourceList>,
}

/// On-disk discovery snapshots, one file per kube context
pub struct SnapshotStore {
    base_dir: PathBuf,
    write_lock: std::sync::Mutex<()>,
}

impl SnapshotStore {
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(config::base_dir()?.join("cache").join("discovery")))
    }

    pub fn with_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            write_lock: std::sync::Mutex::new(()),
        }
    }

    fn snapshot_path(&self, context: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", sanitize_filename(context)))
    }

    /// Load a snapshot if present and younger than an hour
    ///
    /// Stale or unreadable files are removed and treated as absent.
    pub fn load(&self, context: &str) -> Option<Vec<ApiResourceList>> {
        let path = self.snapshot_path(context);
        if !path.exists() {
            return None;
        }

        let parsed = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<PersistedSnapshot>(&content).ok());

        match parsed {
            Some(snapshot) if is_cache_fresh(snapshot.created_at, SNAPSHOT_TTL) => {
                debug!(context = %context, groups = snapshot.resources.len(), "Loaded discovery snapshot from disk");
                Some(snapshot.resources)
            }
            _ => {
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    pub fn save(&self, context: &str, resources: &[ApiResourceList]) -> Result<()> {
        let content = serde_json::to_string(&PersistedSnapshot {
            created_at: current_timestamp(),
            resources: resources.to_vec(),
        })
        .context("Failed to serialize discovery snapshot")?;

        let _lock = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("Discovery cache lock poisoned"))?;

        std::fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create cache directory {}", self.base_dir.display())
        })?;

        atomic_write(&self.snapshot_path(context), content.as_bytes())
            .context("Failed to write discovery snapshot")
    }

    pub fn remove(&self, context: &str) -> Result<()> {
        let path = self.snapshot_path(context);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Remove every persisted snapshot
    pub fn clear(&self) -> Result<()> {
        if self.base_dir.exists() {
            std::fs::remove_dir_all(&self.base_dir)?;
        }
        Ok(())
    }
}

struct CachedSnapshot {
    resources: Vec<ApiResourceList>,
    cached_at: Instant,
    /// Fetched from the API server rather than loaded from disk
    live: bool,
}

/// [`DiscoveryProvider`] decorator that caches snapshots
///
/// Serves the in-memory snapshot until the TTL expires, then refetches.
/// Fetch errors are returned and never cached.
pub struct DiscoveryCache {
    inner: Arc<dyn DiscoveryProvider>,
    ttl: Duration,
    store: Option<(SnapshotStore, String)>,
    cached: RwLock<Option<CachedSnapshot>>,
}

impl DiscoveryCache {
    pub fn new(inner: Arc<dyn DiscoveryProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            store: None,
            cached: RwLock::new(None),
        }
    }

    /// Also persist snapshots for `context` in `store`
    pub fn with_store(mut self, store: SnapshotStore, context: &str) -> Self {
        self.store = Some((store, context.to_string()));
        self
    }

    async fn fetch_live(&self) -> Result<Vec<ApiResourceList>> {
        let resources = self.inner.preferred_resources().await?;

        if let Some((store, context)) = &self.store
            && let Err(e) = store.save(context, &resources)
        {
            warn!(context = %context, error = %e, "Failed to persist discovery snapshot");
        }

        *self.cached.write().await = Some(CachedSnapshot {
            resources: resources.clone(),
            cached_at: Instant::now(),
            live: true,
        });
        Ok(resources)
    }
}

#[async_trait]
impl DiscoveryProvider for DiscoveryCache {
    async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>> {
        {
            let cached = self.cached.read().await;
            if let Some(snapshot) = cached.as_ref()
                && snapshot.cached_at.elapsed() < self.ttl
            {
                return Ok(snapshot.resources.clone());
            }
        }

        let first_load = self.cached.read().await.is_none();
        if first_load
            && let Some((store, context)) = &self.store
            && let Some(resources) = store.load(context)
        {
            *self.cached.write().await = Some(CachedSnapshot {
                resources: resources.clone(),
                cached_at: Instant::now(),
                live: false,
            });
            return Ok(resources);
        }

        self.fetch_live().await
    }

    async fn is_fresh(&self) -> bool {
        self.cached.read().await.as_ref().is_none_or(|c| c.live)
    }

    async fn invalidate(&self) {
        debug!("Invalidating discovery cache");
        if let Some((store, context)) = &self.store
            && let Err(e) = store.remove(context)
        {
            warn!(context = %context, error = %e, "Failed to remove discovery snapshot");
        }
        *self.cached.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::fakes::{FakeDiscovery, sample_snapshot};
    use tempfile::TempDir;

    fn test_store() -> (SnapshotStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SnapshotStore::with_dir(temp_dir.path().join("discovery"));
        (store, temp_dir)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("kind-dev"), "kind-dev");
        assert_eq!(
            sanitize_filename("arn:aws:eks:us-east-1:123:cluster/prod"),
            "arn_aws_eks_us-east-1_123_cluster_prod"
        );
    }

    #[test]
    fn test_is_cache_fresh() {
        let now = current_timestamp();
        assert!(is_cache_fresh(now, Duration::from_secs(60)));
        assert!(!is_cache_fresh(now - 120, Duration::from_secs(60)));
    }

    #[test]
    fn test_store_save_and_load() {
        let (store, _dir) = test_store();

        store.save("prod", &sample_snapshot()).unwrap();

        assert_eq!(store.load("prod"), Some(sample_snapshot()));
        assert_eq!(store.load("staging"), None);
    }

    #[test]
    fn test_store_drops_stale_snapshot() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(&store.base_dir).unwrap();
        let stale = PersistedSnapshot {
            created_at: current_timestamp() - SNAPSHOT_TTL.as_secs() - 1,
            resources: sample_snapshot(),
        };
        let path = store.snapshot_path("prod");
        std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        assert_eq!(store.load("prod"), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_store_drops_corrupt_snapshot() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(&store.base_dir).unwrap();
        let path = store.snapshot_path("prod");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(store.load("prod"), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_store_remove_and_clear() {
        let (store, _dir) = test_store();
        store.save("a", &sample_snapshot()).unwrap();
        store.save("b", &sample_snapshot()).unwrap();

        store.remove("a").unwrap();
        assert!(store.load("a").is_none());
        assert!(store.load("b").is_some());

        store.clear().unwrap();
        assert!(store.load("b").is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_cache_serves_within_ttl() {
        let inner = Arc::new(FakeDiscovery::new(sample_snapshot()));
        let cache = DiscoveryCache::new(inner.clone(), Duration::from_secs(60));

        cache.preferred_resources().await.unwrap();
        cache.preferred_resources().await.unwrap();

        assert_eq!(inner.calls(), 1);
        assert!(cache.is_fresh().await);
    }

    #[tokio::test]
    async fn test_cache_refetches_after_ttl() {
        let inner = Arc::new(FakeDiscovery::new(sample_snapshot()));
        let cache = DiscoveryCache::new(inner.clone(), Duration::ZERO);

        cache.preferred_resources().await.unwrap();
        cache.preferred_resources().await.unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_invalidate_refetches() {
        let inner = Arc::new(FakeDiscovery::new(vec![]));
        let cache = DiscoveryCache::new(inner.clone(), Duration::from_secs(60));

        assert!(cache.preferred_resources().await.unwrap().is_empty());
        inner.set_snapshot(sample_snapshot());
        assert!(cache.preferred_resources().await.unwrap().is_empty());

        cache.invalidate().await;
        assert_eq!(cache.preferred_resources().await.unwrap(), sample_snapshot());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_does_not_cache_errors() {
        let inner = Arc::new(FakeDiscovery::failing());
        let cache = DiscoveryCache::new(inner.clone(), Duration::from_secs(60));

        assert!(cache.preferred_resources().await.is_err());
        assert!(cache.preferred_resources().await.is_err());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_loads_from_store_as_stale() {
        let (store, dir) = test_store();
        store.save("prod", &sample_snapshot()).unwrap();

        let inner = Arc::new(FakeDiscovery::new(vec![]));
        let cache = DiscoveryCache::new(inner.clone(), Duration::from_secs(60))
            .with_store(SnapshotStore::with_dir(dir.path().join("discovery")), "prod");

        assert_eq!(cache.preferred_resources().await.unwrap(), sample_snapshot());
        assert_eq!(inner.calls(), 0);
        assert!(!cache.is_fresh().await);

        // Invalidation drops the persisted copy and goes to the server
        cache.invalidate().await;
        assert!(cache.preferred_resources().await.unwrap().is_empty());
        assert_eq!(inner.calls(), 1);
        assert!(cache.is_fresh().await);
        assert_eq!(store.load("prod"), Some(vec![]));
    }
}
