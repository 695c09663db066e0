//! Shared site index handle.
//!
//! # Thread Safety
//!
//! [`Site`] is designed for concurrent access:
//! - `index()` returns `Arc<PageIndex>` with minimal locking (just Arc clone)
//! - the first `index()` call builds under a lock with double-checked
//!   locking, so concurrent first callers all see the same snapshot
//! - `reindex()` builds without holding any lock and swaps the snapshot in;
//!   readers holding the old `Arc` keep using it

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::index::{IndexError, PageIndex, build_index};

/// Directories an index is built from.
#[derive(Clone, Debug)]
pub struct SiteContext {
    /// Root of the content tree.
    pub content_root: PathBuf,
    /// Directory holding the ordering manifest.
    pub config_dir: PathBuf,
}

impl SiteContext {
    /// Create a context from a content root and a configuration directory.
    #[must_use]
    pub fn new(content_root: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            config_dir: config_dir.into(),
        }
    }
}

/// Owner of the current [`PageIndex`] snapshot.
pub struct Site {
    context: SiteContext,
    /// Serializes the first build.
    build_lock: Mutex<()>,
    /// Current snapshot, `None` until the first successful build.
    current: RwLock<Option<Arc<PageIndex>>>,
    /// Number of snapshots published so far.
    generation: AtomicU64,
}

impl Site {
    /// Create an uninitialized handle. Nothing is read until [`Site::index`].
    #[must_use]
    pub fn new(context: SiteContext) -> Self {
        Self {
            context,
            build_lock: Mutex::new(()),
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Directories this handle indexes.
    #[must_use]
    pub fn context(&self) -> &SiteContext {
        &self.context
    }

    /// Current snapshot, building it on first access.
    ///
    /// # Errors
    ///
    /// Returns the build error if the first build fails. The handle stays
    /// uninitialized and the next call tries again.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn index(&self) -> Result<Arc<PageIndex>, IndexError> {
        // Fast path: already built
        if let Some(index) = self.snapshot() {
            return Ok(index);
        }

        let _guard = self.build_lock.lock().unwrap();

        // Double-check after acquiring lock
        if let Some(index) = self.snapshot() {
            return Ok(index);
        }

        let index = Arc::new(build_index(&self.context)?);
        self.publish(Arc::clone(&index));
        Ok(index)
    }

    /// Build a new snapshot and publish it.
    ///
    /// On failure the previous snapshot stays published.
    ///
    /// # Errors
    ///
    /// Returns the build error.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn reindex(&self) -> Result<Arc<PageIndex>, IndexError> {
        let index = match build_index(&self.context) {
            Ok(index) => Arc::new(index),
            Err(e) => {
                tracing::error!(error = %e, "Reindex failed, keeping previous index");
                return Err(e);
            }
        };

        self.publish(Arc::clone(&index));
        Ok(index)
    }

    /// Number of snapshots published so far (0 while uninitialized).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Current snapshot without building.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<PageIndex>> {
        self.current.read().unwrap().clone()
    }

    fn publish(&self, index: Arc<PageIndex>) {
        *self.current.write().unwrap() = Some(index);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "Published site index");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Site: Send, Sync);
    assert_impl_all!(PageIndex: Send, Sync);

    fn create_site(root: &Path) -> Site {
        let content = root.join("site");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("index.md"), "# Home").unwrap();
        fs::write(content.join("guide.md"), "# Guide").unwrap();
        Site::new(SiteContext::new(content, root.join("config")))
    }

    #[test]
    fn test_index_is_singleton() {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = create_site(temp_dir.path());

        let first = site.index().unwrap();
        let second = site.index().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(site.generation(), 1);
    }

    #[test]
    fn test_uninitialized_has_no_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = create_site(temp_dir.path());

        assert!(site.snapshot().is_none());
        assert_eq!(site.generation(), 0);
    }

    #[test]
    fn test_reindex_returns_new_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = create_site(temp_dir.path());

        let first = site.reindex().unwrap();
        let second = site.reindex().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(site.generation(), 2);
    }

    #[test]
    fn test_index_after_reindex() {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = create_site(temp_dir.path());

        let initial = site.index().unwrap();
        fs::write(site.context().content_root.join("new-page.md"), "new").unwrap();
        let rebuilt = site.reindex().unwrap();
        let current = site.index().unwrap();

        assert!(!Arc::ptr_eq(&initial, &rebuilt));
        assert!(Arc::ptr_eq(&rebuilt, &current));
        // Old readers keep their snapshot
        assert_eq!(initial.len(), 2);
        assert_eq!(current.len(), 3);
    }

    #[test]
    fn test_extreme_manifest_origin_builds_and_stays_usable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = create_site(temp_dir.path());
        let config = temp_dir.path().join("config");
        fs::create_dir_all(&config).unwrap();
        fs::write(
            config.join(crate::order::ORDER_FILENAME),
            "orderMin: 9223372036854775807\norder: [guide.md, index.md]\n",
        )
        .unwrap();

        let first = site.index().unwrap();
        let second = site.index().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert!(first.get("/guide").unwrap().list_weight > 9.0e18);
    }

    #[test]
    fn test_failed_first_build_stays_uninitialized() {
        let temp_dir = tempfile::tempdir().unwrap();
        let content = temp_dir.path().join("site");
        let site = Site::new(SiteContext::new(&content, temp_dir.path()));

        assert!(site.index().is_err());
        assert!(site.snapshot().is_none());

        fs::create_dir(&content).unwrap();
        fs::write(content.join("page.md"), "x").unwrap();

        let index = site.index().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(site.generation(), 1);
    }

    #[test]
    fn test_failed_reindex_keeps_previous_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = create_site(temp_dir.path());
        let before = site.index().unwrap();

        fs::remove_dir_all(&site.context().content_root).unwrap();
        let result = site.reindex();

        assert!(matches!(result, Err(IndexError::Walk { .. })));
        assert!(Arc::ptr_eq(&before, &site.index().unwrap()));
        assert_eq!(site.generation(), 1);
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = create_site(temp_dir.path());

        let snapshots: Vec<Arc<PageIndex>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| site.index().unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(snapshots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(site.generation(), 1);
    }
}
