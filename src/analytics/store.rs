use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::snapshot::{self, SnapshotError};
use super::types::{AnalyticsData, PostAnalytics};
use super::AnalyticsError;

/// Per-slug view counters backed by a JSON snapshot file.
///
/// Every mutation rewrites the whole file while still holding the write lock,
/// so snapshots land on disk in mutation order. A failed write leaves the
/// in-memory increment in place and reports the error to the caller.
pub struct AnalyticsStore {
    data: RwLock<AnalyticsData>,
    path: PathBuf,
}

impl AnalyticsStore {
    /// Load the snapshot at `path` (creating its parent directory if needed).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(dir = %parent.display(), error = %e, "failed to create analytics directory");
            }
        }
        let data = snapshot::load(&path);
        Self {
            data: RwLock::new(data),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one view of `slug` and persist the snapshot.
    pub fn track_view(&self, slug: &str) -> Result<PostAnalytics, AnalyticsError> {
        let mut data = self.write();
        // Timestamp taken under the lock so `last_viewed` follows completion order.
        let now = Utc::now();
        self.apply_view(&mut data, slug, now)
    }

    /// Same as [`track_view`](Self::track_view) with an explicit clock reading.
    pub fn track_view_at(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<PostAnalytics, AnalyticsError> {
        let mut data = self.write();
        self.apply_view(&mut data, slug, now)
    }

    fn apply_view(
        &self,
        data: &mut AnalyticsData,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<PostAnalytics, AnalyticsError> {
        let record = data
            .posts
            .entry(slug.to_string())
            .or_insert_with(|| PostAnalytics {
                first_viewed: Some(now),
                ..PostAnalytics::empty(slug)
            });
        record.page_views += 1;
        record.recent_views += 1;
        record.last_viewed = Some(now);
        let updated = record.clone();

        if let Err(e) = snapshot::save(&self.path, data) {
            tracing::error!(slug = %slug, path = %self.path.display(), error = %e, "failed to save analytics");
            return Err(AnalyticsError::Persist {
                slug: slug.to_string(),
                source: e,
            });
        }

        tracing::debug!(slug = %slug, total = updated.page_views, "tracked view");
        Ok(updated)
    }

    /// Current counters for `slug`, or a zero record if it was never viewed.
    pub fn get_analytics(&self, slug: &str) -> PostAnalytics {
        self.read()
            .posts
            .get(slug)
            .cloned()
            .unwrap_or_else(|| PostAnalytics::empty(slug))
    }

    /// Owned copy of the whole table.
    pub fn get_all_analytics(&self) -> HashMap<String, PostAnalytics> {
        self.read().posts.clone()
    }

    /// Write the current table to disk. Called once on shutdown.
    pub fn flush(&self) -> Result<(), SnapshotError> {
        let data = self.read();
        snapshot::save(&self.path, &data)
    }

    // Counters stay internally consistent even if a holder panicked, so a
    // poisoned lock is recovered rather than propagated.
    fn read(&self) -> RwLockReadGuard<'_, AnalyticsData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AnalyticsData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}
