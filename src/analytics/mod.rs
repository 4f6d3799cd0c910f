pub mod handler;
pub mod snapshot;
pub mod store;
pub mod types;

pub use store::AnalyticsStore;
pub use types::{AnalyticsData, PostAnalytics};

use snapshot::SnapshotError;

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The counter was updated in memory but the snapshot write failed.
    #[error("failed to persist analytics for {slug}: {source}")]
    Persist {
        slug: String,
        #[source]
        source: SnapshotError,
    },
}
