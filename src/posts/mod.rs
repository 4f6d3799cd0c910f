pub mod catalog;
pub mod handler;
pub mod types;

pub use catalog::PostCatalog;
pub use types::{BlogPost, NewPost, PostView};

use std::sync::Arc;

use crate::analytics::AnalyticsStore;

/// Shared state for post and view-tracking endpoints.
pub struct PostState {
    pub catalog: Arc<PostCatalog>,
    pub analytics: Arc<AnalyticsStore>,
}
