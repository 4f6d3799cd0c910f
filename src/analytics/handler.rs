use axum::extract::{Path, State};
use axum::Json;
use std::collections::HashMap;
use std::sync::Arc;

use super::types::{PostAnalytics, TrackViewResponse};
use crate::error::{AppError, AppResult};
use crate::posts::PostState;

/// POST /posts/{id}/view - Record a page view for a post.
///
/// `id` is resolved as a slug first and then as a numeric id. Counters are
/// always keyed by slug since ids change across reloads.
pub async fn track_view(
    State(state): State<Arc<PostState>>,
    Path(ident): Path<String>,
) -> AppResult<Json<TrackViewResponse>> {
    let post = state
        .catalog
        .find(&ident)
        .filter(|p| !p.slug.is_empty())
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;

    let analytics = Arc::clone(&state.analytics);
    let slug = post.slug;
    // File write happens under the store lock; keep it off the async workers.
    let updated = tokio::task::spawn_blocking(move || analytics.track_view(&slug))
        .await
        .map_err(|e| AppError::Internal(format!("view tracking task failed: {e}")))??;

    Ok(Json(updated.into()))
}

/// GET /analytics - Full analytics table (admin only).
pub async fn list_analytics(
    State(state): State<Arc<PostState>>,
) -> Json<HashMap<String, PostAnalytics>> {
    Json(state.analytics.get_all_analytics())
}
