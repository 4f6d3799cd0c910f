use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

use super::catalog::CatalogError;
use super::types::{NewPost, PostView};
use super::PostState;
use crate::auth::Principal;
use crate::error::{AppError, AppResult, LoggedJson};

/// GET /posts - All posts with their view counters.
pub async fn list_posts(State(state): State<Arc<PostState>>) -> Json<Vec<PostView>> {
    let analytics = state.analytics.get_all_analytics();
    let posts = state
        .catalog
        .list()
        .into_iter()
        .map(|post| {
            let counters = analytics.get(&post.slug);
            PostView::merge(post, counters)
        })
        .collect();
    Json(posts)
}

/// GET /posts/{id} - A single post by slug or numeric id.
pub async fn get_post(
    State(state): State<Arc<PostState>>,
    Path(ident): Path<String>,
) -> AppResult<Json<PostView>> {
    let post = state
        .catalog
        .find(&ident)
        .ok_or_else(|| AppError::NotFound("not found".to_string()))?;
    let counters = state.analytics.get_analytics(&post.slug);
    Ok(Json(PostView::merge(post, Some(&counters))))
}

/// POST /posts - Create a post (admin only).
pub async fn create_post(
    State(state): State<Arc<PostState>>,
    Extension(principal): Extension<Principal>,
    LoggedJson(input): LoggedJson<NewPost>,
) -> AppResult<(StatusCode, Json<PostView>)> {
    let post = state
        .catalog
        .create(input, &principal.username)
        .map_err(|e: CatalogError| AppError::Validation(e.to_string()))?;
    tracing::info!(id = post.id, slug = %post.slug, author = %post.author, "post created");
    Ok((StatusCode::CREATED, Json(PostView::merge(post, None))))
}
