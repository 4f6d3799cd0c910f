use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::Principal;
use crate::error::{AppError, AppResult, LoggedJson};

const MAX_COMMENT_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    #[serde(alias = "post_id")]
    pub post_id: u64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub post_id: Option<String>,
}

/// Append-only, process-lifetime comment list.
#[derive(Default)]
pub struct CommentStore {
    comments: Mutex<Vec<Comment>>,
}

impl CommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, post_id: u64, author: &str, content: String) -> Comment {
        let mut comments = self.comments.lock().unwrap_or_else(PoisonError::into_inner);
        let comment = Comment {
            id: comments.len() as u64 + 1,
            post_id,
            author: author.to_string(),
            content,
        };
        comments.push(comment.clone());
        comment
    }

    pub fn list(&self, post_id: Option<u64>) -> Vec<Comment> {
        self.comments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| post_id.map_or(true, |id| c.post_id == id))
            .cloned()
            .collect()
    }
}

/// GET /comments?post_id= - List comments, optionally for one post.
pub async fn list_comments(
    State(store): State<Arc<CommentStore>>,
    Query(query): Query<CommentQuery>,
) -> AppResult<Json<Vec<Comment>>> {
    let post_id = match query.post_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<u64>()
                .map_err(|_| AppError::Validation("invalid post_id".to_string()))?,
        ),
    };
    Ok(Json(store.list(post_id)))
}

/// POST /comments - Add a comment as the authenticated user.
pub async fn create_comment(
    State(store): State<Arc<CommentStore>>,
    Extension(principal): Extension<Principal>,
    LoggedJson(input): LoggedJson<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let content = input.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }
    if content.len() > MAX_COMMENT_BYTES {
        return Err(AppError::Validation(format!(
            "content exceeds {MAX_COMMENT_BYTES} bytes"
        )));
    }
    let comment = store.add(input.post_id, &principal.username, content);
    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let store = CommentStore::new();
        assert_eq!(store.add(1, "a", "x".into()).id, 1);
        assert_eq!(store.add(2, "b", "y".into()).id, 2);
    }

    #[test]
    fn test_filter_by_post() {
        let store = CommentStore::new();
        store.add(1, "a", "one".into());
        store.add(2, "b", "two".into());
        store.add(1, "c", "three".into());

        assert_eq!(store.list(None).len(), 3);
        let for_one = store.list(Some(1));
        assert_eq!(for_one.len(), 2);
        assert!(for_one.iter().all(|c| c.post_id == 1));
        assert!(store.list(Some(9)).is_empty());
    }

    #[test]
    fn test_comment_serializes_camel_case() {
        let store = CommentStore::new();
        let json = serde_json::to_value(store.add(7, "user", "hello".into())).unwrap();
        assert_eq!(json["postId"], 7);
        assert!(json.get("post_id").is_none());
    }

    #[test]
    fn test_create_accepts_both_post_id_spellings() {
        let camel: CreateComment =
            serde_json::from_str(r#"{"postId": 3, "content": "x"}"#).unwrap();
        let snake: CreateComment =
            serde_json::from_str(r#"{"post_id": 3, "content": "x"}"#).unwrap();
        assert_eq!(camel.post_id, 3);
        assert_eq!(snake.post_id, 3);
    }
}
