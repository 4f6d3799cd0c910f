use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::PostAnalytics;

/// A post as held by the catalog. `id` is reassigned on every load; `slug` is
/// the stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogPost {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub date: DateTime<Utc>,
}

/// One entry of the posts file, and the body of `POST /posts`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    pub date: Option<DateTime<Utc>>,
}

/// Outbound representation with view counters merged in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub page_views: u64,
    pub recent_views: u64,
    #[serde(with = "crate::analytics::types::zero_time")]
    pub last_viewed: Option<DateTime<Utc>>,
}

impl PostView {
    pub fn merge(post: BlogPost, analytics: Option<&PostAnalytics>) -> Self {
        let (page_views, recent_views, last_viewed) = analytics
            .map(|a| (a.page_views, a.recent_views, a.last_viewed))
            .unwrap_or_default();
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            body: post.body,
            author: post.author,
            date: post.date,
            page_views,
            recent_views,
            last_viewed,
        }
    }
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
