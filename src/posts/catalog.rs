use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use super::types::{slugify, BlogPost, NewPost};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("title is required")]
    MissingTitle,

    #[error("slug already exists: {0}")]
    DuplicateSlug(String),
}

/// In-memory post list loaded from the static posts file.
pub struct PostCatalog {
    posts: RwLock<Vec<BlogPost>>,
}

impl PostCatalog {
    /// Load posts from a JSON array. IDs are assigned 1..N in file order.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<NewPost>>(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "malformed posts file, serving no posts");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "posts file doesn't exist, serving no posts");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read posts file, serving no posts");
                Vec::new()
            }
        };
        let catalog = Self::from_entries(entries);
        tracing::info!(posts = catalog.len(), "loaded posts");
        catalog
    }

    pub fn from_entries(entries: Vec<NewPost>) -> Self {
        let posts = entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| BlogPost {
                id: i as u64 + 1,
                slug: e.slug,
                title: e.title,
                body: e.body,
                author: e.author,
                date: e.date.unwrap_or_else(Utc::now),
            })
            .collect();
        Self {
            posts: RwLock::new(posts),
        }
    }

    pub fn list(&self) -> Vec<BlogPost> {
        self.posts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.posts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a path identifier: slug first, then numeric id.
    pub fn find(&self, ident: &str) -> Option<BlogPost> {
        let posts = self.posts.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(post) = posts.iter().find(|p| !p.slug.is_empty() && p.slug == ident) {
            return Some(post.clone());
        }
        let id: u64 = ident.parse().ok()?;
        posts.iter().find(|p| p.id == id).cloned()
    }

    /// Append a post authored by `author`.
    pub fn create(&self, input: NewPost, author: &str) -> Result<BlogPost, CatalogError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(CatalogError::MissingTitle);
        }
        let slug = if input.slug.trim().is_empty() {
            slugify(&title)
        } else {
            input.slug.trim().to_string()
        };

        let mut posts = self.posts.write().unwrap_or_else(PoisonError::into_inner);
        if !slug.is_empty() && posts.iter().any(|p| p.slug == slug) {
            return Err(CatalogError::DuplicateSlug(slug));
        }
        let post = BlogPost {
            id: posts.len() as u64 + 1,
            slug,
            title,
            body: input.body,
            author: author.to_string(),
            date: input.date.unwrap_or_else(Utc::now),
        };
        posts.push(post.clone());
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, title: &str) -> NewPost {
        NewPost {
            slug: slug.to_string(),
            title: title.to_string(),
            body: "body".to_string(),
            author: "admin".to_string(),
            date: None,
        }
    }

    #[test]
    fn test_ids_assigned_in_order() {
        let catalog = PostCatalog::from_entries(vec![entry("a", "A"), entry("b", "B")]);
        let posts = catalog.list();
        assert_eq!(posts[0].id, 1);
        assert_eq!(posts[1].id, 2);
        assert_eq!(posts[1].slug, "b");
    }

    #[test]
    fn test_find_by_slug_then_id() {
        let catalog = PostCatalog::from_entries(vec![entry("a", "A"), entry("2", "Numeric slug")]);
        assert_eq!(catalog.find("a").unwrap().id, 1);
        // A slug that looks like a number wins over the id.
        assert_eq!(catalog.find("2").unwrap().title, "Numeric slug");
        assert_eq!(catalog.find("1").unwrap().slug, "a");
        assert!(catalog.find("99").is_none());
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn test_create_assigns_author_and_slug() {
        let catalog = PostCatalog::from_entries(vec![entry("a", "A")]);
        let post = catalog.create(entry("", "Second Post!"), "admin").unwrap();
        assert_eq!(post.id, 2);
        assert_eq!(post.slug, "second-post");
        assert_eq!(post.author, "admin");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_create_rejects_duplicate_slug_and_missing_title() {
        let catalog = PostCatalog::from_entries(vec![entry("a", "A")]);
        assert_eq!(
            catalog.create(entry("a", "Other"), "admin").unwrap_err(),
            CatalogError::DuplicateSlug("a".to_string())
        );
        assert_eq!(
            catalog.create(entry("b", "   "), "admin").unwrap_err(),
            CatalogError::MissingTitle
        );
    }

    #[test]
    fn test_load_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PostCatalog::load(&dir.path().join("none.json")).is_empty());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(PostCatalog::load(&bad).is_empty());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(
            &path,
            r#"[{"slug":"hello-world","title":"Hello","body":"hi","author":"admin","date":"2025-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let catalog = PostCatalog::load(&path);
        let post = catalog.find("hello-world").unwrap();
        assert_eq!(post.id, 1);
        assert_eq!(post.date.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
