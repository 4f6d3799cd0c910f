use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// View counters for a single post, keyed by slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnalytics {
    pub slug: String,
    pub page_views: u64,
    /// Incremented alongside `page_views` and never reset.
    pub recent_views: u64,
    #[serde(default, with = "zero_time")]
    pub last_viewed: Option<DateTime<Utc>>,
    #[serde(default, with = "zero_time")]
    pub first_viewed: Option<DateTime<Utc>>,
}

impl PostAnalytics {
    /// Zero-valued record returned for slugs that were never tracked.
    pub fn empty(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            ..Self::default()
        }
    }
}

/// The full persisted snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsData {
    #[serde(default)]
    pub posts: HashMap<String, PostAnalytics>,
}

/// Response body for `POST /posts/{id}/view`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackViewResponse {
    pub slug: String,
    pub page_views: u64,
    pub last_viewed: Option<DateTime<Utc>>,
}

impl From<PostAnalytics> for TrackViewResponse {
    fn from(a: PostAnalytics) -> Self {
        Self {
            slug: a.slug,
            page_views: a.page_views,
            last_viewed: a.last_viewed,
        }
    }
}

/// Unset timestamps are written as `0001-01-01T00:00:00Z` and any timestamp at
/// or before that instant reads back as unset.
pub(crate) mod zero_time {
    use super::*;

    const ZERO_SECS: i64 = -62_135_596_800;
    const ZERO_TEXT: &str = "0001-01-01T00:00:00Z";

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => serializer.serialize_str(ZERO_TEXT),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let ts = DateTime::parse_from_rfc3339(&raw)
            .map_err(serde::de::Error::custom)?
            .with_timezone(&Utc);
        if ts.timestamp() <= ZERO_SECS {
            Ok(None)
        } else {
            Ok(Some(ts))
        }
    }
}
