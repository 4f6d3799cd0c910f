use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::types::AnalyticsData;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load a snapshot from disk.
///
/// A missing file is a fresh start. An unreadable or corrupt file is logged and
/// discarded; the store then starts empty and the next write replaces it.
pub fn load(path: &Path) -> AnalyticsData {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "analytics file doesn't exist, starting fresh");
            return AnalyticsData::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read analytics file, starting fresh");
            return AnalyticsData::default();
        }
    };

    match serde_json::from_slice::<AnalyticsData>(&bytes) {
        Ok(data) => {
            tracing::info!(posts = data.posts.len(), "loaded analytics snapshot");
            data
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt analytics file discarded, starting fresh");
            AnalyticsData::default()
        }
    }
}

/// Overwrite the snapshot file with the full table, pretty-printed.
pub fn save(path: &Path, data: &AnalyticsData) -> Result<(), SnapshotError> {
    let json = serde_json::to_vec_pretty(data)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = load(&dir.path().join("nope.json"));
        assert!(data.posts.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.json");
        fs::write(&path, b"{\"posts\": {\"hello\": ").unwrap();
        assert!(load(&path).posts.is_empty());
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.json");
        save(&path, &AnalyticsData::default()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"posts\""));
        assert!(text.contains('\n'), "snapshot should be human-readable");
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("analytics.json");
        let err = save(&path, &AnalyticsData::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
