use crate::Result;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and any missing parents.
pub(crate) async fn make_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

pub(crate) async fn canonicalize(path: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to resolve the path {}", path.display()))
}

/// A new random record id.
pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// The current time, truncated to microseconds so that it survives a trip through the database.
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

/// Formats a timestamp with a fixed width so that stored values sort chronologically as text.
pub(crate) fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip() {
        let t = now();
        let s = timestamp(t);
        assert!(s.ends_with('Z'), "{s}");
        let parsed = DateTime::parse_from_rfc3339(&s).unwrap().with_timezone(&Utc);
        assert_eq!(parsed, t);
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(generate_id(), generate_id());
    }

    #[tokio::test]
    async fn test_write_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a").join("b");
        make_dir(&path).await.unwrap();
        let file = path.join("x.txt");
        write(&file, "hello").await.unwrap();
        assert_eq!(read(&file).await.unwrap(), "hello");
    }
}
