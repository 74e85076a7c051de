//! Record sources
//!
//! The snapshot is fetched once at startup. Sources only hand back raw rows;
//! privacy filtering and uniqueness checks live in [`crate::RecordStore`].

use crate::error::StoreError;
use crate::record::ProjectRecord;
use async_trait::async_trait;
use std::path::PathBuf;

/// Something that can produce the full project table
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every row
    async fn fetch(&self) -> Result<Vec<ProjectRecord>, StoreError>;

    /// Human-readable origin for logs and errors
    fn describe(&self) -> String;
}

/// JSON array of records on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create source for a file path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    StoreError::Unavailable(format!("{} does not exist", self.describe()))
                }
                _ => StoreError::io_error(&self.path, e),
            })?;

        serde_json::from_str::<Vec<ProjectRecord>>(&raw)
            .map_err(|e| StoreError::parse_error(self.describe(), e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Records held in memory (tests, fixtures, embedding)
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<ProjectRecord>,
}

impl InMemorySource {
    /// Create source from records
    #[inline]
    #[must_use]
    pub fn new(records: Vec<ProjectRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn fetch(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} rows)", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn json_file_source_reads_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"record_id": "a", "province": "ON"}}, {{"record_id": "b"}}]"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        let rows = source.fetch().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].province.as_deref(), Some("ON"));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref reason) if reason.contains("here.json")));
    }

    #[tokio::test]
    async fn directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileSource::new(dir.path()).fetch().await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn non_array_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"record_id": "a"}}"#).unwrap();

        let err = JsonFileSource::new(file.path()).fetch().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
