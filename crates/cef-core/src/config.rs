//! Explorer configuration
//!
//! Loaded from TOML; every field has a default so a partial file is fine.
//!
//! ```toml
//! batch_size = 20
//! page_size = 50
//! pagination = "paged"
//! debounce_ms = 300
//! artifact_cache_capacity = 10000
//! privacy_filter = true
//! data_path = "data/projects.json"
//! ```

use crate::selection::Pagination;
use cef_record::Visibility;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// How card positions are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Infinite scroll
    #[default]
    Continuous,
    /// Numbered pages of `page_size` cards
    Paged,
}

/// Explorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Cards built per `materialize_next` call
    pub batch_size: usize,
    /// Cards per page when paged
    pub page_size: usize,
    /// Pagination scheme
    pub pagination: PaginationMode,
    /// Quiet period before coalesced filter edits are applied
    pub debounce_ms: u64,
    /// Maximum cached card artifacts
    pub artifact_cache_capacity: u64,
    /// Hide records with an anonymous status
    pub privacy_filter: bool,
    /// JSON array of project records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            page_size: 50,
            pagination: PaginationMode::Continuous,
            debounce_ms: 300,
            artifact_cache_capacity: 10_000,
            privacy_filter: true,
            data_path: None,
        }
    }
}

impl ExplorerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for bad syntax, [`ConfigError::Invalid`] for
    /// out-of-range values
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded explorer config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when `batch_size` or `page_size` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "batch_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// With batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// With paged pagination of `page_size` cards
    #[inline]
    #[must_use]
    pub fn with_pages(mut self, page_size: usize) -> Self {
        self.pagination = PaginationMode::Paged;
        self.page_size = page_size;
        self
    }

    /// With debounce period
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// With artifact cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.artifact_cache_capacity = capacity;
        self
    }

    /// With privacy filtering on or off
    #[inline]
    #[must_use]
    pub fn with_privacy_filter(mut self, enabled: bool) -> Self {
        self.privacy_filter = enabled;
        self
    }

    /// With data file
    #[inline]
    #[must_use]
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Pagination scheme with its page size
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        match self.pagination {
            PaginationMode::Continuous => Pagination::Continuous,
            PaginationMode::Paged => Pagination::Paged {
                page_size: self.page_size,
            },
        }
    }

    /// Store visibility implied by `privacy_filter`
    #[inline]
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        if self.privacy_filter {
            Visibility::PublicOnly
        } else {
            Visibility::All
        }
    }

    /// Debounce period as a duration
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ExplorerConfig::from_toml_str("batch_size = 10\npagination = \"paged\"").unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.pagination(), Pagination::Paged { page_size: 50 });
        assert!(config.privacy_filter);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let err = ExplorerConfig::from_toml_str("batch_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "batch_size", .. }));

        let err = ExplorerConfig::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "page_size", .. }));
    }

    #[test]
    fn bad_syntax_is_a_parse_error() {
        let err = ExplorerConfig::from_toml_str("batch_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms = 50\ndata_path = \"projects.json\"").unwrap();

        let config = ExplorerConfig::load(file.path()).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert_eq!(config.data_path, Some(PathBuf::from("projects.json")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ExplorerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn builder_methods() {
        let config = ExplorerConfig::new()
            .with_batch_size(5)
            .with_pages(10)
            .with_privacy_filter(false);
        assert_eq!(config.pagination(), Pagination::Paged { page_size: 10 });
        assert_eq!(config.visibility(), Visibility::All);
        assert!(config.validate().is_ok());
    }
}
