//! Session registry
//!
//! Hands out sessions that share one record store and one artifact cache.

use crate::cache::ArtifactCache;
use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::session::ExplorerSession;
use cef_charts::{ArtifactBuilder, CardArtifactBuilder};
use cef_record::{RecordSource, RecordStore};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use ulid::Ulid;

/// Session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Ulid);

impl SessionId {
    /// Fresh id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live sessions over one store
#[derive(Debug)]
pub struct SessionRegistry {
    store: Arc<RecordStore>,
    cache: ArtifactCache,
    config: ExplorerConfig,
    builder: Arc<dyn ArtifactBuilder>,
    sessions: DashMap<SessionId, Arc<ExplorerSession>>,
}

impl SessionRegistry {
    /// Registry over an already loaded store
    ///
    /// # Errors
    /// [`ExplorerError::Config`] if the config is invalid
    pub fn new(store: Arc<RecordStore>, config: ExplorerConfig) -> Result<Self, ExplorerError> {
        config.validate()?;
        Ok(Self {
            store,
            cache: ArtifactCache::new(config.artifact_cache_capacity),
            config,
            builder: Arc::new(CardArtifactBuilder),
            sessions: DashMap::new(),
        })
    }

    /// Load the store from `source`, then build the registry
    ///
    /// # Errors
    /// [`ExplorerError::Store`] if the source is unavailable or unparsable,
    /// [`ExplorerError::Config`] if the config is invalid
    pub async fn load<S>(source: &S, config: ExplorerConfig) -> Result<Self, ExplorerError>
    where
        S: RecordSource + ?Sized,
    {
        config.validate()?;
        let store = RecordStore::load(source, config.visibility()).await?;
        Self::new(store, config)
    }

    /// With a different artifact builder for new sessions
    #[must_use]
    pub fn with_builder(mut self, builder: Arc<dyn ArtifactBuilder>) -> Self {
        self.builder = builder;
        self
    }

    /// Open a new session
    pub fn open(&self) -> Arc<ExplorerSession> {
        let id = SessionId::new();
        let session = Arc::new(
            ExplorerSession::new(id, Arc::clone(&self.store), self.cache.clone(), &self.config)
                .with_builder(Arc::clone(&self.builder)),
        );
        self.sessions.insert(id, Arc::clone(&session));
        tracing::info!(session = %id, open = self.sessions.len(), "Session opened");
        session
    }

    /// Look up a session
    ///
    /// # Errors
    /// [`ExplorerError::SessionNotFound`] for unknown or closed ids
    pub fn get(&self, id: SessionId) -> Result<Arc<ExplorerSession>, ExplorerError> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(ExplorerError::SessionNotFound(id))
    }

    /// Close a session; returns whether it was open
    pub fn close(&self, id: SessionId) -> bool {
        let closed = self.sessions.remove(&id).is_some();
        if closed {
            tracing::info!(session = %id, "Session closed");
        }
        closed
    }

    /// Number of open sessions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Shared store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Shared artifact cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use cef_record::InMemorySource;
    use cef_test_utils::{scenario_rows, SCENARIO_SIZE};

    #[tokio::test]
    async fn sessions_share_store_and_cache() {
        let registry = SessionRegistry::load(&InMemorySource::new(scenario_rows()), ExplorerConfig::default())
            .await
            .unwrap();
        assert_eq!(registry.store().len(), SCENARIO_SIZE);

        let a = registry.open();
        let b = registry.open();
        assert_ne!(a.id(), b.id());
        assert!(Arc::ptr_eq(a.store(), b.store()));

        a.materialize_next(10).await.unwrap();
        let report = b.materialize_next(10).await.unwrap().applied().unwrap();
        assert_eq!(report.cache_hits, 10);
    }

    #[tokio::test]
    async fn closed_sessions_are_gone() {
        let registry = SessionRegistry::new(Arc::new(RecordStore::default()), ExplorerConfig::default()).unwrap();
        let session = registry.open();
        assert_eq!(registry.len(), 1);

        assert!(registry.close(session.id()));
        assert!(!registry.close(session.id()));
        assert!(matches!(
            registry.get(session.id()),
            Err(ExplorerError::SessionNotFound(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ExplorerConfig::default().with_batch_size(0);
        let err = SessionRegistry::new(Arc::new(RecordStore::default()), config).unwrap_err();
        assert!(matches!(err, ExplorerError::Config(ConfigError::Invalid { .. })));
    }
}
