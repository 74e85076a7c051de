//! Immutable record store
//!
//! Built once from a [`RecordSource`] and shared behind an `Arc` by every
//! session. Positions are stable for the lifetime of the store; everything
//! downstream (filtered results, materializer slots, selections) refers to
//! records by position.

use crate::error::StoreError;
use crate::record::{ProjectRecord, RecordId};
use crate::source::RecordSource;
use std::collections::HashMap;
use std::sync::Arc;

/// Which records a store exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Drop records whose `anonymous_status` is `"anon"`
    #[default]
    PublicOnly,
    /// Keep every record
    All,
}

/// Immutable snapshot of project records
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<ProjectRecord>,
    index: HashMap<RecordId, usize>,
}

impl RecordStore {
    /// Build a store from rows
    ///
    /// # Errors
    /// Returns [`StoreError::DuplicateRecordId`] if two visible rows share an id
    pub fn from_records(
        records: Vec<ProjectRecord>,
        visibility: Visibility,
    ) -> Result<Self, StoreError> {
        let records: Vec<_> = match visibility {
            Visibility::PublicOnly => records.into_iter().filter(|r| !r.is_private()).collect(),
            Visibility::All => records,
        };

        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if index.insert(record.record_id.clone(), pos).is_some() {
                return Err(StoreError::DuplicateRecordId(record.record_id.clone()));
            }
        }

        Ok(Self { records, index })
    }

    /// Fetch from a source and build the shared store
    ///
    /// # Errors
    /// Propagates source errors and duplicate ids
    pub async fn load<S>(source: &S, visibility: Visibility) -> Result<Arc<Self>, StoreError>
    where
        S: RecordSource + ?Sized,
    {
        let origin = source.describe();
        let rows = source.fetch().await.map_err(|e| {
            tracing::error!(%origin, error = %e, "Failed to fetch records");
            e
        })?;
        let fetched = rows.len();

        let store = Self::from_records(rows, visibility)?;
        let malformed = store
            .iter()
            .filter(|r| r.owners.is_malformed() || r.capital_mix.is_malformed())
            .count();

        tracing::info!(
            %origin,
            fetched,
            visible = store.len(),
            malformed,
            "Record store loaded"
        );

        Ok(Arc::new(store))
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at position
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&ProjectRecord> {
        self.records.get(pos)
    }

    /// Record by identifier
    #[must_use]
    pub fn by_id(&self, id: &RecordId) -> Option<&ProjectRecord> {
        self.position_of(id).and_then(|pos| self.get(pos))
    }

    /// Position of an identifier
    #[inline]
    #[must_use]
    pub fn position_of(&self, id: &RecordId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Iterate records in position order
    pub fn iter(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.records.iter()
    }

    /// All records as a slice
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    /// Sum of total cost over all records
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.records.iter().map(ProjectRecord::cost).sum()
    }
}
