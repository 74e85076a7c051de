//! Filtering engine
//!
//! [`FilterEngine`] is the seam for alternative strategies (an inverted index
//! per facet would slot in here). [`ScanEngine`] is the default: one pass
//! over the store in position order.

use crate::predicate::FilterPredicate;
use cef_record::{ProjectRecord, RecordStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Tag of one filter state; strictly increasing within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    /// Initial epoch (the unfiltered state at session start)
    pub const ZERO: Epoch = Epoch(0);

    /// Create from raw value
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Following epoch
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch#{}", self.0)
    }
}

/// Strategy for selecting matching store positions
pub trait FilterEngine: Send + Sync {
    /// Positions (ascending) of records among `candidates` that satisfy `predicate`
    fn select(
        &self,
        store: &RecordStore,
        candidates: &mut dyn Iterator<Item = usize>,
        predicate: &FilterPredicate,
    ) -> Vec<usize>;

    /// Engine name for logs
    fn name(&self) -> &'static str;
}

/// Linear scan, O(n) per filter change
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanEngine;

impl FilterEngine for ScanEngine {
    fn select(
        &self,
        store: &RecordStore,
        candidates: &mut dyn Iterator<Item = usize>,
        predicate: &FilterPredicate,
    ) -> Vec<usize> {
        if predicate.is_unconstrained() {
            return candidates.filter(|pos| *pos < store.len()).collect();
        }
        candidates
            .filter(|pos| store.get(*pos).is_some_and(|r| predicate.matches(r)))
            .collect()
    }

    fn name(&self) -> &'static str {
        "scan"
    }
}

/// Ordered subset of the store passing one predicate
#[derive(Debug, Clone)]
pub struct FilteredResult {
    epoch: Epoch,
    store: Arc<RecordStore>,
    predicate: FilterPredicate,
    positions: Arc<[usize]>,
}

impl FilteredResult {
    /// Run `engine` over the whole store
    #[must_use]
    pub fn compute(
        engine: &dyn FilterEngine,
        store: Arc<RecordStore>,
        predicate: FilterPredicate,
        epoch: Epoch,
    ) -> Self {
        let positions = engine.select(&store, &mut (0..store.len()), &predicate);
        tracing::debug!(
            engine = engine.name(),
            %epoch,
            matched = positions.len(),
            total = store.len(),
            "Filter computed"
        );
        Self {
            epoch,
            store,
            predicate,
            positions: positions.into(),
        }
    }

    /// Unfiltered view of the whole store
    #[must_use]
    pub fn unfiltered(store: Arc<RecordStore>, epoch: Epoch) -> Self {
        Self::compute(&ScanEngine, store, FilterPredicate::any(), epoch)
    }

    /// Apply `predicate` again over this subset only
    #[must_use]
    pub fn narrow(&self, engine: &dyn FilterEngine, predicate: FilterPredicate) -> Self {
        let positions = engine.select(&self.store, &mut self.positions.iter().copied(), &predicate);
        Self {
            epoch: self.epoch,
            store: Arc::clone(&self.store),
            predicate,
            positions: positions.into(),
        }
    }

    /// Same records under another epoch
    #[must_use]
    pub fn with_epoch(&self, epoch: Epoch) -> Self {
        Self {
            epoch,
            ..self.clone()
        }
    }

    /// Epoch this result was computed for
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Predicate this result was computed with
    #[inline]
    #[must_use]
    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    /// Backing store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Number of matching records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if nothing matched
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Record at filtered index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ProjectRecord> {
        self.positions.get(index).and_then(|pos| self.store.get(*pos))
    }

    /// Store positions in filtered order
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Matching records in filtered order
    pub fn iter(&self) -> impl Iterator<Item = &ProjectRecord> + '_ {
        self.positions.iter().filter_map(|pos| self.store.get(*pos))
    }

    /// Records in `[start, end)` of the filtered order, clamped
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = &ProjectRecord> + '_ {
        let end = end.min(self.len());
        let start = start.min(end);
        self.positions[start..end]
            .iter()
            .filter_map(|pos| self.store.get(*pos))
    }
}
