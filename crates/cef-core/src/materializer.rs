//! Batch materializer
//!
//! Tracks which prefix of a [`FilteredResult`] has card artifacts built and
//! grows that prefix in batches.
//!
//! # States
//!
//! `Empty` → `Partial` → `Complete`. [`Materializer::reset`] returns to
//! `Empty` from anywhere.
//!
//! # Batches
//!
//! A batch runs in three steps so the session lock is never held while
//! building:
//!
//! 1. **plan** snapshots `(epoch, start, end)` under the lock
//! 2. **build** ([`build_batch`]) runs on a blocking worker, consulting the
//!    artifact cache first
//! 3. **apply** re-checks the epoch and `start == materialized`; anything
//!    else is stale and dropped
//!
//! The materialized prefix is always `[0, materialized_count)`.

use crate::cache::ArtifactCache;
use crate::error::ExplorerError;
use cef_charts::{ArtifactBuilder, CardArtifacts};
use cef_filter::{Epoch, FilteredResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Window state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    /// Nothing materialized yet
    Empty,
    /// Some but not all records materialized
    Partial,
    /// Every record materialized
    Complete,
}

/// Result of a boundary operation that may have been superseded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome<T> {
    /// Applied to the current filtered result
    Applied(T),
    /// A filter change or an earlier batch got there first
    Stale { epoch: Epoch, current: Epoch },
}

impl<T> ApplyOutcome<T> {
    /// Applied value, if any
    #[inline]
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Stale { .. } => None,
        }
    }

    /// Check whether the outcome was discarded
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// What one batch did to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Epoch of the filtered result the batch was applied to
    pub epoch: Epoch,
    /// Records added to the materialized prefix
    pub built: usize,
    /// Records still outside the prefix
    pub remaining: usize,
    /// Prefix length after the batch
    pub materialized: usize,
    pub state: WindowState,
    /// Of `built`, served from the artifact cache
    pub cache_hits: usize,
    /// Of `built`, whose artifacts could not be derived
    pub failed: usize,
}

/// Snapshot of the range a batch will cover
#[derive(Debug, Clone)]
pub struct BatchPlan {
    result: Arc<FilteredResult>,
    start: usize,
    end: usize,
}

impl BatchPlan {
    /// Epoch of the planned result
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.result.epoch()
    }

    /// First filtered index
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last filtered index
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of records in the plan
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check whether the plan covers nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Artifacts built for one plan, not yet applied
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    epoch: Epoch,
    start: usize,
    artifacts: Vec<Option<Arc<CardArtifacts>>>,
    cache_hits: usize,
    failed: usize,
}

impl BatchOutcome {
    /// Outcome of an empty plan
    #[must_use]
    pub fn empty(plan: &BatchPlan) -> Self {
        Self {
            epoch: plan.epoch(),
            start: plan.start,
            artifacts: Vec::new(),
            cache_hits: 0,
            failed: 0,
        }
    }

    /// Epoch the outcome was built for
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Number of records covered
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Check whether the outcome covers nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Materialized window over one filtered result
#[derive(Debug, Clone)]
pub struct Materializer {
    result: Arc<FilteredResult>,
    artifacts: Vec<Option<Arc<CardArtifacts>>>,
    state: WindowState,
}

impl Materializer {
    /// Empty window over `result`
    #[must_use]
    pub fn new(result: Arc<FilteredResult>) -> Self {
        Self {
            result,
            artifacts: Vec::new(),
            state: WindowState::Empty,
        }
    }

    /// Drop the window and start over on a new result
    pub fn reset(&mut self, result: Arc<FilteredResult>) {
        self.result = result;
        self.artifacts.clear();
        self.state = WindowState::Empty;
    }

    /// Carry the window over to `epoch` without touching the prefix
    ///
    /// For a filter change that was issued but never produced a result.
    pub fn retag(&mut self, epoch: Epoch) {
        self.result = Arc::new(self.result.with_epoch(epoch));
    }

    /// Filtered result the window covers
    #[inline]
    #[must_use]
    pub fn result(&self) -> &Arc<FilteredResult> {
        &self.result
    }

    /// Epoch of the current result
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.result.epoch()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Length of the materialized prefix
    #[inline]
    #[must_use]
    pub fn materialized_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Records not yet materialized
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.result.len() - self.artifacts.len()
    }

    /// Check whether `index` is inside the prefix
    #[inline]
    #[must_use]
    pub fn is_materialized(&self, index: usize) -> bool {
        index < self.artifacts.len()
    }

    /// Artifacts at `index`; `None` when outside the prefix or failed
    #[must_use]
    pub fn artifact(&self, index: usize) -> Option<&Arc<CardArtifacts>> {
        self.artifacts.get(index).and_then(Option::as_ref)
    }

    /// Plan the next `n` records (fewer if fewer remain)
    #[must_use]
    pub fn plan_next(&self, n: usize) -> BatchPlan {
        let start = self.materialized_count();
        BatchPlan {
            result: Arc::clone(&self.result),
            start,
            end: start + n.min(self.remaining()),
        }
    }

    /// Plan the batch that brings `target` into the prefix
    ///
    /// Empty when `target` is already materialized. Otherwise covers at least
    /// up to `target`, rounded up to whole batches and capped by what remains.
    /// Targets past the result complete the window.
    #[must_use]
    pub fn plan_jump(&self, target: usize, batch_size: usize) -> BatchPlan {
        let materialized = self.materialized_count();
        let target = target.min(self.result.len().saturating_sub(1));
        if target < materialized || self.result.is_empty() {
            return self.plan_next(0);
        }
        let needed = target - materialized + 1;
        let batch_size = batch_size.max(1);
        self.plan_next(needed.div_ceil(batch_size).saturating_mul(batch_size))
    }

    /// Append a built batch to the prefix
    ///
    /// Stale when the result changed or the prefix moved since planning.
    pub fn apply(&mut self, outcome: BatchOutcome) -> ApplyOutcome<BatchReport> {
        let current = self.epoch();
        if outcome.epoch != current || outcome.start != self.materialized_count() {
            tracing::warn!(
                epoch = %outcome.epoch,
                %current,
                start = outcome.start,
                materialized = self.materialized_count(),
                "Discarding stale batch"
            );
            return ApplyOutcome::Stale {
                epoch: outcome.epoch,
                current,
            };
        }

        let built = outcome
            .artifacts
            .len()
            .min(self.remaining());
        self.artifacts.extend(outcome.artifacts.into_iter().take(built));

        self.state = if self.remaining() == 0 {
            WindowState::Complete
        } else if self.artifacts.is_empty() {
            WindowState::Empty
        } else {
            WindowState::Partial
        };

        ApplyOutcome::Applied(BatchReport {
            epoch: current,
            built,
            remaining: self.remaining(),
            materialized: self.materialized_count(),
            state: self.state,
            cache_hits: outcome.cache_hits,
            failed: outcome.failed,
        })
    }
}

/// Build artifacts for a plan
///
/// Cached artifacts are reused; the rest are derived on a blocking worker.
/// A record whose derivation fails is logged and left absent. Successful
/// builds are cached, failures are not.
///
/// # Errors
/// [`ExplorerError::Worker`] if the blocking worker panics
pub async fn build_batch(
    plan: &BatchPlan,
    builder: Arc<dyn ArtifactBuilder>,
    cache: &ArtifactCache,
) -> Result<BatchOutcome, ExplorerError> {
    if plan.is_empty() {
        return Ok(BatchOutcome::empty(plan));
    }

    let mut artifacts: Vec<Option<Arc<CardArtifacts>>> = Vec::with_capacity(plan.len());
    let mut misses = Vec::new();
    for (index, record) in (plan.start..).zip(plan.result.range(plan.start, plan.end)) {
        let cached = cache.get(&record.record_id).await;
        if cached.is_none() {
            misses.push(index);
        }
        artifacts.push(cached);
    }
    let cache_hits = plan.len() - misses.len();

    tracing::debug!(
        epoch = %plan.epoch(),
        start = plan.start,
        end = plan.end,
        cache_hits,
        builder = builder.name(),
        "Building batch"
    );

    let result = Arc::clone(&plan.result);
    let built = tokio::task::spawn_blocking(move || {
        misses
            .into_iter()
            .filter_map(|index| {
                let record = result.get(index)?;
                Some((index, record.record_id.clone(), builder.build(record)))
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| ExplorerError::worker(&e))?;

    let mut failed = 0;
    for (index, record_id, outcome) in built {
        match outcome {
            Ok(card) => {
                let card = Arc::new(card);
                cache.insert(record_id, Arc::clone(&card)).await;
                artifacts[index - plan.start] = Some(card);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(record_id = %record_id, index, error = %e, "Card artifacts unavailable");
            }
        }
    }

    Ok(BatchOutcome {
        epoch: plan.epoch(),
        start: plan.start,
        artifacts,
        cache_hits,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cef_charts::CardArtifactBuilder;
    use cef_filter::{FilterPredicate, ScanEngine};
    use cef_test_utils::{malformed_record, store_of, synthetic_record};

    fn result_of(n: usize, epoch: u64) -> Arc<FilteredResult> {
        let store = store_of((0..n).map(synthetic_record).collect());
        Arc::new(FilteredResult::compute(
            &ScanEngine,
            store,
            FilterPredicate::any(),
            Epoch::new(epoch),
        ))
    }

    async fn extend(window: &mut Materializer, n: usize, cache: &ArtifactCache) -> BatchReport {
        let plan = window.plan_next(n);
        let outcome = build_batch(&plan, Arc::new(CardArtifactBuilder), cache)
            .await
            .unwrap();
        window.apply(outcome).applied().unwrap()
    }

    #[tokio::test]
    async fn extends_until_complete() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(45, 1));
        assert_eq!(window.state(), WindowState::Empty);

        let report = extend(&mut window, 20, &cache).await;
        assert_eq!((report.built, report.remaining), (20, 25));
        assert_eq!(report.state, WindowState::Partial);

        extend(&mut window, 20, &cache).await;
        let report = extend(&mut window, 20, &cache).await;
        assert_eq!((report.built, report.remaining), (5, 0));
        assert_eq!(report.state, WindowState::Complete);
        assert!(window.artifact(44).is_some());
    }

    #[tokio::test]
    async fn extend_zero_builds_nothing() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(10, 1));
        let report = extend(&mut window, 0, &cache).await;
        assert_eq!((report.built, report.remaining), (0, 10));
        assert_eq!(report.state, WindowState::Empty);
    }

    #[tokio::test]
    async fn empty_result_completes_immediately() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(0, 1));
        let report = extend(&mut window, 20, &cache).await;
        assert_eq!((report.built, report.remaining), (0, 0));
        assert_eq!(report.state, WindowState::Complete);
    }

    #[test]
    fn jump_rounds_up_to_batches() {
        let window = Materializer::new(result_of(40, 1));
        let plan = window.plan_jump(25, 20);
        assert_eq!((plan.start(), plan.end()), (0, 40));

        let plan = window.plan_jump(5, 20);
        assert_eq!(plan.len(), 20);

        let plan = window.plan_jump(100, 20);
        assert_eq!(plan.end(), 40);
    }

    #[tokio::test]
    async fn jump_past_end_completes_window() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(30, 1));
        extend(&mut window, 7, &cache).await;

        let plan = window.plan_jump(usize::MAX - 3, 20);
        assert_eq!((plan.start(), plan.end()), (7, 30));
        assert_eq!(window.plan_jump(usize::MAX, usize::MAX).end(), 30);
        assert!(Materializer::new(result_of(0, 1)).plan_jump(usize::MAX, 20).is_empty());
    }

    #[tokio::test]
    async fn jump_below_prefix_is_noop() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(40, 1));
        extend(&mut window, 20, &cache).await;
        assert!(window.plan_jump(19, 20).is_empty());
        assert_eq!(window.plan_jump(20, 20).len(), 20);
    }

    #[tokio::test]
    async fn stale_epoch_is_discarded() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(10, 1));
        let plan = window.plan_next(5);
        let outcome = build_batch(&plan, Arc::new(CardArtifactBuilder), &cache)
            .await
            .unwrap();

        window.reset(result_of(10, 2));
        assert!(window.apply(outcome).is_stale());
        assert_eq!(window.materialized_count(), 0);
    }

    #[tokio::test]
    async fn retag_keeps_prefix() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(10, 1));
        extend(&mut window, 4, &cache).await;

        window.retag(Epoch::new(2));
        let report = extend(&mut window, 4, &cache).await;
        assert_eq!(report.epoch, Epoch::new(2));
        assert_eq!(report.materialized, 8);
    }

    #[tokio::test]
    async fn overlapping_batch_is_discarded() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(10, 1));
        let first = window.plan_next(5);
        let second = window.plan_next(5);

        let a = build_batch(&first, Arc::new(CardArtifactBuilder), &cache).await.unwrap();
        let b = build_batch(&second, Arc::new(CardArtifactBuilder), &cache).await.unwrap();
        assert!(!window.apply(a).is_stale());
        assert!(window.apply(b).is_stale());
        assert_eq!(window.materialized_count(), 5);
    }

    #[tokio::test]
    async fn failed_record_is_absent_and_uncached() {
        let cache = ArtifactCache::default();
        let mut rows: Vec<_> = (0..3).map(synthetic_record).collect();
        rows[1] = malformed_record("broken");
        let result = Arc::new(FilteredResult::unfiltered(store_of(rows), Epoch::new(1)));
        let mut window = Materializer::new(result);

        let report = extend(&mut window, 3, &cache).await;
        assert_eq!((report.built, report.failed), (3, 1));
        assert!(window.is_materialized(1));
        assert!(window.artifact(1).is_none());
        assert!(window.artifact(2).is_some());
        assert!(cache.get(&"broken".into()).await.is_none());
    }

    #[tokio::test]
    async fn second_window_hits_cache() {
        let cache = ArtifactCache::default();
        let mut window = Materializer::new(result_of(10, 1));
        extend(&mut window, 10, &cache).await;

        window.reset(result_of(10, 2));
        let report = extend(&mut window, 10, &cache).await;
        assert_eq!(report.cache_hits, 10);
    }
}
