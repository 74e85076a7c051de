//! Explorer session: the boundary operations for one interaction stream
//!
//! Filter changes and batches on a session are serialized. Session state sits
//! behind a short-held lock; batches additionally take an async gate held
//! across plan → build → apply. A filter change does not take the gate, so it
//! supersedes an in-flight batch, whose outcome is then discarded as stale.

use crate::cache::ArtifactCache;
use crate::coalesce::Coalescer;
use crate::config::ExplorerConfig;
use crate::epoch::EpochCounter;
use crate::error::ExplorerError;
use crate::materializer::{build_batch, ApplyOutcome, BatchPlan, BatchReport, Materializer, WindowState};
use crate::registry::SessionId;
use crate::selection::{Pagination, Position, Selection};
use cef_charts::{
    map_points, project_card, ArtifactBuilder, CapitalCharts, CardArtifactBuilder, CardArtifacts,
    MapPoint, OutcomeCharts, Overview, OwnershipCharts, ProjectCard,
};
use cef_filter::{
    normalize_with_universe, Epoch, Facet, FacetSelections, FacetUniverse, FilterChip,
    FilterEngine, FilteredResult, ScanEngine,
};
use cef_record::{ProjectRecord, RecordStore};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

/// Reply to a filter change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterApplied {
    pub epoch: Epoch,
    pub filtered_count: usize,
    /// Every filtered record with coordinates, independent of the window
    pub map_points: Vec<MapPoint>,
    pub chips: Vec<FilterChip>,
}

/// Reply to a card selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectReport {
    /// Highlighted index after the toggle
    pub highlighted: Option<usize>,
    /// Materialized prefix length after any jump
    pub materialized_now: usize,
    pub position: Position,
}

/// Selection result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectOutcome {
    Selected(SelectReport),
    /// Index past the filtered result; prior selection kept
    OutOfRange { index: usize, filtered_count: usize },
    /// Page/offset pair that names no card
    InvalidPosition { page: usize, offset: usize },
    /// Filters changed while the selection was being materialized
    Stale { epoch: Epoch, current: Epoch },
}

/// One card in the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub index: usize,
    pub position: Position,
    pub card: ProjectCard,
    /// Absent when not materialized or when derivation failed
    pub artifacts: Option<Arc<CardArtifacts>>,
    pub highlighted: bool,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub epoch: Epoch,
    pub filtered_count: usize,
    pub materialized: usize,
    pub state: WindowState,
    pub chips: Vec<FilterChip>,
    pub highlighted: Option<usize>,
}

#[derive(Debug)]
struct SessionState {
    window: Materializer,
    chips: Vec<FilterChip>,
    selection: Selection,
}

/// One user's explorer state over a shared record store
pub struct ExplorerSession {
    id: SessionId,
    store: Arc<RecordStore>,
    universe: FacetUniverse,
    engine: Arc<dyn FilterEngine>,
    builder: Arc<dyn ArtifactBuilder>,
    cache: ArtifactCache,
    batch_size: usize,
    pagination: Pagination,
    debounce: Duration,
    epochs: EpochCounter,
    state: Mutex<SessionState>,
    batch_gate: tokio::sync::Mutex<()>,
}

impl fmt::Debug for ExplorerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerSession")
            .field("id", &self.id)
            .field("engine", &self.engine.name())
            .field("builder", &self.builder.name())
            .field("epoch", &self.epochs.current())
            .finish_non_exhaustive()
    }
}

impl ExplorerSession {
    /// Session over the whole store, nothing materialized
    #[must_use]
    pub fn new(
        id: SessionId,
        store: Arc<RecordStore>,
        cache: ArtifactCache,
        config: &ExplorerConfig,
    ) -> Self {
        let universe = FacetUniverse::from_store(&store);
        let initial = Arc::new(FilteredResult::unfiltered(Arc::clone(&store), Epoch::ZERO));
        Self {
            id,
            store,
            universe,
            engine: Arc::new(ScanEngine),
            builder: Arc::new(CardArtifactBuilder),
            cache,
            batch_size: config.batch_size.max(1),
            pagination: config.pagination(),
            debounce: config.debounce(),
            epochs: EpochCounter::new(),
            state: Mutex::new(SessionState {
                window: Materializer::new(initial),
                chips: Vec::new(),
                selection: Selection::default(),
            }),
            batch_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// With a different filter engine
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn FilterEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// With a different artifact builder
    #[must_use]
    pub fn with_builder(mut self, builder: Arc<dyn ArtifactBuilder>) -> Self {
        self.builder = builder;
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Backing store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Pagination scheme for positions
    #[inline]
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Current filtered result
    #[must_use]
    pub fn current_result(&self) -> Arc<FilteredResult> {
        Arc::clone(self.state.lock().window.result())
    }

    /// Point-in-time view
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            id: self.id,
            epoch: state.window.epoch(),
            filtered_count: state.window.result().len(),
            materialized: state.window.materialized_count(),
            state: state.window.state(),
            chips: state.chips.clone(),
            highlighted: state.selection.highlighted(),
        }
    }

    /// Apply new facet selections
    ///
    /// Filters on a blocking worker, then installs the result under a new
    /// epoch: the window resets and the selection clears. Stale when a later
    /// filter change was issued meanwhile.
    ///
    /// # Errors
    /// [`ExplorerError::Worker`] if the filter worker panics
    pub async fn apply_filters(
        &self,
        selections: &FacetSelections,
    ) -> Result<ApplyOutcome<FilterApplied>, ExplorerError> {
        let normalized = normalize_with_universe(selections, &self.universe);
        let epoch = self.epochs.advance();

        let store = Arc::clone(&self.store);
        let engine = Arc::clone(&self.engine);
        let predicate = normalized.predicate;
        let computed = tokio::task::spawn_blocking(move || {
            FilteredResult::compute(engine.as_ref(), store, predicate, epoch)
        })
        .await;
        let result = match computed {
            Ok(result) => Arc::new(result),
            Err(e) => {
                // The filters never changed, so the window lives on under this epoch
                let mut state = self.state.lock();
                if self.epochs.is_current(epoch) {
                    state.window.retag(epoch);
                }
                tracing::error!(session = %self.id, %epoch, error = %e, "Filter worker failed");
                return Err(ExplorerError::worker(&e));
            }
        };

        {
            let mut state = self.state.lock();
            let current = self.epochs.current();
            if current != epoch {
                tracing::debug!(%epoch, %current, "Discarding superseded filter result");
                return Ok(ApplyOutcome::Stale { epoch, current });
            }
            state.window.reset(Arc::clone(&result));
            state.chips.clone_from(&normalized.chips);
            state.selection.clear();
        }

        tracing::info!(
            session = %self.id,
            %epoch,
            filtered = result.len(),
            chips = normalized.chips.len(),
            "Filters applied"
        );

        Ok(ApplyOutcome::Applied(FilterApplied {
            epoch,
            filtered_count: result.len(),
            map_points: map_points(result.iter()),
            chips: normalized.chips,
        }))
    }

    /// Materialize the next `n` records
    ///
    /// Stale while a filter change is pending.
    ///
    /// # Errors
    /// [`ExplorerError::Worker`] if the build worker panics
    pub async fn materialize_next(&self, n: usize) -> Result<ApplyOutcome<BatchReport>, ExplorerError> {
        let _gate = self.batch_gate.lock().await;
        let plan = self.state.lock().window.plan_next(n);
        self.run_batch(plan).await
    }

    /// Materialize the configured batch size
    ///
    /// # Errors
    /// As [`Self::materialize_next`]
    pub async fn materialize_batch(&self) -> Result<ApplyOutcome<BatchReport>, ExplorerError> {
        self.materialize_next(self.batch_size).await
    }

    /// Make sure `index` is materialized
    ///
    /// No-op when already inside the prefix. Otherwise one batch reaching at
    /// least `index`, rounded up to the batch size and capped by what remains.
    ///
    /// # Errors
    /// [`ExplorerError::Worker`] if the build worker panics
    pub async fn materialize_up_to(&self, index: usize) -> Result<ApplyOutcome<BatchReport>, ExplorerError> {
        let _gate = self.batch_gate.lock().await;
        let plan = self.state.lock().window.plan_jump(index, self.batch_size);
        self.run_batch(plan).await
    }

    /// Stale when a filter change was issued after `epoch`
    fn superseded<T>(&self, epoch: Epoch) -> Option<ApplyOutcome<T>> {
        let current = self.epochs.current();
        (current != epoch).then_some(ApplyOutcome::Stale { epoch, current })
    }

    async fn run_batch(&self, plan: BatchPlan) -> Result<ApplyOutcome<BatchReport>, ExplorerError> {
        if let Some(stale) = self.superseded(plan.epoch()) {
            tracing::debug!(session = %self.id, epoch = %plan.epoch(), "Batch skipped, filters pending");
            return Ok(stale);
        }

        let outcome = build_batch(&plan, Arc::clone(&self.builder), &self.cache).await?;
        let applied = {
            let mut state = self.state.lock();
            match self.superseded(outcome.epoch()) {
                Some(stale) => stale,
                None => state.window.apply(outcome),
            }
        };
        if let ApplyOutcome::Applied(report) = &applied {
            tracing::debug!(
                session = %self.id,
                built = report.built,
                remaining = report.remaining,
                failed = report.failed,
                "Batch applied"
            );
        }
        Ok(applied)
    }

    /// Toggle the highlight on the card at global `index`
    ///
    /// Materializes up to `index` first. Out-of-range indices change nothing.
    /// Stale while a filter change is pending, since `index` would refer to
    /// the result being replaced.
    ///
    /// # Errors
    /// [`ExplorerError::Worker`] if the build worker panics
    pub async fn select_index(&self, index: usize) -> Result<SelectOutcome, ExplorerError> {
        let (epoch, filtered_count) = {
            let state = self.state.lock();
            (state.window.epoch(), state.window.result().len())
        };
        let current = self.epochs.current();
        if current != epoch {
            return Ok(SelectOutcome::Stale { epoch, current });
        }
        if index >= filtered_count {
            tracing::debug!(index, filtered_count, "Selection out of range");
            return Ok(SelectOutcome::OutOfRange { index, filtered_count });
        }

        if let ApplyOutcome::Stale { current, .. } = self.materialize_up_to(index).await? {
            return Ok(SelectOutcome::Stale { epoch, current });
        }

        let mut state = self.state.lock();
        let current = self.epochs.current();
        if current != epoch || state.window.epoch() != epoch {
            return Ok(SelectOutcome::Stale { epoch, current });
        }
        let highlighted = state.selection.toggle(index);
        Ok(SelectOutcome::Selected(SelectReport {
            highlighted,
            materialized_now: state.window.materialized_count(),
            position: self.pagination.position(index),
        }))
    }

    /// Select by page-relative position
    ///
    /// # Errors
    /// As [`Self::select_index`]
    pub async fn select_card(&self, page: usize, offset: usize) -> Result<SelectOutcome, ExplorerError> {
        match self.pagination.global_index(page, offset) {
            Some(index) => self.select_index(index).await,
            None => Ok(SelectOutcome::InvalidPosition { page, offset }),
        }
    }

    /// Clear the highlight
    pub fn unselect(&self) {
        self.state.lock().selection.clear();
    }

    /// Highlighted index
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.state.lock().selection.highlighted()
    }

    /// Map overlay for the highlighted card
    #[must_use]
    pub fn selected_points(&self) -> Vec<MapPoint> {
        let state = self.state.lock();
        state
            .selection
            .highlighted()
            .and_then(|index| state.window.result().get(index))
            .map(|record| map_points(std::iter::once(record)))
            .unwrap_or_default()
    }

    /// Cards in `range` of the filtered order, clamped
    #[must_use]
    pub fn cards(&self, range: Range<usize>) -> Vec<CardView> {
        let state = self.state.lock();
        let result = state.window.result();
        let end = range.end.min(result.len());
        let highlighted = state.selection.highlighted();

        (range.start.min(end)..end)
            .filter_map(|index| {
                let record = result.get(index)?;
                Some(CardView {
                    index,
                    position: self.pagination.position(index),
                    card: project_card(record),
                    artifacts: state.window.artifact(index).cloned(),
                    highlighted: highlighted == Some(index),
                })
            })
            .collect()
    }

    /// Capital dashboard for the current filters
    ///
    /// The sankey ignores the project type filter for its source columns and
    /// only trims its last column to the selected types.
    #[must_use]
    pub fn capital_charts(&self) -> CapitalCharts {
        let result = self.current_result();
        let records: Vec<&ProjectRecord> = result.iter().collect();

        let predicate = result.predicate();
        let sankey_result = FilteredResult::compute(
            self.engine.as_ref(),
            Arc::clone(&self.store),
            predicate.without(Facet::ProjectType),
            result.epoch(),
        );
        let sankey_records: Vec<&ProjectRecord> = sankey_result.iter().collect();

        cef_charts::capital_charts(
            &records,
            &sankey_records,
            predicate.constraint(Facet::ProjectType),
        )
    }

    /// Ownership dashboard for the current filters
    #[must_use]
    pub fn ownership_charts(&self) -> OwnershipCharts {
        let result = self.current_result();
        let records: Vec<&ProjectRecord> = result.iter().collect();
        cef_charts::ownership_charts(&records)
    }

    /// Outcomes dashboard for the current filters
    #[must_use]
    pub fn outcome_charts(&self) -> OutcomeCharts {
        let result = self.current_result();
        let records: Vec<&ProjectRecord> = result.iter().collect();
        cef_charts::outcome_charts(&records)
    }

    /// Landing overview over the whole store
    #[must_use]
    pub fn overview(&self) -> Overview {
        let records: Vec<&ProjectRecord> = self.store.iter().collect();
        cef_charts::overview(&records)
    }

    /// Coalescer that applies only settled selections to this session
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn filter_coalescer(self: &Arc<Self>) -> Coalescer<FacetSelections> {
        let session = Arc::clone(self);
        Coalescer::spawn(self.debounce, move |selections: FacetSelections| {
            let session = Arc::clone(&session);
            async move {
                if let Err(e) = session.apply_filters(&selections).await {
                    tracing::error!(session = %session.id, error = %e, "Coalesced filter change failed");
                }
            }
        })
    }
}
