//! Explorer sessions for the financing explorer
//!
//! Ties the record store, filtering and chart builders together behind the
//! boundary operations a client drives:
//! - `apply_filters`: new facet selections, new epoch, map points and chips
//! - `materialize_next` / `materialize_up_to`: grow the card window
//! - `select_index` / `unselect`: single highlighted card
//! - `cards` and the dashboard bundles for the current filters
//!
//! # Example
//!
//! ```rust,ignore
//! use cef_core::{ExplorerConfig, SessionRegistry};
//! use cef_filter::{Facet, FacetSelections};
//! use cef_record::JsonFileSource;
//!
//! # async fn example() -> Result<(), cef_core::ExplorerError> {
//! let source = JsonFileSource::new("projects.json");
//! let registry = SessionRegistry::load(&source, ExplorerConfig::default()).await?;
//! let session = registry.open();
//!
//! session
//!     .apply_filters(&FacetSelections::new().with(Facet::Province, ["ON"]))
//!     .await?;
//! session.materialize_batch().await?;
//! session.select_index(35).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod coalesce;
pub mod config;
pub mod epoch;
pub mod error;
pub mod materializer;
pub mod registry;
pub mod selection;
pub mod session;

// Re-exports for convenience
pub use cache::{ArtifactCache, CacheStats};
pub use coalesce::Coalescer;
pub use config::{ConfigError, ExplorerConfig, PaginationMode};
pub use epoch::EpochCounter;
pub use error::ExplorerError;
pub use materializer::{
    build_batch, ApplyOutcome, BatchOutcome, BatchPlan, BatchReport, Materializer, WindowState,
};
pub use registry::{SessionId, SessionRegistry};
pub use selection::{Pagination, Position, Selection};
pub use session::{
    CardView, ExplorerSession, FilterApplied, SelectOutcome, SelectReport, SessionSnapshot,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving explorer sessions
    pub use crate::{
        ApplyOutcome, BatchReport, ExplorerConfig, ExplorerSession, SelectOutcome,
        SessionRegistry, WindowState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
