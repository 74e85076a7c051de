//! Facet filtering for the financing explorer
//!
//! # Overview
//!
//! - **FacetSelections**: sparse client input, five optional value lists
//! - **normalize**: canonical [`FilterPredicate`] plus [`FilterChip`]s
//! - **FilterEngine**: pluggable selection strategy ([`ScanEngine`] by default)
//! - **FilteredResult**: ordered, epoch-tagged subset of the record store
//!
//! # Example
//!
//! ```rust,ignore
//! use cef_filter::{normalize, Epoch, Facet, FacetSelections, FilteredResult, ScanEngine};
//!
//! let selections = FacetSelections::new().with(Facet::Province, ["ON"]);
//! let normalized = normalize(&selections);
//! let result = FilteredResult::compute(&ScanEngine, store, normalized.predicate, Epoch::new(1));
//! assert!(result.iter().all(|r| r.province.as_deref() == Some("ON")));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod engine;
pub mod facet;
pub mod predicate;

// Re-exports
pub use engine::{Epoch, FilterEngine, FilteredResult, ScanEngine};
pub use facet::{Facet, FacetSelections};
pub use predicate::{
    normalize, normalize_with_universe, remove_chip, FacetUniverse, FilterChip, FilterPredicate,
    NormalizedFilter,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for filtering
    pub use crate::{
        normalize, Epoch, Facet, FacetSelections, FilterChip, FilterEngine, FilterPredicate,
        FilteredResult, ScanEngine,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
