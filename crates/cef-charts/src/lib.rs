//! Chart and indicator builders for the financing explorer
//!
//! Pure functions from a set of project records to chart descriptions.
//!
//! # Overview
//!
//! - **Card artifacts**: per-record ownership and capital mix bars, built by
//!   an [`ArtifactBuilder`] and cached by record id
//! - **Explorer**: map points and project card display data
//! - **Dashboards**: overview, capital, ownership and outcomes bundles
//!
//! Every builder returns [`Chart::NoData`] rather than an empty figure when
//! its input has nothing to show.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod artifact;
pub mod capital;
pub mod chart;
pub mod explorer;
pub mod outcomes;
pub mod overview;
pub mod ownership;

// Re-exports
pub use artifact::{
    capital_mix_bar, ownership_bar, ArtifactBuilder, ArtifactError, CapitalMixBar, CapitalSegment,
    CardArtifactBuilder, CardArtifacts, CardWarning, OwnershipBar, OwnershipSegment,
};
pub use capital::{capital_charts, CapitalCharts, Indicators};
pub use chart::{Chart, ChartBody};
pub use explorer::{format_thousands, map_points, project_card, MapPoint, ProjectCard};
pub use outcomes::{outcome_charts, OutcomeCharts};
pub use overview::{overview, Overview, Summary};
pub use ownership::{ownership_charts, OwnershipCharts};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
