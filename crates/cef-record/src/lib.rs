//! Community energy financing records
//!
//! The read-only data layer of the explorer.
//!
//! # Core Concepts
//!
//! - [`ProjectRecord`]: one financed project with its facets and list-valued details
//! - [`ListField<T>`]: a list column that tolerates sloppy upstream shapes
//! - [`RecordSource`]: where the snapshot comes from (queried once at startup)
//! - [`RecordStore`]: the immutable, privacy-filtered snapshot shared by every session
//!
//! # Example
//!
//! ```rust,ignore
//! use cef_record::{JsonFileSource, RecordStore, Visibility};
//!
//! let source = JsonFileSource::new("data/projects.json");
//! let store = RecordStore::load(&source, Visibility::PublicOnly).await?;
//! println!("{} projects loaded", store.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod error;
pub mod field;
pub mod lenient;
pub mod record;
pub mod source;
pub mod store;

// Re-exports
pub use error::{FieldError, StoreError};
pub use field::ListField;
pub use record::{
    CapitalMixEntry, DebtEntry, FinancingMechanism, JobEntry, Owner, ProjectRecord, RecordId,
    INDIGENOUS_OWNERSHIP_ORDER, PROJECT_SCALE_ORDER,
};
pub use source::{InMemorySource, JsonFileSource, RecordSource};
pub use store::{RecordStore, Visibility};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
