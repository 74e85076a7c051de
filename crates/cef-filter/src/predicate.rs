//! Filter normalization
//!
//! Turns raw [`FacetSelections`] into a canonical [`FilterPredicate`] and the
//! list of active [`FilterChip`]s.
//!
//! Canonical form:
//! - values are trimmed, blanks dropped, duplicates collapsed
//! - per-facet sets are ordered, so equal selections give equal predicates
//! - facets with nothing selected are absent (no constraint)

use crate::facet::{Facet, FacetSelections};
use cef_record::{ProjectRecord, RecordStore, PROJECT_SCALE_ORDER};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Conjunction over facets, disjunction within a facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterPredicate {
    constraints: BTreeMap<Facet, BTreeSet<String>>,
}

impl FilterPredicate {
    /// Predicate that accepts every record
    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Check whether no facet is constrained
    #[inline]
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Accepted values for a facet, if constrained
    #[inline]
    #[must_use]
    pub fn constraint(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.constraints.get(&facet)
    }

    /// Same predicate with one facet's constraint lifted
    #[must_use]
    pub fn without(&self, facet: Facet) -> Self {
        let mut constraints = self.constraints.clone();
        constraints.remove(&facet);
        Self { constraints }
    }

    /// Constrained facets in facet order
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.constraints.keys().copied()
    }

    /// Check whether a record satisfies every constraint
    ///
    /// A record without a value for a constrained facet never matches.
    #[must_use]
    pub fn matches(&self, record: &ProjectRecord) -> bool {
        self.constraints.iter().all(|(facet, accepted)| {
            facet
                .values_of(record)
                .into_iter()
                .any(|value| accepted.contains(value))
        })
    }
}

/// One active filter, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChip {
    pub facet: Facet,
    pub value: String,
    /// `"Province: ON"`
    pub label: String,
}

impl FilterChip {
    fn new(facet: Facet, value: &str) -> Self {
        Self {
            facet,
            value: value.to_string(),
            label: format!("{}: {}", facet.label(), value),
        }
    }
}

/// Output of normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedFilter {
    pub predicate: FilterPredicate,
    pub chips: Vec<FilterChip>,
}

/// Every known option per facet
///
/// Used to treat "everything selected" as "nothing selected".
#[derive(Debug, Clone, Default)]
pub struct FacetUniverse {
    options: BTreeMap<Facet, BTreeSet<String>>,
}

impl FacetUniverse {
    /// Empty universe (no facet has a known option list)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect distinct values per facet from a store
    ///
    /// Project scale always uses the fixed bucket list.
    #[must_use]
    pub fn from_store(store: &RecordStore) -> Self {
        let mut options: BTreeMap<Facet, BTreeSet<String>> = BTreeMap::new();
        for record in store.iter() {
            for facet in Facet::ALL {
                if facet == Facet::ProjectScale {
                    continue;
                }
                options
                    .entry(facet)
                    .or_default()
                    .extend(facet.values_of(record).into_iter().map(str::to_string));
            }
        }
        Self { options }.with(Facet::ProjectScale, PROJECT_SCALE_ORDER)
    }

    /// Set the option list for a facet
    #[must_use]
    pub fn with<I, S>(mut self, facet: Facet, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .insert(facet, values.into_iter().map(Into::into).collect());
        self
    }

    /// Known options for a facet
    #[inline]
    #[must_use]
    pub fn options(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.options.get(&facet)
    }
}

/// Normalize raw selections
#[must_use]
pub fn normalize(selections: &FacetSelections) -> NormalizedFilter {
    normalize_inner(selections, None)
}

/// Normalize, also dropping facets whose selection covers every known option
#[must_use]
pub fn normalize_with_universe(
    selections: &FacetSelections,
    universe: &FacetUniverse,
) -> NormalizedFilter {
    normalize_inner(selections, Some(universe))
}

fn normalize_inner(selections: &FacetSelections, universe: Option<&FacetUniverse>) -> NormalizedFilter {
    let mut constraints = BTreeMap::new();
    let mut chips = Vec::new();

    for facet in Facet::ALL {
        let values: IndexSet<&str> = selections
            .get(facet)
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();

        if values.is_empty() {
            continue;
        }

        let set: BTreeSet<String> = values.iter().map(|v| (*v).to_string()).collect();
        let covers_universe = universe
            .and_then(|u| u.options(facet))
            .is_some_and(|all| !all.is_empty() && all.is_subset(&set));
        if covers_universe {
            continue;
        }

        chips.extend(values.iter().map(|v| FilterChip::new(facet, v)));
        constraints.insert(facet, set);
    }

    NormalizedFilter {
        predicate: FilterPredicate { constraints },
        chips,
    }
}

/// Remove one value from a facet selection (chip close)
///
/// Removing a value that is not selected leaves the selections unchanged.
#[must_use]
pub fn remove_chip(selections: &FacetSelections, facet: Facet, value: &str) -> FacetSelections {
    let mut next = selections.clone();
    let target = value.trim();
    let remaining: Vec<String> = selections
        .get(facet)
        .iter()
        .filter(|v| v.trim() != target)
        .cloned()
        .collect();

    if remaining.len() != selections.get(facet).len() {
        next.set(facet, remaining);
    }
    next
}
