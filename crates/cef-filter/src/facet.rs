//! Facets and raw facet selections
//!
//! A [`FacetSelections`] is what the client sends: five optional lists of
//! chosen values. It is sparse and unnormalized; see [`crate::normalize`].

use cef_record::ProjectRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One filterable dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Province,
    ProjectType,
    Stage,
    IndigenousOwnership,
    ProjectScale,
}

impl Facet {
    /// Every facet, in chip order
    pub const ALL: [Facet; 5] = [
        Facet::Province,
        Facet::ProjectType,
        Facet::Stage,
        Facet::IndigenousOwnership,
        Facet::ProjectScale,
    ];

    /// Chip label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Province => "Province",
            Self::ProjectType => "Project Type",
            Self::Stage => "Stage",
            Self::IndigenousOwnership => "Indigenous",
            Self::ProjectScale => "Scale",
        }
    }

    /// Column name in the record table
    #[inline]
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::ProjectType => "project_type",
            Self::Stage => "stage",
            Self::IndigenousOwnership => "indigenous_ownership",
            Self::ProjectScale => "project_scale",
        }
    }

    /// Values a record carries for this facet
    ///
    /// `project_type` is multi-valued; the rest carry zero or one value.
    #[must_use]
    pub fn values_of(self, record: &ProjectRecord) -> Vec<&str> {
        fn single(v: &Option<String>) -> Vec<&str> {
            v.as_deref().into_iter().collect()
        }

        match self {
            Self::Province => single(&record.province),
            Self::ProjectType => record.project_type.iter().map(String::as_str).collect(),
            Self::Stage => single(&record.stage),
            Self::IndigenousOwnership => single(&record.indigenous_ownership),
            Self::ProjectScale => single(&record.project_scale),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Raw facet selections from the client
///
/// An absent list and an empty list mean the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetSelections {
    pub province: Option<Vec<String>>,
    pub project_type: Option<Vec<String>>,
    pub stage: Option<Vec<String>>,
    pub indigenous_ownership: Option<Vec<String>>,
    pub project_scale: Option<Vec<String>>,
}

impl FacetSelections {
    /// No selections
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected values for a facet (empty when absent)
    #[must_use]
    pub fn get(&self, facet: Facet) -> &[String] {
        self.slot(facet).as_deref().unwrap_or(&[])
    }

    /// Replace the selection for a facet
    pub fn set<I, S>(&mut self, facet: Facet, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.slot_mut(facet) = Some(values.into_iter().map(Into::into).collect());
    }

    /// Builder form of [`FacetSelections::set`]
    #[must_use]
    pub fn with<I, S>(mut self, facet: Facet, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(facet, values);
        self
    }

    /// Clear the selection for a facet
    pub fn clear(&mut self, facet: Facet) {
        *self.slot_mut(facet) = None;
    }

    /// Check whether every facet is empty or absent
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        Facet::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    fn slot(&self, facet: Facet) -> &Option<Vec<String>> {
        match facet {
            Facet::Province => &self.province,
            Facet::ProjectType => &self.project_type,
            Facet::Stage => &self.stage,
            Facet::IndigenousOwnership => &self.indigenous_ownership,
            Facet::ProjectScale => &self.project_scale,
        }
    }

    fn slot_mut(&mut self, facet: Facet) -> &mut Option<Vec<String>> {
        match facet {
            Facet::Province => &mut self.province,
            Facet::ProjectType => &mut self.project_type,
            Facet::Stage => &mut self.stage,
            Facet::IndigenousOwnership => &mut self.indigenous_ownership,
            Facet::ProjectScale => &mut self.project_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_read_the_same() {
        let absent = FacetSelections::new();
        let empty = FacetSelections::new().with(Facet::Province, Vec::<String>::new());
        assert_eq!(absent.get(Facet::Province), empty.get(Facet::Province));
        assert!(empty.is_unconstrained());
    }

    #[test]
    fn project_type_is_multi_valued() {
        let record = ProjectRecord::new("a").with_project_types(["Solar", "Wind"]);
        assert_eq!(Facet::ProjectType.values_of(&record), vec!["Solar", "Wind"]);
        assert!(Facet::Province.values_of(&record).is_empty());
    }

    #[test]
    fn deserializes_sparse_json() {
        let selections: FacetSelections =
            serde_json::from_str(r#"{"province": ["ON"], "stage": null}"#).unwrap();
        assert_eq!(selections.get(Facet::Province), ["ON".to_string()]);
        assert!(selections.get(Facet::Stage).is_empty());
    }
}
