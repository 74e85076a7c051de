//! Project record model
//!
//! One row per financed project. Facet columns are optional: a record that
//! lacks a facet simply never matches a constraint on it.

use crate::field::ListField;
use crate::lenient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal project scale buckets, smallest first
pub const PROJECT_SCALE_ORDER: [&str; 6] = [
    "Micro (< $100K)",
    "Small ($100K-$1M)",
    "Medium ($1M-$5M)",
    "Large ($5M-$25M)",
    "Very Large ($25M-$100M)",
    "Mega (> $100M)",
];

/// Ordinal indigenous ownership categories, least owned first
pub const INDIGENOUS_OWNERSHIP_ORDER: [&str; 6] = [
    "Not sure",
    "No Indigenous ownership",
    "Minority Indigenous owned (1-49%)",
    "Half Indigenous owned (50%)",
    "Majority Indigenous owned (51-99%)",
    "Wholly Indigenous owned (100%)",
];

/// Stable record identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One ownership stake
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub owner_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub owner_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub owner_percent: f64,
}

/// One financing instrument in a project's capital mix
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapitalMixEntry {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub percent: f64,
}

/// Debt terms attached to a capital mix instrument
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DebtEntry {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub debt_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub debt_source: Option<String>,
    /// Free text such as `"5%"` or `"4-6"`
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub debt_interest: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub debt_repayment: Option<String>,
}

/// A financing mechanism the project used
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancingMechanism {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source: Option<String>,
}

/// Jobs reported for one project phase
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobEntry {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phase: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub full_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub part_time: Option<f64>,
}

/// One financed community energy project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub record_id: RecordId,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub community: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,

    // Facets
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub province_abbr: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub project_type: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub indigenous_ownership: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub project_scale: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub data_source: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub all_financing_mechanisms: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub anonymous_status: Option<String>,

    // Derived-artifact inputs
    #[serde(default)]
    pub owners: ListField<Owner>,
    #[serde(default)]
    pub capital_mix: ListField<CapitalMixEntry>,

    // Chart-only detail
    #[serde(default)]
    pub debt: ListField<DebtEntry>,
    #[serde(default)]
    pub financing_mech: ListField<FinancingMechanism>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub bottlenecks: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub indigenous_agreements: Vec<String>,
    #[serde(default)]
    pub jobs: ListField<JobEntry>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub ghg_tools: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ghg_who: Option<String>,
}

impl ProjectRecord {
    /// Create a bare record with only an identifier
    #[must_use]
    pub fn new(record_id: impl Into<RecordId>) -> Self {
        Self {
            record_id: record_id.into(),
            project_name: None,
            community: None,
            latitude: None,
            longitude: None,
            province: None,
            province_abbr: None,
            stage: None,
            project_type: Vec::new(),
            indigenous_ownership: None,
            project_scale: None,
            data_source: None,
            total_cost: None,
            all_financing_mechanisms: Vec::new(),
            anonymous_status: None,
            owners: ListField::default(),
            capital_mix: ListField::default(),
            debt: ListField::default(),
            financing_mech: ListField::default(),
            bottlenecks: Vec::new(),
            indigenous_agreements: Vec::new(),
            jobs: ListField::default(),
            ghg_tools: Vec::new(),
            ghg_who: None,
        }
    }

    /// Check if the record was submitted anonymously
    #[inline]
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.anonymous_status.as_deref() == Some("anon")
    }

    /// Map coordinates, when both are present
    #[inline]
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// Total cost, missing treated as zero
    #[inline]
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.total_cost.filter(|c| c.is_finite()).unwrap_or(0.0)
    }

    /// With project name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// With province
    #[must_use]
    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    /// With stage
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// With project type tags
    #[must_use]
    pub fn with_project_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_type = types.into_iter().map(Into::into).collect();
        self
    }

    /// With indigenous ownership category
    #[must_use]
    pub fn with_indigenous_ownership(mut self, category: impl Into<String>) -> Self {
        self.indigenous_ownership = Some(category.into());
        self
    }

    /// With project scale bucket
    #[must_use]
    pub fn with_scale(mut self, scale: impl Into<String>) -> Self {
        self.project_scale = Some(scale.into());
        self
    }

    /// With coordinates
    #[must_use]
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// With total cost
    #[must_use]
    pub fn with_total_cost(mut self, cost: f64) -> Self {
        self.total_cost = Some(cost);
        self
    }

    /// With owners
    #[must_use]
    pub fn with_owners(mut self, owners: Vec<Owner>) -> Self {
        self.owners = ListField::Entries(owners);
        self
    }

    /// With capital mix
    #[must_use]
    pub fn with_capital_mix(mut self, mix: Vec<CapitalMixEntry>) -> Self {
        self.capital_mix = ListField::Entries(mix);
        self
    }
}

impl Owner {
    /// Create an ownership stake
    #[must_use]
    pub fn new(name: impl Into<String>, owner_type: impl Into<String>, percent: f64) -> Self {
        Self {
            owner_name: Some(name.into()),
            owner_type: Some(owner_type.into()),
            owner_percent: percent,
        }
    }
}

impl CapitalMixEntry {
    /// Create a capital mix entry
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        percent: f64,
    ) -> Self {
        Self {
            name: Some(name.into()),
            source: None,
            category: Some(category.into()),
            item_type: None,
            amount,
            percent,
        }
    }

    /// With source
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// With item type
    #[must_use]
    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_full_row() {
        let row = json!({
            "record_id": "r-1",
            "project_name": "Sunny Ridge",
            "latitude": "49.2",
            "longitude": -123.1,
            "province": "BC",
            "project_type": "['Solar', 'Storage']",
            "total_cost": "1,500,000",
            "owners": [{"owner_name": "Band", "owner_type": "Indigenous", "owner_percent": "51"}],
            "capital_mix": {"name": "Grant", "category": "Grants", "amount": 100, "percent": 100},
            "bottlenecks": ["High financing costs"]
        });

        let record: ProjectRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.record_id.as_str(), "r-1");
        assert_eq!(record.coordinates(), Some((49.2, -123.1)));
        assert_eq!(record.project_type, vec!["Solar", "Storage"]);
        assert_eq!(record.cost(), 1_500_000.0);
        assert_eq!(record.owners.as_slice()[0].owner_percent, 51.0);
        assert_eq!(record.capital_mix.as_slice().len(), 1);
        assert!(record.stage.is_none());
        assert!(!record.is_private());
    }

    #[test]
    fn malformed_owners_do_not_reject_record() {
        let row = json!({"record_id": "r-2", "owners": "nobody knows"});
        let record: ProjectRecord = serde_json::from_value(row).unwrap();
        assert!(record.owners.is_malformed());
    }

    #[test]
    fn private_records() {
        let record = ProjectRecord {
            anonymous_status: Some("anon".into()),
            ..ProjectRecord::new("r-3")
        };
        assert!(record.is_private());
    }

    #[test]
    fn coordinates_need_both_parts() {
        let mut record = ProjectRecord::new("r-4");
        record.latitude = Some(50.0);
        assert_eq!(record.coordinates(), None);
    }
}
