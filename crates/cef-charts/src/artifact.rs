//! Per-record card artifacts
//!
//! Each project card shows two small bars: who owns the project and how it
//! was financed. Both depend on the record alone, so they are cached by
//! `record_id` and shared across filters and sessions.
//!
//! # Capital mix tolerance
//!
//! Survey answers rarely sum to exactly 100%. Within ±7.5 points the bar is
//! renormalized. A larger shortfall gets an explicit `Unknown` segment; an
//! overshoot is drawn as reported and flagged.

use crate::chart::percent_of;
use cef_record::{CapitalMixEntry, FieldError, Owner, ProjectRecord, RecordId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Shortfall or overshoot (percentage points) absorbed by renormalization
pub const MIX_TOLERANCE: f64 = 7.5;

/// Reported total above which a card is flagged over-accounted
pub const OVER_ACCOUNTED_WARNING: f64 = 105.0;

/// Segments at or below this display percent carry no label
pub const LABEL_MIN_PERCENT: f64 = 5.0;

/// Errors while deriving one record's artifacts
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArtifactError {
    /// A list column could not be decoded
    #[error(transparent)]
    Malformed(#[from] FieldError),

    /// Capital mix entry with a negative amount
    #[error("negative amount {amount} for capital mix entry {name:?}")]
    NegativeAmount { name: String, amount: f64 },

    /// Percent that is NaN or infinite
    #[error("non-finite percent in {field} entry {name:?}")]
    NonFinitePercent { field: &'static str, name: String },
}

/// One owner's stake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipSegment {
    pub name: String,
    pub owner_type: String,
    pub percent: f64,
}

/// Ownership bar for a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnershipBar {
    pub segments: Vec<OwnershipSegment>,
}

/// One instrument in the capital mix bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalSegment {
    pub category: String,
    pub item_type: String,
    pub name: String,
    /// Percent as reported
    pub percent: f64,
    pub amount: f64,
    /// Percent drawn on the bar
    pub display_percent: f64,
    /// `"42%"`, or empty for thin segments
    pub label: String,
}

/// Capital mix bar for a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalMixBar {
    /// Grouped by category in first-seen order
    pub segments: Vec<CapitalSegment>,
    /// Sum of reported percents
    pub total_percent: f64,
    pub over_accounted: bool,
}

/// Caveat shown on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum CardWarning {
    /// An `Unknown` segment was added for unreported capital
    UnknownCapitalAdded,
    /// Reported percents sum well above 100
    OverAccounted { total: f64 },
}

/// Everything a card needs beyond the raw record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardArtifacts {
    pub record_id: RecordId,
    pub ownership: OwnershipBar,
    pub capital_mix: CapitalMixBar,
    pub warnings: Vec<CardWarning>,
}

/// Derives card artifacts from a record
pub trait ArtifactBuilder: Send + Sync + std::fmt::Debug {
    /// Build artifacts for one record
    ///
    /// # Errors
    /// Returns [`ArtifactError`] when the record's list columns are unusable
    fn build(&self, record: &ProjectRecord) -> Result<CardArtifacts, ArtifactError>;

    /// Builder name for logs
    fn name(&self) -> &'static str {
        "card"
    }
}

/// Default builder: ownership bar plus capital mix bar
#[derive(Debug, Clone, Copy, Default)]
pub struct CardArtifactBuilder;

impl ArtifactBuilder for CardArtifactBuilder {
    fn build(&self, record: &ProjectRecord) -> Result<CardArtifacts, ArtifactError> {
        let ownership = ownership_bar(record.owners.entries("owners")?)?;
        let (capital_mix, warnings) = capital_mix_bar(record.capital_mix.entries("capital_mix")?)?;

        Ok(CardArtifacts {
            record_id: record.record_id.clone(),
            ownership,
            capital_mix,
            warnings,
        })
    }
}

/// Ownership bar, one segment per owner
///
/// # Errors
/// Returns [`ArtifactError::NonFinitePercent`] for NaN or infinite stakes
pub fn ownership_bar(owners: &[Owner]) -> Result<OwnershipBar, ArtifactError> {
    let segments = owners
        .iter()
        .map(|owner| {
            let name = owner.owner_name.clone().unwrap_or_default();
            if !owner.owner_percent.is_finite() {
                return Err(ArtifactError::NonFinitePercent {
                    field: "owners",
                    name,
                });
            }
            Ok(OwnershipSegment {
                name,
                owner_type: owner.owner_type.clone().unwrap_or_default(),
                percent: owner.owner_percent,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OwnershipBar { segments })
}

/// Capital mix bar with the tolerance rule applied
///
/// # Errors
/// Returns an error for negative amounts or non-finite percents
pub fn capital_mix_bar(
    entries: &[CapitalMixEntry],
) -> Result<(CapitalMixBar, Vec<CardWarning>), ArtifactError> {
    if entries.is_empty() {
        return Ok((CapitalMixBar::default(), Vec::new()));
    }

    let mut segments = Vec::with_capacity(entries.len() + 1);
    for entry in entries {
        let name = entry.name.clone().unwrap_or_else(|| "Unnamed".to_string());
        if !entry.percent.is_finite() {
            return Err(ArtifactError::NonFinitePercent {
                field: "capital_mix",
                name,
            });
        }
        if entry.amount < 0.0 || entry.amount.is_nan() {
            return Err(ArtifactError::NegativeAmount {
                name,
                amount: entry.amount,
            });
        }
        segments.push(CapitalSegment {
            category: entry.category.clone().unwrap_or_else(|| "Unknown".to_string()),
            item_type: entry.item_type.clone().unwrap_or_default(),
            name,
            percent: entry.percent,
            amount: entry.amount,
            display_percent: entry.percent,
            label: String::new(),
        });
    }

    let total_percent: f64 = segments.iter().map(|s| s.percent).sum();
    let total_amount: f64 = segments.iter().map(|s| s.amount).sum();
    let difference = 100.0 - total_percent;

    let mut warnings = Vec::new();
    let mut over_accounted = false;

    if difference.abs() <= MIX_TOLERANCE {
        for segment in &mut segments {
            segment.display_percent = percent_of(segment.percent, total_percent);
        }
    } else if difference > MIX_TOLERANCE {
        let amount = if total_amount > 0.0 && total_percent > 0.0 {
            difference / total_percent * total_amount
        } else {
            0.0
        };
        segments.insert(
            0,
            CapitalSegment {
                category: "Unknown".to_string(),
                item_type: "Unknown".to_string(),
                name: "Unknown".to_string(),
                percent: difference,
                amount,
                display_percent: difference,
                label: String::new(),
            },
        );
        warnings.push(CardWarning::UnknownCapitalAdded);
    } else {
        over_accounted = true;
    }

    if total_percent > OVER_ACCOUNTED_WARNING {
        warnings.push(CardWarning::OverAccounted {
            total: total_percent,
        });
    }

    for segment in &mut segments {
        if segment.display_percent > LABEL_MIN_PERCENT {
            segment.label = format!("{:.0}%", segment.display_percent);
        }
    }

    let bar = CapitalMixBar {
        segments: group_by_category(segments),
        total_percent,
        over_accounted,
    };
    Ok((bar, warnings))
}

fn group_by_category(segments: Vec<CapitalSegment>) -> Vec<CapitalSegment> {
    let mut groups: IndexMap<String, Vec<CapitalSegment>> = IndexMap::new();
    for segment in segments {
        groups.entry(segment.category.clone()).or_default().push(segment);
    }
    groups.into_values().flatten().collect()
}
