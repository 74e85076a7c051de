//! Chart descriptions
//!
//! Builders return data, not figures. Rendering (colors, fonts, layout) is
//! the client's job; a [`Chart`] only says what to draw.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A built chart, or an explicit "no data for these filters"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Chart {
    NoData { title: String },
    Ready { title: String, body: ChartBody },
}

impl Chart {
    /// Chart with nothing to show
    #[inline]
    #[must_use]
    pub fn no_data(title: impl Into<String>) -> Self {
        Self::NoData {
            title: title.into(),
        }
    }

    /// Chart with a body
    #[inline]
    #[must_use]
    pub fn ready(title: impl Into<String>, body: ChartBody) -> Self {
        Self::Ready {
            title: title.into(),
            body,
        }
    }

    /// Title
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::NoData { title } | Self::Ready { title, .. } => title,
        }
    }

    /// Body, if there was data
    #[must_use]
    pub fn body(&self) -> Option<&ChartBody> {
        match self {
            Self::NoData { .. } => None,
            Self::Ready { body, .. } => Some(body),
        }
    }

    /// Check whether the chart has data
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Chart payload by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    Pie { slices: Vec<Slice> },
    Pies { pies: Vec<PieGroup> },
    Sankey { nodes: Vec<String>, links: Vec<SankeyLink> },
    StackedBar { groups: Vec<StackGroup> },
    BoxPlot { boxes: Vec<BoxStats> },
    Lollipop { items: Vec<Count> },
    Treemap { nodes: Vec<TreemapNode> },
    /// Two views of the same treemap
    DualTreemap { by_value: Vec<Slice>, by_count: Vec<Slice> },
    StackedShares { slices: Vec<Slice> },
    Funnel { stages: Vec<Count> },
    Counts { counts: Vec<Count> },
    Jobs { phases: Vec<JobsPhase> },
    Methodology { tools: Vec<Count>, who: Vec<Count> },
}

/// Labelled value with its share of the whole (0-100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub share: f64,
    /// Display text; empty when the slice is too small to label
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

/// One pie among several (e.g. one per project scale)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieGroup {
    pub title: String,
    /// Distinct projects behind this pie
    pub projects: usize,
    pub slices: Vec<Slice>,
}

/// Sankey link between node indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// One horizontal bar of a stacked bar chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackGroup {
    pub group: String,
    pub total: f64,
    pub segments: Vec<Slice>,
}

/// Five-number summary plus the raw points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub points: Vec<f64>,
}

/// Labelled count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

/// Treemap node; roots have no parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapNode {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub value: f64,
}

/// Jobs reported for one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsPhase {
    pub phase: String,
    pub full_time: f64,
    pub part_time: f64,
    /// Entries reporting a full-time figure
    pub full_time_reports: usize,
    /// Entries reporting a part-time figure
    pub part_time_reports: usize,
}

/// Running sums keyed in first-seen order
#[derive(Debug, Clone)]
pub(crate) struct Tally<K: Hash + Eq> {
    sums: IndexMap<K, f64>,
}

impl<K: Hash + Eq> Default for Tally<K> {
    fn default() -> Self {
        Self {
            sums: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq> Tally<K> {
    pub(crate) fn add(&mut self, key: K, value: f64) {
        *self.sums.entry(key).or_insert(0.0) += value;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    pub(crate) fn total(&self) -> f64 {
        self.sums.values().sum()
    }

    pub(crate) fn get(&self, key: &K) -> f64 {
        self.sums.get(key).copied().unwrap_or(0.0)
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (K, f64)> {
        self.sums.into_iter()
    }
}

impl Tally<String> {
    /// Slices with shares; `min_label_share` controls which get text
    pub(crate) fn into_slices(self, min_label_share: f64) -> Vec<Slice> {
        let total = self.total();
        self.sums
            .into_iter()
            .map(|(label, value)| {
                let share = percent_of(value, total);
                let text = if share >= min_label_share {
                    format!("{share:.1}%")
                } else {
                    String::new()
                };
                Slice {
                    label,
                    value,
                    share,
                    text,
                }
            })
            .collect()
    }
}

/// Occurrence counts keyed in first-seen order
#[derive(Debug, Clone, Default)]
pub(crate) struct Counter {
    counts: IndexMap<String, usize>,
}

impl Counter {
    pub(crate) fn add(&mut self, key: impl Into<String>) {
        *self.counts.entry(key.into()).or_insert(0) += 1;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counts, largest first; ties keep first-seen order
    pub(crate) fn descending(self) -> Vec<Count> {
        let mut counts: Vec<Count> = self
            .counts
            .into_iter()
            .map(|(label, count)| Count { label, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0
#[inline]
pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_serializes_with_tags() {
        let chart = Chart::ready(
            "Jobs",
            ChartBody::Counts {
                counts: vec![Count {
                    label: "a".into(),
                    count: 2,
                }],
            },
        );
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["body"]["kind"], "counts");

        let empty = serde_json::to_value(Chart::no_data("Jobs")).unwrap();
        assert_eq!(empty["status"], "no_data");
    }

    #[test]
    fn tally_keeps_first_seen_order() {
        let mut tally = Tally::default();
        tally.add("b".to_string(), 1.0);
        tally.add("a".to_string(), 3.0);
        tally.add("b".to_string(), 1.0);
        let slices = tally.into_slices(5.0);
        assert_eq!(slices[0].label, "b");
        assert!((slices[0].share - 40.0).abs() < 1e-9);
        assert_eq!(slices[1].text, "60.0%");
    }

    #[test]
    fn counter_sorts_descending_stably() {
        let mut counter = Counter::default();
        for key in ["x", "y", "y", "z"] {
            counter.add(key);
        }
        let labels: Vec<_> = counter.descending().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["y", "x", "z"]);
    }
}
