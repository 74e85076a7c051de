//! Capital explorer charts
//!
//! Most charts here work on [`CapitalRow`]s: every record's capital mix
//! exploded to one row per instrument, joined with the matching debt terms,
//! with category names standardized and vague sources folded into
//! `Other/Unknown-{category}`.

use crate::chart::{
    percent_of, BoxStats, Chart, ChartBody, Count, Counter, PieGroup, SankeyLink, Slice,
    StackGroup, Tally, TreemapNode,
};
use cef_record::{ProjectRecord, RecordId, PROJECT_SCALE_ORDER};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Category that funds projects directly (no external source)
pub const INTERNAL_CAPITAL: &str = "Internal capital";

/// Bottlenecks shown on the capital explorer
pub const CAPITAL_BOTTLENECKS: [&str; 4] = [
    "Difficulty securing up-front capital",
    "Limited access to grants or subsidies",
    "High financing costs",
    "Limited investor interest in community-led projects",
];

const UNKNOWN_SOURCES: [&str; 5] = [
    "Other",
    "Not sure",
    "Aggregate total",
    "Aggregate Total",
    "Don't know",
];

/// Placeholder for indicators with no data
pub const NOT_AVAILABLE: &str = "N/A";

/// Standard display name for a financing category
#[must_use]
pub fn standardize_category(category: &str) -> String {
    let lower = category.to_lowercase();
    let standard = if lower.contains("debt") {
        "Debt financing"
    } else if lower.contains("grant") {
        "Grants & non-repayable contributions"
    } else if lower.contains("crowdfund") || lower.contains("crowd fund") {
        "Crowdfunding"
    } else if lower.contains("internal") {
        INTERNAL_CAPITAL
    } else if lower.contains("equity") {
        "External equity investments"
    } else if lower.contains("community") {
        "Community financing"
    } else {
        return category.to_string();
    };
    standard.to_string()
}

/// Fold vague sources into `Other/Unknown-{category}`
#[must_use]
pub fn normalize_source(source: &str, category: Option<&str>) -> String {
    if UNKNOWN_SOURCES.contains(&source) {
        match category {
            Some(category) => format!("Other/Unknown-{category}"),
            None => "Other/Unknown".to_string(),
        }
    } else {
        source.to_string()
    }
}

/// One capital mix instrument of one record
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalRow<'a> {
    pub record: &'a ProjectRecord,
    pub name: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub item_type: Option<String>,
    pub amount: f64,
    pub percent: f64,
    pub debt_interest: Option<String>,
    pub debt_repayment: Option<String>,
}

impl CapitalRow<'_> {
    /// Owning record's identifier
    #[inline]
    #[must_use]
    pub fn record_id(&self) -> &RecordId {
        &self.record.record_id
    }
}

/// Explode capital mixes into rows
///
/// Debt terms are joined on `(name, source)` as reported, before source
/// normalization; the first matching debt entry wins.
#[must_use]
pub fn capital_rows<'a>(records: &[&'a ProjectRecord]) -> Vec<CapitalRow<'a>> {
    let mut rows = Vec::new();
    for &record in records {
        for entry in record.capital_mix.as_slice() {
            let debt = record.debt.as_slice().iter().find(|d| {
                d.debt_name == entry.name && d.debt_source == entry.source
            });
            rows.push(CapitalRow {
                record,
                name: entry.name.clone(),
                source: entry
                    .source
                    .as_deref()
                    .map(|s| normalize_source(s, entry.category.as_deref())),
                category: entry.category.as_deref().map(standardize_category),
                item_type: entry.item_type.clone(),
                amount: if entry.amount.is_finite() { entry.amount } else { 0.0 },
                percent: if entry.percent.is_finite() { entry.percent } else { 0.0 },
                debt_interest: debt.and_then(|d| d.debt_interest.clone()),
                debt_repayment: debt.and_then(|d| d.debt_repayment.clone()),
            });
        }
    }
    rows
}

/// Capital flow: source → category → project type
///
/// Each row's amount is split evenly across its record's project types.
/// With `selected_types`, links into other project types are dropped.
#[must_use]
pub fn sankey(rows: &[CapitalRow<'_>], selected_types: Option<&BTreeSet<String>>) -> Chart {
    const TITLE: &str = "Capital flow: Source → Category → Project type";

    let mut source_to_category: Tally<(String, String)> = Tally::default();
    let mut category_to_type: Tally<(String, String)> = Tally::default();
    let mut internal_to_type: Tally<String> = Tally::default();

    for row in rows {
        let types = &row.record.project_type;
        let share = row.amount / types.len().max(1) as f64;
        let exploded: Vec<Option<&String>> = if types.is_empty() {
            vec![None]
        } else {
            types.iter().map(Some).collect()
        };

        for project_type in exploded {
            if let Some(selected) = selected_types.filter(|s| !s.is_empty()) {
                if !project_type.is_some_and(|t| selected.contains(t)) {
                    continue;
                }
            }
            let Some(category) = row.category.as_ref() else {
                continue;
            };

            if category == INTERNAL_CAPITAL {
                if let Some(t) = project_type {
                    internal_to_type.add(t.clone(), share);
                }
                continue;
            }
            if let Some(source) = &row.source {
                source_to_category.add((source.clone(), category.clone()), share);
            }
            if let Some(t) = project_type {
                category_to_type.add((category.clone(), t.clone()), share);
            }
        }
    }

    let mut nodes: IndexSet<String> = IndexSet::new();
    let mut links = Vec::new();
    let mut link = |nodes: &mut IndexSet<String>, from: String, to: String, value: f64| {
        if value > 0.0 {
            let (source, _) = nodes.insert_full(from);
            let (target, _) = nodes.insert_full(to);
            links.push(SankeyLink {
                source,
                target,
                value,
            });
        }
    };

    for ((source, category), value) in source_to_category.into_entries() {
        link(&mut nodes, source, category, value);
    }
    for ((category, project_type), value) in category_to_type.into_entries() {
        link(&mut nodes, category, project_type, value);
    }
    for (project_type, value) in internal_to_type.into_entries() {
        link(&mut nodes, INTERNAL_CAPITAL.to_string(), project_type, value);
    }

    if links.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(
        TITLE,
        ChartBody::Sankey {
            nodes: nodes.into_iter().collect(),
            links,
        },
    )
}

/// Funding sources by category, as shares of each category's amount
#[must_use]
pub fn stacked_bar(rows: &[CapitalRow<'_>]) -> Chart {
    const TITLE: &str = "Funding sources by category";

    let mut by_category: IndexMap<&str, Tally<&str>> = IndexMap::new();
    for row in rows {
        let (Some(category), Some(source)) = (row.category.as_deref(), row.source.as_deref()) else {
            continue;
        };
        if category == INTERNAL_CAPITAL {
            continue;
        }
        by_category.entry(category).or_default().add(source, row.amount);
    }

    if by_category.is_empty() {
        return Chart::no_data(TITLE);
    }

    let groups = by_category
        .into_iter()
        .map(|(category, sources)| {
            let total = sources.total();
            let mut segments: Vec<Slice> = sources
                .into_entries()
                .map(|(source, amount)| {
                    let share = percent_of(amount, total);
                    Slice {
                        label: source.to_string(),
                        value: amount,
                        share,
                        text: if share >= 5.0 {
                            format!("{source}: {share:.1}%")
                        } else {
                            String::new()
                        },
                    }
                })
                .collect();
            segments.sort_by(|a, b| b.value.total_cmp(&a.value));
            StackGroup {
                group: category.to_string(),
                total,
                segments,
            }
        })
        .collect();

    Chart::ready(TITLE, ChartBody::StackedBar { groups })
}

/// Distribution of each record's category share of its capital mix
#[must_use]
pub fn box_plot(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Average contribution of each financing source to total project costs";

    let mut points: IndexMap<String, Vec<f64>> = IndexMap::new();
    for record in records {
        let mut shares: Tally<String> = Tally::default();
        for entry in record.capital_mix.as_slice() {
            if let Some(category) = entry.category.as_deref() {
                if entry.percent.is_finite() {
                    shares.add(standardize_category(category), entry.percent);
                }
            }
        }
        for (category, percent) in shares.into_entries() {
            if percent > 0.0 {
                points.entry(category).or_default().push(percent);
            }
        }
    }

    if points.is_empty() {
        return Chart::no_data(TITLE);
    }

    let boxes = points
        .into_iter()
        .filter_map(|(label, values)| five_number_summary(label, values))
        .collect();
    Chart::ready(TITLE, ChartBody::BoxPlot { boxes })
}

/// Min, quartiles (linear interpolation) and max
#[must_use]
pub fn five_number_summary(label: String, points: Vec<f64>) -> Option<BoxStats> {
    if points.is_empty() {
        return None;
    }
    let mut sorted = points.clone();
    sorted.sort_by(f64::total_cmp);

    let quantile = |q: f64| {
        let rank = q * (sorted.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    };

    Some(BoxStats {
        label,
        min: sorted[0],
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max: sorted[sorted.len() - 1],
        points,
    })
}

/// Counts of selected bottlenecks, smallest first
#[must_use]
pub fn bottleneck_lollipop(records: &[&ProjectRecord], title: &str, keep: &[&str]) -> Chart {
    let mut counter = Counter::default();
    for record in records {
        for bottleneck in &record.bottlenecks {
            if keep.contains(&bottleneck.as_str()) {
                counter.add(bottleneck.as_str());
            }
        }
    }

    if counter.is_empty() {
        return Chart::no_data(title);
    }

    let mut items = counter.descending();
    items.sort_by_key(|c| c.count);
    Chart::ready(title, ChartBody::Lollipop { items })
}

/// Use of financing mechanisms: categories with source children
#[must_use]
pub fn mechanism_treemap(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Use of Funding & Financing Mechanisms";

    let mut by_category: IndexMap<String, Tally<String>> = IndexMap::new();
    for record in records {
        for mech in record.financing_mech.as_slice() {
            let (Some(category), Some(source)) = (mech.category.as_deref(), mech.source.as_deref())
            else {
                continue;
            };
            let category = standardize_category(category);
            let source = normalize_source(source, Some(&category));
            by_category.entry(category).or_default().add(source, 1.0);
        }
    }

    if by_category.is_empty() {
        return Chart::no_data(TITLE);
    }

    let mut parents = Vec::with_capacity(by_category.len());
    let mut children = Vec::new();
    for (category, sources) in by_category {
        parents.push(TreemapNode {
            label: category.clone(),
            parent: None,
            value: sources.total(),
        });
        children.extend(sources.into_entries().map(|(source, count)| TreemapNode {
            label: source,
            parent: Some(category.clone()),
            value: count,
        }));
    }
    parents.extend(children);

    Chart::ready(TITLE, ChartBody::Treemap { nodes: parents })
}

/// Amount per category for each project scale present
#[must_use]
pub fn scale_pies(rows: &[CapitalRow<'_>]) -> Chart {
    const TITLE: &str = "Funding distribution by project scale";

    let pies: Vec<PieGroup> = PROJECT_SCALE_ORDER
        .iter()
        .filter_map(|scale| {
            let in_scale: Vec<_> = rows
                .iter()
                .filter(|r| r.record.project_scale.as_deref() == Some(*scale))
                .collect();
            if in_scale.is_empty() {
                return None;
            }

            let projects: HashSet<&RecordId> = in_scale.iter().map(|r| r.record_id()).collect();
            let mut amounts: Tally<String> = Tally::default();
            for row in &in_scale {
                if let Some(category) = &row.category {
                    amounts.add(category.clone(), row.amount);
                }
            }
            Some(PieGroup {
                title: (*scale).to_string(),
                projects: projects.len(),
                slices: amounts.into_slices(0.0),
            })
        })
        .collect();

    if pies.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(TITLE, ChartBody::Pies { pies })
}

/// Top mechanism and top source for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndicator {
    pub mechanism: String,
    pub source: String,
}

impl CategoryIndicator {
    fn not_available() -> Self {
        Self {
            mechanism: NOT_AVAILABLE.to_string(),
            source: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Debt indicator adds interest and repayment terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtIndicator {
    pub interest: String,
    pub repayment: String,
    pub mechanism: String,
    pub source: String,
}

/// Headline indicators per financing category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicators {
    pub equity: CategoryIndicator,
    pub debt: DebtIndicator,
    pub grants: CategoryIndicator,
    pub community_finance: CategoryIndicator,
    pub crowdfunding: CategoryIndicator,
}

impl Indicators {
    /// Every indicator `N/A`
    #[must_use]
    pub fn not_available() -> Self {
        Self {
            equity: CategoryIndicator::not_available(),
            debt: DebtIndicator {
                interest: NOT_AVAILABLE.to_string(),
                repayment: NOT_AVAILABLE.to_string(),
                mechanism: NOT_AVAILABLE.to_string(),
                source: NOT_AVAILABLE.to_string(),
            },
            grants: CategoryIndicator::not_available(),
            community_finance: CategoryIndicator::not_available(),
            crowdfunding: CategoryIndicator::not_available(),
        }
    }
}

/// Compute headline indicators
#[must_use]
pub fn indicators(rows: &[CapitalRow<'_>]) -> Indicators {
    let debt_rows = rows_in(rows, "Debt financing");
    let debt_basic = category_indicator(&debt_rows);
    let debt = DebtIndicator {
        interest: average_interest(&debt_rows),
        repayment: top_by_projects(&debt_rows, |r| r.debt_repayment.as_deref()),
        mechanism: debt_basic.mechanism,
        source: debt_basic.source,
    };

    Indicators {
        equity: category_indicator(&rows_in(rows, "External equity investments")),
        debt,
        grants: category_indicator(&rows_in(rows, "Grants & non-repayable contributions")),
        community_finance: category_indicator(&rows_in(rows, "Community financing")),
        crowdfunding: category_indicator(&rows_in(rows, "Crowdfunding")),
    }
}

fn rows_in<'r, 'a>(rows: &'r [CapitalRow<'a>], category: &str) -> Vec<&'r CapitalRow<'a>> {
    rows.iter()
        .filter(|r| r.category.as_deref() == Some(category))
        .collect()
}

fn category_indicator(rows: &[&CapitalRow<'_>]) -> CategoryIndicator {
    if rows.is_empty() {
        return CategoryIndicator::not_available();
    }
    CategoryIndicator {
        mechanism: top_by_projects(rows, |r| r.item_type.as_deref()),
        source: top_by_projects(rows, |r| r.source.as_deref()),
    }
}

/// Most common value by distinct projects: `"{value} ({pct}% projects)"`
fn top_by_projects<'r, 'a: 'r, F>(rows: &[&'r CapitalRow<'a>], key: F) -> String
where
    F: Fn(&'r CapitalRow<'a>) -> Option<&'r str>,
{
    let total: HashSet<&RecordId> = rows.iter().map(|r| r.record_id()).collect();
    let mut projects: IndexMap<&str, HashSet<&RecordId>> = IndexMap::new();
    for row in rows {
        if let Some(value) = key(row) {
            projects.entry(value).or_default().insert(row.record_id());
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (&value, ids) in &projects {
        if best.map_or(true, |(_, n)| ids.len() > n) {
            best = Some((value, ids.len()));
        }
    }

    match best {
        Some((value, n)) => {
            let pct = percent_of(n as f64, total.len() as f64);
            format!("{value} ({pct:.0}% projects)")
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

fn average_interest(rows: &[&CapitalRow<'_>]) -> String {
    let rates: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.debt_interest.as_deref().and_then(parse_rate))
        .collect();
    if rates.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    format!("{mean:.1}%")
}

/// `"5%"` → 5.0, `"4-6%"` → 5.0
#[must_use]
pub fn parse_rate(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace('%', "");
    if let Some((lo, hi)) = cleaned.split_once('-') {
        let lo = lo.trim().parse::<f64>().ok()?;
        let hi = hi.trim().parse::<f64>().ok()?;
        return Some((lo + hi) / 2.0);
    }
    cleaned.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

/// Every capital explorer chart for one filter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalCharts {
    pub box_plot: Chart,
    pub sankey: Chart,
    pub stacked_bar: Chart,
    pub bottlenecks: Chart,
    pub mechanisms: Chart,
    pub scale_pies: Chart,
    pub indicators: Indicators,
}

/// Build the capital explorer bundle
///
/// `records` passed every active filter. `sankey_records` passed every filter
/// except project type; `selected_types` then trims the sankey's last column.
#[must_use]
pub fn capital_charts(
    records: &[&ProjectRecord],
    sankey_records: &[&ProjectRecord],
    selected_types: Option<&BTreeSet<String>>,
) -> CapitalCharts {
    let rows = capital_rows(records);
    if rows.is_empty() {
        tracing::debug!(records = records.len(), "No capital mix rows for filters");
        return CapitalCharts {
            box_plot: Chart::no_data("No data available for selected filters"),
            sankey: Chart::no_data("No data available for selected filters"),
            stacked_bar: Chart::no_data("No data available for selected filters"),
            bottlenecks: Chart::no_data("No data available for selected filters"),
            mechanisms: Chart::no_data("No data available for selected filters"),
            scale_pies: Chart::no_data("No data available for selected filters"),
            indicators: Indicators::not_available(),
        };
    }

    let sankey_rows = capital_rows(sankey_records);
    CapitalCharts {
        box_plot: box_plot(records),
        sankey: sankey(&sankey_rows, selected_types),
        stacked_bar: stacked_bar(&rows),
        bottlenecks: bottleneck_lollipop(records, "Financing Bottlenecks", &CAPITAL_BOTTLENECKS),
        mechanisms: mechanism_treemap(records),
        scale_pies: scale_pies(&rows),
        indicators: indicators(&rows),
    }
}

/// Counts of a per-record label, largest first
pub(crate) fn count_labels<'a, I>(labels: I) -> Vec<Count>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counter = Counter::default();
    for label in labels {
        counter.add(label);
    }
    counter.descending()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cef_record::{CapitalMixEntry, DebtEntry, ListField};

    fn entry(category: &str, source: &str, amount: f64, percent: f64) -> CapitalMixEntry {
        CapitalMixEntry::new(format!("{category} loan"), category, amount, percent)
            .with_source(source)
            .with_item_type(format!("{category} product"))
    }

    fn record(id: &str, types: &[&str], mix: Vec<CapitalMixEntry>) -> ProjectRecord {
        ProjectRecord::new(id)
            .with_project_types(types.iter().copied())
            .with_capital_mix(mix)
    }

    #[test]
    fn categories_are_standardized() {
        assert_eq!(standardize_category("Debt"), "Debt financing");
        assert_eq!(standardize_category("grants"), "Grants & non-repayable contributions");
        assert_eq!(standardize_category("Crowd funding"), "Crowdfunding");
        assert_eq!(standardize_category("Community finance"), "Community financing");
        assert_eq!(standardize_category("Equity"), "External equity investments");
        assert_eq!(standardize_category("Something else"), "Something else");
    }

    #[test]
    fn vague_sources_are_folded() {
        assert_eq!(normalize_source("Not sure", Some("Grants")), "Other/Unknown-Grants");
        assert_eq!(normalize_source("Bank", Some("Debt")), "Bank");
    }

    #[test]
    fn debt_terms_join_on_name_and_source() {
        let mut r = record("a", &["Solar"], vec![entry("Debt", "Bank", 100.0, 100.0)]);
        r.debt = ListField::Entries(vec![DebtEntry {
            debt_name: Some("Debt loan".into()),
            debt_source: Some("Bank".into()),
            debt_interest: Some("4-6%".into()),
            debt_repayment: Some("10 years".into()),
        }]);
        let rows = capital_rows(&[&r]);
        assert_eq!(rows[0].debt_interest.as_deref(), Some("4-6%"));
        assert_eq!(rows[0].category.as_deref(), Some("Debt financing"));
    }

    #[test]
    fn sankey_splits_amount_across_types() {
        let r = record("a", &["Solar", "Wind"], vec![entry("Grants", "Federal", 100.0, 100.0)]);
        let chart = sankey(&capital_rows(&[&r]), None);
        let Some(ChartBody::Sankey { nodes, links }) = chart.body() else {
            panic!("expected sankey");
        };
        assert_eq!(nodes[0], "Federal");
        assert_eq!(links[0].value, 100.0);
        assert_eq!(links[1].value, 50.0);
        assert_eq!(links.len(), 3);
    }

    #[test]
    fn sankey_drops_unselected_types_and_routes_internal() {
        let r = record(
            "a",
            &["Solar", "Wind"],
            vec![
                entry("Grants", "Federal", 100.0, 50.0),
                entry("Internal capital", "Self", 40.0, 50.0),
            ],
        );
        let selected: BTreeSet<String> = ["Wind".to_string()].into();
        let chart = sankey(&capital_rows(&[&r]), Some(&selected));
        let Some(ChartBody::Sankey { nodes, links }) = chart.body() else {
            panic!("expected sankey");
        };
        assert!(!nodes.iter().any(|n| n == "Solar"));
        let internal = nodes.iter().position(|n| n == INTERNAL_CAPITAL).unwrap();
        assert!(links.iter().any(|l| l.source == internal && l.value == 20.0));
    }

    #[test]
    fn stacked_bar_orders_sources_by_amount() {
        let r = record(
            "a",
            &["Solar"],
            vec![
                entry("Grants", "Province", 10.0, 10.0),
                entry("Grants", "Federal", 90.0, 90.0),
                entry("Internal capital", "Self", 50.0, 0.0),
            ],
        );
        let chart = stacked_bar(&capital_rows(&[&r]));
        let Some(ChartBody::StackedBar { groups }) = chart.body() else {
            panic!("expected stacked bar");
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].segments[0].label, "Federal");
        assert_eq!(groups[0].segments[0].text, "Federal: 90.0%");
    }

    #[test]
    fn quartiles_interpolate() {
        let stats = five_number_summary("x".into(), vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.median - 2.5).abs() < 1e-9);
        assert!((stats.q1 - 1.75).abs() < 1e-9);
        assert!((stats.q3 - 3.25).abs() < 1e-9);
    }

    #[test]
    fn lollipop_counts_only_key_bottlenecks() {
        let mut a = ProjectRecord::new("a");
        a.bottlenecks = vec!["High financing costs".into(), "Weather".into()];
        let mut b = ProjectRecord::new("b");
        b.bottlenecks = vec![
            "High financing costs".into(),
            "Difficulty securing up-front capital".into(),
        ];
        let chart = bottleneck_lollipop(&[&a, &b], "Financing Bottlenecks", &CAPITAL_BOTTLENECKS);
        let Some(ChartBody::Lollipop { items }) = chart.body() else {
            panic!("expected lollipop");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].count, 1);
        assert_eq!(items[1].label, "High financing costs");
    }

    #[test]
    fn rates_parse_ranges() {
        assert_eq!(parse_rate("5%"), Some(5.0));
        assert_eq!(parse_rate("4-6%"), Some(5.0));
        assert_eq!(parse_rate("prime"), None);
    }

    #[test]
    fn indicators_pick_top_source_by_projects() {
        let a = record("a", &["Solar"], vec![entry("Equity", "Investor A", 10.0, 100.0)]);
        let b = record("b", &["Solar"], vec![entry("Equity", "Investor B", 10.0, 100.0)]);
        let c = record("c", &["Solar"], vec![entry("Equity", "Investor B", 10.0, 100.0)]);
        let ind = indicators(&capital_rows(&[&a, &b, &c]));
        assert_eq!(ind.equity.source, "Investor B (67% projects)");
        assert_eq!(ind.equity.mechanism, "Equity product (100% projects)");
        assert_eq!(ind.debt.interest, NOT_AVAILABLE);
        assert_eq!(ind.grants, CategoryIndicator::not_available());
    }

    #[test]
    fn empty_input_is_no_data_everywhere() {
        let charts = capital_charts(&[], &[], None);
        assert!(!charts.sankey.is_ready());
        assert!(!charts.box_plot.is_ready());
        assert_eq!(charts.indicators, Indicators::not_available());
    }
}
