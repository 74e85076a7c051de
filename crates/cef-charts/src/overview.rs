//! Landing page overview (whole store, no filters)

use crate::chart::{Chart, ChartBody, SankeyLink, Tally};
use cef_record::ProjectRecord;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Headline numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_cost: f64,
    pub record_count: usize,
}

/// Sum of costs and number of records
#[must_use]
pub fn summary(records: &[&ProjectRecord]) -> Summary {
    Summary {
        total_cost: records.iter().map(|r| r.cost()).sum(),
        record_count: records.len(),
    }
}

/// Records per province abbreviation (full name when no abbreviation)
#[must_use]
pub fn province_pie(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Projects by province";

    let mut counts: Tally<String> = Tally::default();
    for record in records {
        if let Some(province) = record.province_abbr.as_ref().or(record.province.as_ref()) {
            counts.add(province.clone(), 1.0);
        }
    }
    if counts.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(
        TITLE,
        ChartBody::Pie {
            slices: counts.into_slices(0.0),
        },
    )
}

/// Capital flow category → project type, as reported
///
/// Each entry's amount is split evenly across the record's project types;
/// records without a project type are left out.
#[must_use]
pub fn capital_flow_overview(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Capital flow: Category → Project type";

    let mut flows: Tally<(String, String)> = Tally::default();
    for record in records {
        if record.project_type.is_empty() {
            continue;
        }
        let split = record.project_type.len() as f64;
        for entry in record.capital_mix.as_slice() {
            let Some(category) = entry.category.as_ref() else {
                continue;
            };
            if !entry.amount.is_finite() {
                continue;
            }
            for project_type in &record.project_type {
                flows.add((category.clone(), project_type.clone()), entry.amount / split);
            }
        }
    }

    let mut categories: IndexSet<String> = IndexSet::new();
    let mut types: IndexSet<String> = IndexSet::new();
    let entries: Vec<_> = flows
        .into_entries()
        .filter(|(_, value)| *value > 0.0)
        .inspect(|((category, project_type), _)| {
            categories.insert(category.clone());
            types.insert(project_type.clone());
        })
        .collect();

    if entries.is_empty() {
        return Chart::no_data(TITLE);
    }

    // Categories first, then project types
    let offset = categories.len();
    let links = entries
        .iter()
        .filter_map(|((category, project_type), value)| {
            Some(SankeyLink {
                source: categories.get_index_of(category)?,
                target: offset + types.get_index_of(project_type)?,
                value: *value,
            })
        })
        .collect();
    let nodes = categories.into_iter().chain(types).collect();

    Chart::ready(TITLE, ChartBody::Sankey { nodes, links })
}

/// Overview bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub summary: Summary,
    pub province_pie: Chart,
    pub capital_flow: Chart,
}

/// Build the overview
#[must_use]
pub fn overview(records: &[&ProjectRecord]) -> Overview {
    Overview {
        summary: summary(records),
        province_pie: province_pie(records),
        capital_flow: capital_flow_overview(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cef_record::CapitalMixEntry;

    #[test]
    fn summary_ignores_missing_costs() {
        let a = ProjectRecord::new("a").with_total_cost(10.0);
        let b = ProjectRecord::new("b");
        let s = summary(&[&a, &b]);
        assert_eq!(s.record_count, 2);
        assert_eq!(s.total_cost, 10.0);
    }

    #[test]
    fn province_pie_prefers_abbreviation() {
        let mut a = ProjectRecord::new("a").with_province("Ontario");
        a.province_abbr = Some("ON".into());
        let b = ProjectRecord::new("b").with_province("Quebec");

        let chart = province_pie(&[&a, &b]);
        let Some(ChartBody::Pie { slices }) = chart.body() else {
            panic!("expected pie");
        };
        assert_eq!(slices[0].label, "ON");
        assert_eq!(slices[1].label, "Quebec");
    }

    #[test]
    fn capital_flow_lists_categories_before_types() {
        let a = ProjectRecord::new("a")
            .with_project_types(["Solar", "Wind"])
            .with_capital_mix(vec![CapitalMixEntry::new("g", "Grants", 100.0, 100.0)]);
        let chart = capital_flow_overview(&[&a]);
        let Some(ChartBody::Sankey { nodes, links }) = chart.body() else {
            panic!("expected sankey");
        };
        assert_eq!(nodes, &vec!["Grants".to_string(), "Solar".into(), "Wind".into()]);
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].target, 2);
        assert_eq!(links[1].value, 50.0);
    }
}
