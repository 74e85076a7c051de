//! Ownership model charts

use crate::capital::bottleneck_lollipop;
use crate::chart::{percent_of, Chart, ChartBody, Count, Counter, PieGroup, Slice, Tally};
use cef_record::{Owner, ProjectRecord, RecordId, INDIGENOUS_OWNERSHIP_ORDER, PROJECT_SCALE_ORDER};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Bottlenecks shown on the ownership page
pub const OWNERSHIP_BOTTLENECKS: [&str; 3] = [
    "Challenges with project governance or decision-making",
    "Conflicts among stakeholders or partners",
    "Limited community engagement or support",
];

/// Combinations shown in the ownership-financing funnel
pub const FUNNEL_SIZE: usize = 10;

fn owner_rows<'a>(records: &[&'a ProjectRecord]) -> Vec<(&'a ProjectRecord, &'a Owner)> {
    records
        .iter()
        .flat_map(|&r| r.owners.as_slice().iter().map(move |o| (r, o)))
        .collect()
}

/// Ownership composition by owner type, by capital value and by stake
#[must_use]
pub fn ownership_treemap(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Ownership composition of community energy projects";

    let mut by_value: Tally<String> = Tally::default();
    let mut by_count: Tally<String> = Tally::default();
    for (record, owner) in owner_rows(records) {
        let Some(owner_type) = owner.owner_type.clone() else {
            continue;
        };
        let percent = finite_or_zero(owner.owner_percent);
        by_value.add(owner_type.clone(), percent / 100.0 * record.cost());
        by_count.add(owner_type, percent);
    }

    if by_count.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(
        TITLE,
        ChartBody::DualTreemap {
            by_value: by_value.into_slices(0.0),
            by_count: by_count.into_slices(0.0),
        },
    )
}

/// Owner-type stakes per project scale
#[must_use]
pub fn ownership_scale_pies(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Ownership composition by project scale";

    let rows = owner_rows(records);
    let pies: Vec<PieGroup> = PROJECT_SCALE_ORDER
        .iter()
        .filter_map(|scale| {
            let in_scale: Vec<_> = rows
                .iter()
                .filter(|(r, _)| r.project_scale.as_deref() == Some(*scale))
                .collect();
            if in_scale.is_empty() {
                return None;
            }
            let projects: HashSet<&RecordId> = in_scale.iter().map(|(r, _)| &r.record_id).collect();
            let mut stakes: Tally<String> = Tally::default();
            for (_, owner) in &in_scale {
                if let Some(owner_type) = &owner.owner_type {
                    stakes.add(owner_type.clone(), finite_or_zero(owner.owner_percent));
                }
            }
            Some(PieGroup {
                title: (*scale).to_string(),
                projects: projects.len(),
                slices: stakes.into_slices(5.0),
            })
        })
        .collect();

    if pies.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(TITLE, ChartBody::Pies { pies })
}

/// Distinct projects per indigenous ownership category, in ordinal order
///
/// Only projects that report owners are counted. Categories outside the
/// known order are listed after it.
#[must_use]
pub fn indigenous_ownership_stack(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Indigenous ownership";

    let mut projects: IndexMap<&str, HashSet<&RecordId>> = IndexMap::new();
    for (record, _) in owner_rows(records) {
        if let Some(category) = record.indigenous_ownership.as_deref() {
            projects.entry(category).or_default().insert(&record.record_id);
        }
    }

    if projects.is_empty() {
        return Chart::no_data(TITLE);
    }

    let rank = |category: &str| {
        INDIGENOUS_OWNERSHIP_ORDER
            .iter()
            .position(|c| *c == category)
            .unwrap_or(INDIGENOUS_OWNERSHIP_ORDER.len())
    };
    let mut counts: Vec<(&str, usize)> = projects.iter().map(|(c, ids)| (*c, ids.len())).collect();
    counts.sort_by_key(|(category, _)| rank(*category));

    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let slices = counts
        .into_iter()
        .map(|(category, n)| {
            let share = percent_of(n as f64, total as f64);
            Slice {
                label: category.to_string(),
                value: n as f64,
                share,
                text: format!("{share:.1}%  -  {category}"),
            }
        })
        .collect();

    Chart::ready(TITLE, ChartBody::StackedShares { slices })
}

/// Top owner type → financing category combinations
#[must_use]
pub fn ownership_financing_funnel(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Top ownership and financing combinations";

    let mut counter = Counter::default();
    for record in records {
        let owners = record.owners.as_slice();
        let mechanisms = record.financing_mech.as_slice();
        for owner in owners {
            for mech in mechanisms {
                counter.add(format!(
                    "{} → {}",
                    owner.owner_type.as_deref().unwrap_or("Unknown"),
                    mech.category.as_deref().unwrap_or("Unknown"),
                ));
            }
        }
    }

    if counter.is_empty() {
        return Chart::no_data(TITLE);
    }
    let stages: Vec<Count> = counter.descending().into_iter().take(FUNNEL_SIZE).collect();
    Chart::ready(TITLE, ChartBody::Funnel { stages })
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Every ownership chart for one filter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipCharts {
    pub treemap: Chart,
    pub scale_pies: Chart,
    pub indigenous_stack: Chart,
    pub bottlenecks: Chart,
    pub funnel: Chart,
}

/// Build the ownership bundle
#[must_use]
pub fn ownership_charts(records: &[&ProjectRecord]) -> OwnershipCharts {
    OwnershipCharts {
        treemap: ownership_treemap(records),
        scale_pies: ownership_scale_pies(records),
        indigenous_stack: indigenous_ownership_stack(records),
        bottlenecks: bottleneck_lollipop(records, "Ownership Bottlenecks", &OWNERSHIP_BOTTLENECKS),
        funnel: ownership_financing_funnel(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cef_record::FinancingMechanism;
    use cef_record::ListField;

    fn owned(id: &str, cost: f64, owners: Vec<Owner>) -> ProjectRecord {
        ProjectRecord::new(id).with_total_cost(cost).with_owners(owners)
    }

    #[test]
    fn treemap_values_weight_by_cost() {
        let a = owned("a", 1000.0, vec![Owner::new("Co-op", "Community", 50.0), Owner::new("Band", "Indigenous", 50.0)]);
        let b = owned("b", 3000.0, vec![Owner::new("Band", "Indigenous", 100.0)]);

        let chart = ownership_treemap(&[&a, &b]);
        let Some(ChartBody::DualTreemap { by_value, by_count }) = chart.body() else {
            panic!("expected dual treemap");
        };
        assert_eq!(by_value[0].label, "Community");
        assert!((by_value[0].value - 500.0).abs() < 1e-9);
        assert!((by_value[1].value - 3500.0).abs() < 1e-9);
        assert!((by_count[1].share - 75.0).abs() < 1e-9);
    }

    #[test]
    fn indigenous_stack_follows_ordinal_order() {
        let a = owned("a", 1.0, vec![Owner::new("x", "y", 100.0)])
            .with_indigenous_ownership("Wholly Indigenous owned (100%)");
        let b = owned("b", 1.0, vec![Owner::new("x", "y", 100.0)])
            .with_indigenous_ownership("Not sure");
        let c = ProjectRecord::new("c").with_indigenous_ownership("Not sure");

        let chart = indigenous_ownership_stack(&[&a, &b, &c]);
        let Some(ChartBody::StackedShares { slices }) = chart.body() else {
            panic!("expected stacked shares");
        };
        assert_eq!(slices[0].label, "Not sure");
        assert_eq!(slices[0].value, 1.0);
        assert_eq!(slices[1].label, "Wholly Indigenous owned (100%)");
    }

    #[test]
    fn funnel_pairs_owner_types_with_mechanisms() {
        let mut a = owned("a", 1.0, vec![Owner::new("x", "Community", 100.0)]);
        a.financing_mech = ListField::Entries(vec![
            FinancingMechanism {
                category: Some("Grants".into()),
                source: None,
            },
            FinancingMechanism::default(),
        ]);
        let chart = ownership_financing_funnel(&[&a]);
        let Some(ChartBody::Funnel { stages }) = chart.body() else {
            panic!("expected funnel");
        };
        let labels: Vec<_> = stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Community → Grants", "Community → Unknown"]);
    }

    #[test]
    fn no_owners_means_no_data() {
        let charts = ownership_charts(&[&ProjectRecord::new("a")]);
        assert!(!charts.treemap.is_ready());
        assert!(!charts.scale_pies.is_ready());
        assert!(!charts.indigenous_stack.is_ready());
        assert!(!charts.funnel.is_ready());
    }
}
