//! Outcomes and impacts charts

use crate::capital::count_labels;
use crate::chart::{Chart, ChartBody, JobsPhase};
use cef_record::ProjectRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Count per indigenous agreement type
#[must_use]
pub fn indigenous_agreements(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Indigenous agreements";

    let counts = count_labels(
        records
            .iter()
            .flat_map(|r| r.indigenous_agreements.iter().map(String::as_str)),
    );
    if counts.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(TITLE, ChartBody::Counts { counts })
}

/// Full-time and part-time jobs per phase
#[must_use]
pub fn jobs(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "Jobs created by phase";

    let mut phases: IndexMap<&str, JobsPhase> = IndexMap::new();
    for record in records {
        for entry in record.jobs.as_slice() {
            let Some(phase) = entry.phase.as_deref() else {
                continue;
            };
            let totals = phases.entry(phase).or_insert_with(|| JobsPhase {
                phase: phase.to_string(),
                full_time: 0.0,
                part_time: 0.0,
                full_time_reports: 0,
                part_time_reports: 0,
            });
            if let Some(n) = entry.full_time.filter(|n| n.is_finite()) {
                totals.full_time += n;
                totals.full_time_reports += 1;
            }
            if let Some(n) = entry.part_time.filter(|n| n.is_finite()) {
                totals.part_time += n;
                totals.part_time_reports += 1;
            }
        }
    }

    if phases.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(
        TITLE,
        ChartBody::Jobs {
            phases: phases.into_values().collect(),
        },
    )
}

/// GHG reduction tools and who calculated the reductions
#[must_use]
pub fn ghg_methodology(records: &[&ProjectRecord]) -> Chart {
    const TITLE: &str = "GHG methodology";

    let tools = count_labels(
        records
            .iter()
            .flat_map(|r| r.ghg_tools.iter().map(String::as_str)),
    );
    let who = count_labels(records.iter().filter_map(|r| r.ghg_who.as_deref()));

    if tools.is_empty() && who.is_empty() {
        return Chart::no_data(TITLE);
    }
    Chart::ready(TITLE, ChartBody::Methodology { tools, who })
}

/// Every outcomes chart for one filter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCharts {
    pub agreements: Chart,
    pub jobs: Chart,
    pub ghg_methodology: Chart,
}

/// Build the outcomes bundle
#[must_use]
pub fn outcome_charts(records: &[&ProjectRecord]) -> OutcomeCharts {
    OutcomeCharts {
        agreements: indigenous_agreements(records),
        jobs: jobs(records),
        ghg_methodology: ghg_methodology(records),
    }
}
