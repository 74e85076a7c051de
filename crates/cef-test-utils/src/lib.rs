//! Testing utilities for the financing explorer workspace
//!
//! Deterministic synthetic records shared by the crates' tests.

#![allow(missing_docs)]

use cef_record::{
    CapitalMixEntry, DebtEntry, FinancingMechanism, JobEntry, ListField, Owner, ProjectRecord,
    RecordStore, Visibility, INDIGENOUS_OWNERSHIP_ORDER, PROJECT_SCALE_ORDER,
};
use std::sync::Arc;

/// Visible records in the scenario store
pub const SCENARIO_SIZE: usize = 521;

/// Visible Ontario records in the scenario store
pub const SCENARIO_ONTARIO: usize = 40;

/// Filtered index of the one record with a malformed capital mix
pub const MALFORMED_INDEX: usize = 7;

const OTHER_PROVINCES: [&str; 6] = ["BC", "AB", "QC", "NS", "MB", "SK"];
const PROJECT_TYPES: [&str; 5] = ["Solar", "Wind", "Hydro", "Storage", "Bioenergy"];
const STAGES: [&str; 3] = ["Planning", "Construction", "Operating"];

pub fn record(id: &str) -> ProjectRecord {
    ProjectRecord::new(id)
}

pub fn store_of(rows: Vec<ProjectRecord>) -> Arc<RecordStore> {
    Arc::new(RecordStore::from_records(rows, Visibility::All).unwrap())
}

/// Capital mix with the given percents over one total amount
pub fn capital_mix(percents: &[f64], total_amount: f64) -> Vec<CapitalMixEntry> {
    let categories = ["Grants", "Debt", "Equity", "Community"];
    percents
        .iter()
        .enumerate()
        .map(|(i, pct)| {
            CapitalMixEntry::new(
                format!("Instrument {i}"),
                categories[i % categories.len()],
                pct / 100.0 * total_amount,
                *pct,
            )
            .with_source(format!("Source {}", i % 3))
            .with_item_type(format!("Mechanism {}", i % 2))
        })
        .collect()
}

/// Record whose capital mix only accounts for 60% of the cost
pub fn sixty_percent_record() -> ProjectRecord {
    record("sixty")
        .with_total_cost(1_000_000.0)
        .with_capital_mix(capital_mix(&[30.0, 30.0], 600_000.0))
}

/// Record whose `capital_mix` column is not a list
pub fn malformed_record(id: &str) -> ProjectRecord {
    ProjectRecord {
        capital_mix: ListField::Malformed("expected a list, found number 42".into()),
        ..record(id)
    }
}

/// One fully populated synthetic record
pub fn synthetic_record(i: usize) -> ProjectRecord {
    let province = if i % 13 == 1 {
        "ON"
    } else {
        OTHER_PROVINCES[i % OTHER_PROVINCES.len()]
    };
    let cost = 50_000.0 * ((i % 40) as f64 + 1.0);

    let mut r = record(&format!("p{i:04}"))
        .with_name(format!("Project {i}"))
        .with_province(province)
        .with_stage(STAGES[i % STAGES.len()])
        .with_project_types(
            [PROJECT_TYPES[i % PROJECT_TYPES.len()], PROJECT_TYPES[(i / 5) % PROJECT_TYPES.len()]]
                .into_iter()
                .collect::<std::collections::BTreeSet<_>>(),
        )
        .with_indigenous_ownership(INDIGENOUS_OWNERSHIP_ORDER[i % INDIGENOUS_OWNERSHIP_ORDER.len()])
        .with_scale(PROJECT_SCALE_ORDER[i % PROJECT_SCALE_ORDER.len()])
        .with_total_cost(cost)
        .with_owners(vec![
            Owner::new("Community Co-op", "Community", 60.0),
            Owner::new("First Nation", "Indigenous", 40.0),
        ])
        .with_capital_mix(capital_mix(&[50.0, 30.0, 20.0], cost));

    r.community = Some(format!("Town {}", i % 17));
    r.province_abbr = Some(province.to_string());
    if i % 50 != 0 {
        r = r.with_coordinates(43.0 + (i % 10) as f64, -80.0 - (i % 20) as f64);
    }
    r.debt = ListField::Entries(vec![DebtEntry {
        debt_name: Some("Instrument 1".into()),
        debt_source: Some("Source 1".into()),
        debt_interest: Some(if i % 2 == 0 { "4-6%".into() } else { "5%".into() }),
        debt_repayment: Some("10 years".into()),
    }]);
    r.financing_mech = ListField::Entries(vec![FinancingMechanism {
        category: Some("Grants".into()),
        source: Some(format!("Source {}", i % 3)),
    }]);
    r.bottlenecks = vec!["High financing costs".into()];
    r.indigenous_agreements = vec!["Impact benefit agreement".into()];
    r.jobs = ListField::Entries(vec![JobEntry {
        phase: Some("Construction".into()),
        full_time: Some(2.0),
        part_time: Some(1.0),
    }]);
    r.ghg_tools = vec!["RETScreen".into()];
    r.ghg_who = Some("Consultant".into());
    r
}

/// Rows behind the scenario store: 521 public rows plus 3 anonymous ones
pub fn scenario_rows() -> Vec<ProjectRecord> {
    let mut rows: Vec<_> = (0..SCENARIO_SIZE).map(synthetic_record).collect();
    rows[MALFORMED_INDEX] = ProjectRecord {
        capital_mix: ListField::Malformed("expected a list, found text \"tbd\"".into()),
        ..rows[MALFORMED_INDEX].clone()
    };
    for k in 0..3 {
        rows.push(ProjectRecord {
            anonymous_status: Some("anon".into()),
            ..record(&format!("anon{k}")).with_province("ON")
        });
    }
    rows
}

/// Privacy-filtered scenario store (521 records, 40 in ON)
pub fn scenario_store() -> Arc<RecordStore> {
    Arc::new(RecordStore::from_records(scenario_rows(), Visibility::PublicOnly).unwrap())
}
