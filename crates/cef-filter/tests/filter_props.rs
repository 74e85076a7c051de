//! Property tests for normalization and filtering

use cef_filter::{normalize, Epoch, Facet, FacetSelections, FilteredResult, ScanEngine};
use cef_record::{INDIGENOUS_OWNERSHIP_ORDER, PROJECT_SCALE_ORDER};
use cef_test_utils::{scenario_store, SCENARIO_ONTARIO, SCENARIO_SIZE};
use proptest::prelude::*;

fn pick(options: &'static [&'static str]) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(options), 0..4)
        .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

fn selections() -> impl Strategy<Value = FacetSelections> {
    (
        pick(&["ON", "BC", "AB", "QC", "NS", "MB", "SK", "YT"]),
        pick(&["Solar", "Wind", "Hydro", "Storage", "Bioenergy"]),
        pick(&["Planning", "Construction", "Operating"]),
        pick(&INDIGENOUS_OWNERSHIP_ORDER),
        pick(&PROJECT_SCALE_ORDER),
    )
        .prop_map(|(province, types, stage, indigenous, scale)| {
            FacetSelections::new()
                .with(Facet::Province, province)
                .with(Facet::ProjectType, types)
                .with(Facet::Stage, stage)
                .with(Facet::IndigenousOwnership, indigenous)
                .with(Facet::ProjectScale, scale)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Result is a subset and every member satisfies the predicate
    #[test]
    fn prop_filter_is_sound_subset(sel in selections()) {
        let store = scenario_store();
        let predicate = normalize(&sel).predicate;
        let result = FilteredResult::compute(&ScanEngine, store.clone(), predicate.clone(), Epoch::ZERO);

        prop_assert!(result.len() <= store.len());
        prop_assert!(result.iter().all(|r| predicate.matches(r)));
        prop_assert!(result.positions().windows(2).all(|w| w[0] < w[1]));

        let missed = store.iter().filter(|r| predicate.matches(r)).count();
        prop_assert_eq!(missed, result.len());
    }

    /// Filtering a filtered result again changes nothing
    #[test]
    fn prop_filter_is_idempotent(sel in selections()) {
        let predicate = normalize(&sel).predicate;
        let once = FilteredResult::compute(&ScanEngine, scenario_store(), predicate.clone(), Epoch::ZERO);
        let twice = once.narrow(&ScanEngine, predicate);
        prop_assert_eq!(once.positions(), twice.positions());
    }

    /// Normalization is stable under reordering and duplication
    #[test]
    fn prop_normalize_ignores_order(values in pick(&["ON", "BC", "AB", "QC"])) {
        let mut reversed = values.clone();
        reversed.reverse();
        reversed.extend(values.iter().cloned());

        let a = normalize(&FacetSelections::new().with(Facet::Province, values));
        let b = normalize(&FacetSelections::new().with(Facet::Province, reversed));
        prop_assert_eq!(a.predicate, b.predicate);
    }
}

#[test]
fn empty_facet_equals_absent_facet() {
    let store = scenario_store();
    let empty = normalize(&FacetSelections::new().with(Facet::Province, Vec::<String>::new()));
    let absent = normalize(&FacetSelections::new());

    let a = FilteredResult::compute(&ScanEngine, store.clone(), empty.predicate, Epoch::ZERO);
    let b = FilteredResult::compute(&ScanEngine, store, absent.predicate, Epoch::ZERO);
    pretty_assertions::assert_eq!(a.positions(), b.positions());
    assert_eq!(a.len(), SCENARIO_SIZE);
}

#[test]
fn ontario_has_forty_projects() {
    let predicate = normalize(&FacetSelections::new().with(Facet::Province, ["ON"])).predicate;
    let result = FilteredResult::compute(&ScanEngine, scenario_store(), predicate, Epoch::new(1));
    assert_eq!(result.len(), SCENARIO_ONTARIO);
}
