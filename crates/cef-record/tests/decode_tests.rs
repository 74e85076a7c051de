//! Property tests for lenient record decoding

use cef_record::{ListField, Owner, ProjectRecord, RecordStore, Visibility};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arbitrary_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ,.%\\[\\]']{0,24}".prop_map(Value::String),
        Just(json!([{"owner_name": "A", "owner_percent": "40"}])),
        Just(json!({"owner_name": "B", "owner_percent": 60})),
    ]
}

proptest! {
    /// Any cell shape in a list column still yields a record
    #[test]
    fn prop_list_columns_never_reject_records(owners in arbitrary_cell(), mix in arbitrary_cell()) {
        let row = json!({"record_id": "r", "owners": owners, "capital_mix": mix});
        let record: Result<ProjectRecord, _> = serde_json::from_value(row);
        prop_assert!(record.is_ok());
    }

    /// Scalar cells in facet columns never reject records
    #[test]
    fn prop_facet_cells_are_lenient(province in arbitrary_cell(), cost in arbitrary_cell(), types in arbitrary_cell()) {
        let row = json!({
            "record_id": "r",
            "province": province,
            "total_cost": cost,
            "project_type": types,
        });
        let record: Result<ProjectRecord, _> = serde_json::from_value(row);
        prop_assert!(record.is_ok());
    }

    /// Store size equals public row count
    #[test]
    fn prop_store_keeps_public_rows(flags in prop::collection::vec(any::<bool>(), 0..50)) {
        let rows: Vec<_> = flags
            .iter()
            .enumerate()
            .map(|(i, anon)| ProjectRecord {
                anonymous_status: anon.then(|| "anon".to_string()),
                ..ProjectRecord::new(format!("r{i}"))
            })
            .collect();
        let public = flags.iter().filter(|a| !**a).count();

        let store = RecordStore::from_records(rows, Visibility::PublicOnly).unwrap();
        prop_assert_eq!(store.len(), public);
        prop_assert!(store.iter().all(|r| !r.is_private()));
    }
}

#[test]
fn owners_as_stringified_json() {
    let row = json!({
        "record_id": "r",
        "owners": "[{\"owner_name\": \"Co-op\", \"owner_type\": \"Community\", \"owner_percent\": \"75\"}]"
    });
    let record: ProjectRecord = serde_json::from_value(row).unwrap();
    pretty_assertions::assert_eq!(
        record.owners,
        ListField::Entries(vec![Owner::new("Co-op", "Community", 75.0)])
    );
}
