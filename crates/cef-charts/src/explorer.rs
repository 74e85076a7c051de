//! Map points and project cards

use cef_record::{ProjectRecord, RecordId};
use serde::{Deserialize, Serialize};

/// One map marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub record_id: RecordId,
    pub project_name: Option<String>,
    pub community: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Display fields of a project card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCard {
    pub record_id: RecordId,
    pub project_name: String,
    pub data_source: String,
    pub stage: String,
    pub province: String,
    pub project_type: String,
    pub project_scale: String,
    pub indigenous_ownership: String,
    pub all_financing_mechanisms: String,
    pub total_cost: String,
}

/// Map markers for records with coordinates, in input order
pub fn map_points<'a>(records: impl IntoIterator<Item = &'a ProjectRecord>) -> Vec<MapPoint> {
    records
        .into_iter()
        .filter_map(|r| {
            let (latitude, longitude) = r.coordinates()?;
            Some(MapPoint {
                record_id: r.record_id.clone(),
                project_name: r.project_name.clone(),
                community: r.community.clone(),
                latitude,
                longitude,
            })
        })
        .collect()
}

/// Card display data for one record
#[must_use]
pub fn project_card(record: &ProjectRecord) -> ProjectCard {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    ProjectCard {
        record_id: record.record_id.clone(),
        project_name: text(&record.project_name),
        data_source: text(&record.data_source),
        stage: text(&record.stage),
        province: text(&record.province),
        project_type: record.project_type.join(", "),
        project_scale: text(&record.project_scale),
        indigenous_ownership: text(&record.indigenous_ownership),
        all_financing_mechanisms: record.all_financing_mechanisms.join(", "),
        total_cost: record
            .total_cost
            .filter(|c| c.is_finite())
            .map(format_thousands)
            .unwrap_or_default(),
    }
}

/// `1234567.8` → `"1,234,568"`
#[must_use]
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, digit) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if value < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1_234_567.8), "1,234,568");
        assert_eq!(format_thousands(-25_000.0), "-25,000");
    }

    #[test]
    fn records_without_coordinates_are_skipped() {
        let records = vec![
            ProjectRecord::new("a").with_coordinates(45.0, -75.0),
            ProjectRecord::new("b"),
        ];
        let points = map_points(&records);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].record_id.as_str(), "a");
    }

    #[test]
    fn card_joins_lists() {
        let mut record = ProjectRecord::new("a")
            .with_project_types(["Solar", "Storage"])
            .with_total_cost(1_500_000.0);
        record.all_financing_mechanisms = vec!["Grants".into(), "Debt".into()];

        let card = project_card(&record);
        assert_eq!(card.project_type, "Solar, Storage");
        assert_eq!(card.all_financing_mechanisms, "Grants, Debt");
        assert_eq!(card.total_cost, "1,500,000");
        assert_eq!(card.stage, "");
    }
}
