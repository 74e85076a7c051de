//! Lenient field decoding
//!
//! Upstream rows come from a spreadsheet-fed table. Numbers arrive as strings,
//! lists arrive as stringified literals (`"['Solar', 'Wind']"`) and blanks mean
//! "missing". These helpers are used with `#[serde(default, deserialize_with = ..)]`
//! so a single odd cell never rejects a whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number, numeric string, or 0.0
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or(0.0))
}

/// Number, numeric string, or `None`
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Non-blank string (numbers are stringified), or `None`
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_from_value(&value))
}

/// List of strings from an array, a stringified list literal, or a single value
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(strings_from_value(&value))
}

/// Interpret a JSON value as a number
#[must_use]
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().trim_end_matches('%').replace(',', "");
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Interpret a JSON value as a non-blank string
#[must_use]
pub fn string_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Interpret a JSON value as a list of strings
#[must_use]
pub fn strings_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(string_from_value).collect(),
        Value::String(s) => split_list_literal(s),
        Value::Null => Vec::new(),
        other => string_from_value(other).into_iter().collect(),
    }
}

/// Split `"['A', 'B']"` or `"[\"A\",\"B\"]"` into items; a bare string is one item
#[must_use]
pub fn split_list_literal(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if !trimmed.starts_with('[') {
        return vec![trimmed.to_string()];
    }

    trimmed
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_from_strings() {
        assert_eq!(number_from_value(&json!(12.5)), Some(12.5));
        assert_eq!(number_from_value(&json!("40")), Some(40.0));
        assert_eq!(number_from_value(&json!("1,250,000")), Some(1_250_000.0));
        assert_eq!(number_from_value(&json!("35%")), Some(35.0));
        assert_eq!(number_from_value(&json!("n/a")), None);
        assert_eq!(number_from_value(&json!("")), None);
        assert_eq!(number_from_value(&Value::Null), None);
    }

    #[test]
    fn blank_strings_are_missing() {
        assert_eq!(string_from_value(&json!("  ")), None);
        assert_eq!(string_from_value(&json!(" ON ")), Some("ON".to_string()));
        assert_eq!(string_from_value(&json!(7)), Some("7".to_string()));
    }

    #[test]
    fn list_literals() {
        assert_eq!(
            split_list_literal("['Solar', 'Wind']"),
            vec!["Solar".to_string(), "Wind".to_string()]
        );
        assert_eq!(
            split_list_literal("[\"Hydro\"]"),
            vec!["Hydro".to_string()]
        );
        assert_eq!(split_list_literal("Storage"), vec!["Storage".to_string()]);
        assert!(split_list_literal("[]").is_empty());
        assert!(split_list_literal("").is_empty());
    }

    #[test]
    fn arrays_skip_blank_items() {
        let list = strings_from_value(&json!(["Solar", "", null, "Wind"]));
        assert_eq!(list, vec!["Solar".to_string(), "Wind".to_string()]);
    }
}
