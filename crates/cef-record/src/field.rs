//! Tolerant list columns
//!
//! `owners` and `capital_mix` are JSON columns filled by hand. A record must
//! still load when one of them is garbage; the problem is reported later, when
//! something actually needs the entries.

use crate::error::FieldError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A list column that never fails record deserialization
///
/// Decoding rules:
/// - `null` or absent: empty list
/// - a single object: one entry
/// - an array: its object elements (anything else in the array is skipped)
/// - a string holding JSON: decoded as above
/// - any other shape: [`ListField::Malformed`]
#[derive(Debug, Clone, PartialEq)]
pub enum ListField<T> {
    /// Decoded entries
    Entries(Vec<T>),
    /// The raw value could not be read as a list
    Malformed(String),
}

impl<T> Default for ListField<T> {
    fn default() -> Self {
        Self::Entries(Vec::new())
    }
}

impl<T> From<Vec<T>> for ListField<T> {
    fn from(entries: Vec<T>) -> Self {
        Self::Entries(entries)
    }
}

impl<T: DeserializeOwned> ListField<T> {
    /// Decode from a raw JSON value
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Entries(Vec::new()),
            Value::Object(_) => match serde_json::from_value::<T>(value) {
                Ok(entry) => Self::Entries(vec![entry]),
                Err(e) => Self::Malformed(e.to_string()),
            },
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .map(serde_json::from_value::<T>)
                .collect::<Result<Vec<_>, _>>()
                .map_or_else(|e| Self::Malformed(e.to_string()), Self::Entries),
            Value::String(s) => match serde_json::from_str::<Value>(&s) {
                Ok(inner @ (Value::Array(_) | Value::Object(_) | Value::Null)) => {
                    Self::from_value(inner)
                }
                _ if s.trim().is_empty() => Self::Entries(Vec::new()),
                _ => Self::Malformed(format!("expected a list, found text {s:?}")),
            },
            Value::Bool(b) => Self::Malformed(format!("expected a list, found boolean {b}")),
            Value::Number(n) => Self::Malformed(format!("expected a list, found number {n}")),
        }
    }
}

impl<T> ListField<T> {
    /// Entries, or the decoding problem attributed to `field`
    ///
    /// # Errors
    /// Returns [`FieldError`] when the column was malformed
    pub fn entries(&self, field: &'static str) -> Result<&[T], FieldError> {
        match self {
            Self::Entries(entries) => Ok(entries),
            Self::Malformed(reason) => Err(FieldError::new(field, reason.clone())),
        }
    }

    /// Entries, treating a malformed column as empty
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Entries(entries) => entries,
            Self::Malformed(_) => &[],
        }
    }

    /// Check whether the column failed to decode
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Check whether there are no usable entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ListField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl<T: Serialize> Serialize for ListField<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Entries(entries) => entries.serialize(serializer),
            Self::Malformed(_) => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    struct Entry {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn null_is_empty() {
        let field = ListField::<Entry>::from_value(Value::Null);
        assert_eq!(field, ListField::Entries(vec![]));
        assert!(field.is_empty());
    }

    #[test]
    fn single_object_becomes_one_entry() {
        let field = ListField::<Entry>::from_value(json!({"name": "a"}));
        assert_eq!(field.as_slice().len(), 1);
    }

    #[test]
    fn non_objects_in_array_are_skipped() {
        let field = ListField::<Entry>::from_value(json!([{"name": "a"}, 3, "x", {"name": "b"}]));
        let names: Vec<_> = field.as_slice().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn stringified_json_is_decoded() {
        let field = ListField::<Entry>::from_value(json!("[{\"name\": \"a\"}]"));
        assert_eq!(field.as_slice().len(), 1);
    }

    #[test]
    fn scalars_are_malformed() {
        let field = ListField::<Entry>::from_value(json!(42));
        assert!(field.is_malformed());
        assert!(field.as_slice().is_empty());

        let err = field.entries("owners").unwrap_err();
        assert_eq!(err.field, "owners");
        assert!(err.reason.contains("number"));

        assert!(ListField::<Entry>::from_value(json!("not a list")).is_malformed());
        assert!(ListField::<Entry>::from_value(json!(true)).is_malformed());
    }

    #[test]
    fn malformed_serializes_as_null() {
        let field = ListField::<Entry>::Malformed("bad".into());
        assert_eq!(serde_json::to_value(&field).unwrap(), Value::Null);
    }
}
