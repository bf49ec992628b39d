//! Typed input parameters.
//!
//! Requests carry an untyped name → `{rawValue, type}` mapping. This module
//! converts it into a typed mapping with two properties the rest of the
//! service relies on:
//!
//! - keys are case-insensitive (folded to lowercase on read and write), and
//! - a malformed entry collapses to an *absent* value instead of failing the
//!   whole mapping.
//!
//! Declared types are `String`, `Integer`, `Float`, and `Unknown` (treated
//! as a string). Anything else, a missing `rawValue`/`type` field, or a
//! failed coercion yields an absent value for that key.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Integer parameter.
    Int(i64),
    /// Floating-point parameter.
    Float(f64),
    /// String parameter (also used for `Unknown`-typed entries).
    Str(String),
}

impl TypedValue {
    /// View the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// View the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// View the value as a float. Integers widen.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(v) => Some(*v),
            TypedValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Render the value as a string for loader handoff.
    pub fn render(&self) -> String {
        match self {
            TypedValue::Str(s) => s.clone(),
            TypedValue::Int(v) => v.to_string(),
            TypedValue::Float(v) => v.to_string(),
        }
    }
}

/// Case-insensitive typed parameter map.
///
/// Absent values are kept as explicit `None` entries so that "the key was
/// sent but unusable" and "the key was never sent" both read back as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedParams {
    entries: FxHashMap<String, Option<TypedValue>>,
}

impl TypedParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a typed map from the raw request mapping.
    ///
    /// A non-object input produces an empty map; each entry is converted
    /// independently and failures collapse to absent values.
    pub fn from_raw(raw: &Value) -> Self {
        let mut params = Self::new();
        if let Some(object) = raw.as_object() {
            for (name, entry) in object {
                params.entries
                    .insert(name.to_lowercase(), convert_entry(entry));
            }
        }
        params
    }

    /// Insert a typed value under a case-folded key.
    pub fn insert(&mut self, name: impl AsRef<str>, value: TypedValue) {
        self.entries
            .insert(name.as_ref().to_lowercase(), Some(value));
    }

    /// Look up a parameter, case-insensitively.
    ///
    /// Returns `None` both for missing keys and for entries whose conversion
    /// collapsed to an absent value.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.entries
            .get(&name.to_lowercase())
            .and_then(Option::as_ref)
    }

    /// Look up a string parameter.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(TypedValue::as_str)
    }

    /// Look up an integer parameter.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(TypedValue::as_i64)
    }

    /// Merge another map into this one. Entries from `other` win.
    pub fn merge(&mut self, other: &TypedParams) {
        for (name, value) in &other.entries {
            self.entries.insert(name.clone(), value.clone());
        }
    }

    /// Iterate over present (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// Number of entries, including absent ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convert one raw `{rawValue, type}` entry to a typed value.
fn convert_entry(entry: &Value) -> Option<TypedValue> {
    let object = entry.as_object()?;
    let raw = object.get("rawValue")?;
    let declared = object.get("type")?.as_str()?;

    match declared {
        "String" | "Unknown" => Some(TypedValue::Str(stringify(raw))),
        "Integer" => coerce_integer(raw),
        "Float" => coerce_float(raw),
        _ => None,
    }
}

/// Render a raw JSON value as a string parameter.
fn stringify(raw: &Value) -> String {
    match raw.as_str() {
        Some(s) => s.to_string(),
        None => raw.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_integer(raw: &Value) -> Option<TypedValue> {
    if let Some(v) = raw.as_i64() {
        return Some(TypedValue::Int(v));
    }
    if let Some(v) = raw.as_f64() {
        return Some(TypedValue::Int(v.trunc() as i64));
    }
    raw.as_str()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(TypedValue::Int)
}

fn coerce_float(raw: &Value) -> Option<TypedValue> {
    if let Some(v) = raw.as_f64() {
        return Some(TypedValue::Float(v));
    }
    raw.as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(TypedValue::Float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_lookup() {
        let params = TypedParams::from_raw(&json!({
            "Token": { "rawValue": "abc123", "type": "Unknown" }
        }));

        assert_eq!(params.get_str("token"), Some("abc123"));
        assert_eq!(params.get_str("TOKEN"), Some("abc123"));
        assert_eq!(params.get_str("Token"), Some("abc123"));
    }

    #[test]
    fn test_upper_and_mixed_case_keys_agree() {
        let lower = TypedParams::from_raw(&json!({
            "Token": { "rawValue": "x", "type": "String" }
        }));
        let upper = TypedParams::from_raw(&json!({
            "TOKEN": { "rawValue": "x", "type": "String" }
        }));
        assert_eq!(lower.get("token"), upper.get("token"));
    }

    #[test]
    fn test_integer_coercion() {
        let params = TypedParams::from_raw(&json!({
            "shots": { "rawValue": "2048", "type": "Integer" },
            "reps": { "rawValue": 7, "type": "Integer" }
        }));
        assert_eq!(params.get_i64("shots"), Some(2048));
        assert_eq!(params.get_i64("reps"), Some(7));
    }

    #[test]
    fn test_float_coercion() {
        let params = TypedParams::from_raw(&json!({
            "theta": { "rawValue": "0.5", "type": "Float" }
        }));
        assert_eq!(params.get("theta"), Some(&TypedValue::Float(0.5)));
    }

    #[test]
    fn test_malformed_entries_collapse_to_absent() {
        let params = TypedParams::from_raw(&json!({
            "missing_type": { "rawValue": "x" },
            "missing_value": { "type": "String" },
            "bad_tag": { "rawValue": "x", "type": "Complex" },
            "bad_int": { "rawValue": "not a number", "type": "Integer" },
            "not_an_object": 42
        }));

        assert_eq!(params.len(), 5);
        assert!(params.get("missing_type").is_none());
        assert!(params.get("missing_value").is_none());
        assert!(params.get("bad_tag").is_none());
        assert!(params.get("bad_int").is_none());
        assert!(params.get("not_an_object").is_none());
    }

    #[test]
    fn test_non_object_input_is_empty() {
        assert!(TypedParams::from_raw(&json!("")).is_empty());
        assert!(TypedParams::from_raw(&json!(null)).is_empty());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = TypedParams::new();
        base.insert("token", TypedValue::Str("old".into()));

        let mut update = TypedParams::new();
        update.insert("TOKEN", TypedValue::Str("new".into()));
        update.insert("counts", TypedValue::Str("{\"00\": 512}".into()));

        base.merge(&update);
        assert_eq!(base.get_str("token"), Some("new"));
        assert_eq!(base.get_str("counts"), Some("{\"00\": 512}"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut params = TypedParams::new();
        params.insert("token", TypedValue::Str("abc".into()));
        params.insert("shots", TypedValue::Int(1024));

        let json = serde_json::to_string(&params).unwrap();
        let back: TypedParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get_str("token"), Some("abc"));
        assert_eq!(back.get_i64("shots"), Some(1024));
    }
}
