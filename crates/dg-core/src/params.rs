//! DG param values and the attribute normalizer.
//!
//! Normalization is a two-step pipeline:
//!
//! 1. [`select_dg_attributes`] filters the raw contact attributes down to the
//!    `dg_`-prefixed entries and strips the prefix.
//! 2. [`normalize_value`] trims each value and runs it through the
//!    [`scanner`](crate::scanner) to get a [`ParamValue`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::ATTRIBUTE_PREFIX;
use crate::errors::{ParamsError, Result};
use crate::scanner::scan;

// ─────────────────────────────────────────────────────────────────────────────
// ParamValue
// ─────────────────────────────────────────────────────────────────────────────

/// A single DG param value: one string, or an ordered list of two or more.
///
/// Serialized untagged, so the integrator receives either `"nova"` or
/// `["someTag1", "someTag2"]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Exactly one value.
    Scalar(String),
    /// Two or more values, in scan order.
    List(Vec<String>),
}

impl ParamValue {
    /// Build a value from scanned tokens. One token is always a `Scalar`.
    ///
    /// Returns `None` for an empty token list.
    pub fn from_tokens(mut tokens: Vec<String>) -> Option<Self> {
        match tokens.len() {
            0 => None,
            1 => tokens.pop().map(Self::Scalar),
            _ => Some(Self::List(tokens)),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ParamValueVisitor)
    }
}

/// Accepts a string, or a non-empty array of strings.
struct ParamValueVisitor;

impl<'de> Visitor<'de> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a non-empty array of strings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ParamValue, E> {
        Ok(ParamValue::Scalar(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<ParamValue, E> {
        Ok(ParamValue::Scalar(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<ParamValue, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(2));
        while let Some(element) = seq.next_element::<Value>()? {
            match element {
                Value::String(s) => values.push(s),
                other => {
                    return Err(de::Error::custom(format!(
                        "param arrays can only contain strings, found {}",
                        json_kind(&other)
                    )));
                }
            }
        }
        ParamValue::from_tokens(values)
            .ok_or_else(|| de::Error::custom("param arrays cannot be empty"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ParamSet
// ─────────────────────────────────────────────────────────────────────────────

/// DG params keyed by name (prefix already stripped).
///
/// Backed by a `BTreeMap` so that serialization order is stable regardless
/// of the order the platform delivered the attributes in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<String, ParamValue>);

impl ParamSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a param.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Insert or replace a param, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.0.insert(key.into(), value)
    }

    /// Whether the param is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of params.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no params.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalizer
// ─────────────────────────────────────────────────────────────────────────────

/// Pick out the `dg_` attributes and strip the prefix.
///
/// `None` and JSON `null` are treated as an empty mapping. Anything other
/// than an object, or a `dg_` attribute whose value is not a string, is
/// rejected. Attributes without the prefix are skipped whatever their value.
pub fn select_dg_attributes(raw: Option<&Value>) -> Result<Vec<(&str, &str)>> {
    let map = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ParamsError::InvalidAttributes {
                reason: format!("expected a key-value mapping, got {}", json_kind(other)),
            });
        }
    };

    map.iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(ATTRIBUTE_PREFIX)
                .map(|param_key| (key, param_key, value))
        })
        .map(|(key, param_key, value)| match value {
            Value::String(s) => Ok((param_key, s.as_str())),
            other => Err(ParamsError::InvalidAttributes {
                reason: format!("attribute `{key}` must be a string, got {}", json_kind(other)),
            }),
        })
        .collect()
}

/// Trim and scan one attribute value.
pub fn normalize_value(raw_value: &str) -> ParamValue {
    let tokens = scan(raw_value.trim());
    // `scan` never returns an empty list.
    ParamValue::from_tokens(tokens).unwrap_or_else(|| ParamValue::Scalar(String::new()))
}

/// Convert raw contact attributes into DG params, without post-processing.
pub fn normalize_attributes(raw: Option<&Value>) -> Result<ParamSet> {
    let selected = select_dg_attributes(raw)?;
    Ok(selected
        .into_iter()
        .map(|(key, value)| (key, normalize_value(value)))
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn list(values: &[&str]) -> ParamValue {
        ParamValue::List(values.iter().map(|v| (*v).to_string()).collect())
    }

    // ── ParamValue ──────────────────────────────────────────────────

    #[test]
    fn from_tokens_single_is_scalar() {
        assert_eq!(
            ParamValue::from_tokens(vec!["nova".into()]),
            Some(ParamValue::Scalar("nova".into()))
        );
    }

    #[test]
    fn from_tokens_many_is_list() {
        assert_eq!(
            ParamValue::from_tokens(vec!["a".into(), "b".into()]),
            Some(list(&["a", "b"]))
        );
    }

    #[test]
    fn from_tokens_empty_is_none() {
        assert_eq!(ParamValue::from_tokens(Vec::new()), None);
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_value(ParamValue::from("nova")).unwrap(), json!("nova"));
        assert_eq!(serde_json::to_value(list(&["a", "b"])).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn deserializes_string_and_array() {
        let v: ParamValue = serde_json::from_value(json!("nova")).unwrap();
        assert_eq!(v, ParamValue::from("nova"));
        let v: ParamValue = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(v, list(&["a", "b"]));
    }

    #[test]
    fn deserialize_single_element_array_collapses() {
        let v: ParamValue = serde_json::from_value(json!(["only"])).unwrap();
        assert_eq!(v, ParamValue::from("only"));
    }

    #[test]
    fn deserialize_rejects_empty_array() {
        let err = serde_json::from_value::<ParamValue>(json!([])).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn deserialize_rejects_non_string_elements() {
        let err = serde_json::from_value::<ParamValue>(json!(["a", 1])).unwrap_err();
        assert!(err.to_string().contains("only contain strings"));
    }

    #[test]
    fn deserialize_rejects_numbers_and_objects() {
        assert!(serde_json::from_value::<ParamValue>(json!(5)).is_err());
        assert!(serde_json::from_value::<ParamValue>(json!({"a": "b"})).is_err());
        assert!(serde_json::from_value::<ParamValue>(json!(null)).is_err());
    }

    // ── ParamSet ────────────────────────────────────────────────────

    #[test]
    fn param_set_serializes_in_key_order() {
        let set: ParamSet = [("tag", ParamValue::from("t")), ("model", ParamValue::from("nova"))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"model":"nova","tag":"t"}"#);
    }

    #[test]
    fn param_set_insert_replaces() {
        let mut set = ParamSet::new();
        assert!(set.insert("model", ParamValue::from("base")).is_none());
        let prev = set.insert("model", ParamValue::from("nova"));
        assert_eq!(prev, Some(ParamValue::from("base")));
        assert_eq!(set.len(), 1);
    }

    // ── select_dg_attributes ────────────────────────────────────────

    #[test]
    fn select_none_is_empty() {
        assert!(select_dg_attributes(None).unwrap().is_empty());
    }

    #[test]
    fn select_null_is_empty() {
        assert!(select_dg_attributes(Some(&Value::Null)).unwrap().is_empty());
    }

    #[test]
    fn select_rejects_non_mapping() {
        for raw in [json!([1, 2]), json!("dg_model=nova"), json!(42), json!(true)] {
            assert_matches!(
                select_dg_attributes(Some(&raw)),
                Err(ParamsError::InvalidAttributes { .. })
            );
        }
    }

    #[test]
    fn select_skips_unprefixed_keys() {
        let raw = json!({"dg_model": "nova", "something": "else", "DG_tag": "x"});
        let selected = select_dg_attributes(Some(&raw)).unwrap();
        assert_eq!(selected, vec![("model", "nova")]);
    }

    #[test]
    fn select_ignores_non_string_values_on_unprefixed_keys() {
        let raw = json!({"dg_model": "nova", "count": 3});
        assert_eq!(select_dg_attributes(Some(&raw)).unwrap().len(), 1);
    }

    #[test]
    fn select_rejects_non_string_dg_value() {
        let raw = json!({"dg_model": 3});
        let err = select_dg_attributes(Some(&raw)).unwrap_err();
        assert!(err.to_string().contains("dg_model"));
    }

    // ── normalize ───────────────────────────────────────────────────

    #[test]
    fn normalize_value_trims_before_scanning() {
        assert_eq!(normalize_value("  nova  "), ParamValue::from("nova"));
        assert_eq!(normalize_value("\ta b\n"), list(&["a", "b"]));
    }

    #[test]
    fn normalize_value_empty_is_empty_scalar() {
        assert_eq!(normalize_value("   "), ParamValue::from(""));
    }

    #[test]
    fn normalize_keeps_list_order() {
        let raw = json!({"dg_keywords": "alpha beta gamma"});
        let params = normalize_attributes(Some(&raw)).unwrap();
        assert_eq!(params.get("keywords"), Some(&list(&["alpha", "beta", "gamma"])));
    }

    #[test]
    fn normalize_does_not_post_process() {
        let raw = json!({"dg_model": "nova"});
        let params = normalize_attributes(Some(&raw)).unwrap();
        assert_eq!(params.len(), 1);
        assert!(!params.contains_key("tag"));
    }

    #[test]
    fn normalize_empty_mapping() {
        assert!(normalize_attributes(Some(&json!({}))).unwrap().is_empty());
    }
}
