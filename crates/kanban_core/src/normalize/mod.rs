//! Normalization and schema migration of persisted workspace data.
//!
//! # Responsibility
//! - Coerce arbitrary deserialized JSON into canonical entities.
//! - Accept every historical on-disk shape and converge on the current one.
//!
//! # Invariants
//! - Normalizers never fail or panic; malformed input is substituted with
//!   schema-correct defaults.
//! - Normalizing already-normalized (serialized) output is a fixed point.

pub mod card;
pub mod checklist;
pub mod notes;
pub mod project;
pub mod resource;
pub mod sections;
pub mod task;
pub mod workspace;

use crate::model::ids::{EpochMs, NormalizeCtx};
use serde_json::Value;
use std::collections::HashSet;

/// Trims, drops blanks and removes repeated tags (first occurrence wins).
pub fn clean_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && seen.insert(trimmed.to_string()) {
            cleaned.push(trimmed.to_string());
        }
    }
    cleaned
}

/// Tags from a persisted array. Numbers and booleans are stringified.
pub(crate) fn tags_field(raw: &Value, key: &str) -> Vec<String> {
    let Some(items) = raw.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    let rendered: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        })
        .collect();
    clean_tags(rendered.iter().map(String::as_str))
}

/// String field as stored, or empty when missing or not a string.
pub(crate) fn text_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Trimmed string field, `None` when missing or blank.
pub(crate) fn trimmed_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Non-empty string id, or a fresh one.
pub(crate) fn id_field(raw: &Value, ctx: &mut NormalizeCtx<'_>) -> String {
    raw.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| ctx.next_id())
}

/// Finite numeric timestamp field.
pub(crate) fn timestamp_field(raw: &Value, key: &str) -> Option<EpochMs> {
    let value = raw.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.is_finite())
            .map(|number| number as EpochMs)
    })
}

/// Positional fallback timestamp that keeps legacy insertion order.
pub(crate) fn positional_timestamp(ctx: &NormalizeCtx<'_>, index: usize) -> EpochMs {
    ctx.now() - i64::try_from(index).unwrap_or(i64::MAX / 2)
}

#[cfg(test)]
mod tests {
    use super::{clean_tags, tags_field, timestamp_field};
    use serde_json::json;

    #[test]
    fn clean_tags_trims_and_dedupes() {
        let tags = clean_tags([" ux ", "", "ux", "api", "  "]);
        assert_eq!(tags, vec!["ux".to_string(), "api".to_string()]);
    }

    #[test]
    fn tags_field_stringifies_scalars_and_skips_objects() {
        let raw = json!({ "tags": ["a", 7, true, null, {"x": 1}, " a "] });
        assert_eq!(tags_field(&raw, "tags"), vec!["a", "7", "true"]);
    }

    #[test]
    fn timestamp_field_rejects_non_numbers() {
        assert_eq!(timestamp_field(&json!({ "t": 12.9 }), "t"), Some(12));
        assert_eq!(timestamp_field(&json!({ "t": "12" }), "t"), None);
        assert_eq!(timestamp_field(&json!({}), "t"), None);
    }
}
