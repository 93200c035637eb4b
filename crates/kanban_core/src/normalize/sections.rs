//! Section list normalization.

use crate::model::section::{default_sections, slugify, Section};
use log::debug;
use serde_json::Value;
use std::collections::HashSet;

/// Normalizes a persisted section list.
///
/// Rules:
/// - non-array input → default sections;
/// - missing/blank labels become `Section <n>`, missing ids derive from
///   the label slug, then `section-<n>` (1-based position);
/// - later entries whose id repeats an accepted id are dropped;
/// - an empty result → default sections.
pub fn normalize_sections(source: &Value) -> Vec<Section> {
    let Some(items) = source.as_array() else {
        return default_sections();
    };

    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let position = index + 1;
        let (raw_id, raw_label) = match item {
            Value::Null => continue,
            Value::String(label) => (None, Some(label.trim())),
            other => (
                other.get("id").and_then(Value::as_str).map(str::trim),
                other.get("label").and_then(Value::as_str).map(str::trim),
            ),
        };

        let label = raw_label
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Section {position}"));
        let id = raw_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| Some(slugify(&label)).filter(|slug| !slug.is_empty()))
            .unwrap_or_else(|| format!("section-{position}"));

        if seen.insert(id.clone()) {
            sections.push(Section { id, label });
        } else {
            debug!("event=normalize_sections module=normalize status=dropped_duplicate id={id}");
        }
    }

    if sections.is_empty() {
        return default_sections();
    }
    sections
}

/// Drops later sections whose id was already seen.
pub fn dedupe_sections(sections: Vec<Section>) -> Vec<Section> {
    let mut seen = HashSet::new();
    sections
        .into_iter()
        .filter(|section| !section.id.is_empty() && seen.insert(section.id.clone()))
        .collect()
}
