//! Task normalization.

use crate::model::card::CardType;
use crate::model::ids::NormalizeCtx;
use crate::model::section::Section;
use crate::model::task::{Priority, Task};
use crate::normalize::card::normalize_card;
use crate::normalize::{
    id_field, positional_timestamp, tags_field, text_field, timestamp_field, trimmed_field,
};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Task-level keys that older generations used for card metadata.
const INLINE_META_KEYS: [&str; 9] = [
    "objective",
    "blocker",
    "progress",
    "milestone",
    "checklist",
    "checklistText",
    "reminder",
    "recurrence",
    "matrix",
];

/// Normalizes one persisted task.
///
/// `index` is the 0-based position in the source list; it drives the
/// `Task N` title fallback, the card-type cycle and the `now - index`
/// timestamp fallback that keeps legacy insertion order.
pub fn normalize_task(
    raw: &Value,
    index: usize,
    section_ids: &[String],
    fallback_status: &str,
    ctx: &mut NormalizeCtx<'_>,
) -> Task {
    let id = id_field(raw, ctx);
    let title = trimmed_field(raw, "title").unwrap_or_else(|| format!("Task {}", index + 1));
    let status = raw
        .get("status")
        .and_then(Value::as_str)
        .filter(|status| section_ids.iter().any(|id| id == status))
        .unwrap_or(fallback_status)
        .to_string();
    let priority = raw
        .get("priority")
        .and_then(Value::as_str)
        .and_then(Priority::from_key)
        .unwrap_or_default();
    let tags = tags_field(raw, "tags");
    let card_type = resolve_card_type(raw, &status, index);
    let card = normalize_card(
        card_type,
        &card_meta_source(raw),
        &status,
        priority,
        &tags,
        ctx,
    );
    let created_at =
        timestamp_field(raw, "createdAt").unwrap_or_else(|| positional_timestamp(ctx, index));

    Task {
        id,
        title,
        description: text_field(raw, "description"),
        status,
        priority,
        card,
        assignee: text_field(raw, "assignee"),
        due_date: text_field(raw, "dueDate"),
        tags,
        created_at,
    }
}

/// Normalizes a persisted task list against `sections`.
///
/// Returns `None` when `source` is not an array so the caller can choose
/// its own fallback. Null entries are dropped; later duplicate ids are
/// replaced with fresh ones.
pub fn normalize_tasks(
    source: &Value,
    sections: &[Section],
    ctx: &mut NormalizeCtx<'_>,
) -> Option<Vec<Task>> {
    let items = source.as_array()?;
    let section_ids: Vec<String> = sections.iter().map(|section| section.id.clone()).collect();
    let fallback_status = section_ids
        .first()
        .cloned()
        .unwrap_or_else(|| "backlog".to_string());

    let mut seen = HashSet::new();
    let tasks = items
        .iter()
        .filter(|item| !item.is_null())
        .enumerate()
        .map(|(index, item)| {
            let mut task = normalize_task(item, index, &section_ids, &fallback_status, ctx);
            if !seen.insert(task.id.clone()) {
                task.id = ctx.next_id();
                seen.insert(task.id.clone());
            }
            task
        })
        .collect();
    Some(tasks)
}

/// Stored card type, else the status default, else a positional cycle.
fn resolve_card_type(raw: &Value, status: &str, index: usize) -> CardType {
    raw.get("cardType")
        .and_then(Value::as_str)
        .and_then(CardType::from_key)
        .or_else(|| CardType::for_status(status))
        .unwrap_or(CardType::ALL[index % CardType::ALL.len()])
}

/// Merges `cardMeta` over inline metadata keys of older task shapes.
fn card_meta_source(raw: &Value) -> Value {
    let mut merged = Map::new();
    for key in INLINE_META_KEYS {
        if let Some(value) = raw.get(key) {
            merged.insert(key.to_string(), value.clone());
        }
    }
    if let Some(meta) = raw.get("cardMeta").and_then(Value::as_object) {
        for (key, value) in meta {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}
