//! Card metadata sub-normalizer.
//!
//! # Invariants
//! - The returned card always matches the requested `CardType`.
//! - Progress values are integers clamped to `0..=100`.

use crate::model::card::{Card, CardType, ChecklistItem, MatrixAction, RecurrenceRule};
use crate::model::ids::NormalizeCtx;
use crate::model::task::Priority;
use crate::normalize::checklist::parse_checklist_text;
use crate::normalize::trimmed_field;
use serde_json::Value;
use std::collections::HashSet;

/// Maximum number of tags turned into checklist items.
const CHECKLIST_TAG_SEED_LIMIT: usize = 3;

/// Default progress for the built-in sections.
pub fn status_progress(status: &str) -> u8 {
    match status {
        "in-progress" => 50,
        "review" => 80,
        "done" => 100,
        _ => 0,
    }
}

/// Clamps a stored progress value to `0..=100`.
///
/// Numbers and numeric strings are rounded; anything else yields
/// `fallback`.
pub fn clamp_progress(value: &Value, fallback: u8) -> u8 {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) if !text.trim().is_empty() => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number.filter(|number| number.is_finite()) {
        Some(number) => number.round().clamp(0.0, 100.0) as u8,
        None => fallback.min(100),
    }
}

/// Metadata-free card of the given type, seeded from task fields.
pub fn default_card(
    card_type: CardType,
    status: &str,
    priority: Priority,
    tags: &[String],
    ctx: &mut NormalizeCtx<'_>,
) -> Card {
    normalize_card(card_type, &Value::Null, status, priority, tags, ctx)
}

/// Builds the card for `card_type` from persisted metadata.
///
/// `source` is the stored `cardMeta` object merged over legacy top-level
/// task fields (`checklist`, `progress`, ...), so older generations that
/// kept metadata inline are still read.
pub fn normalize_card(
    card_type: CardType,
    source: &Value,
    status: &str,
    priority: Priority,
    tags: &[String],
    ctx: &mut NormalizeCtx<'_>,
) -> Card {
    match card_type {
        CardType::Basic => Card::Basic,
        CardType::Focus => Card::Focus {
            objective: trimmed_field(source, "objective").unwrap_or_default(),
            blocker: trimmed_field(source, "blocker").unwrap_or_default(),
        },
        CardType::Progress => {
            let stored = source
                .get("value")
                .or_else(|| source.get("progress"))
                .unwrap_or(&Value::Null);
            Card::Progress {
                value: clamp_progress(stored, status_progress(status)),
                milestone: trimmed_field(source, "milestone").unwrap_or_default(),
            }
        }
        CardType::Checklist => Card::Checklist {
            items: checklist_items(source, tags, ctx),
        },
        CardType::Deadline => Card::Deadline {
            reminder: trimmed_field(source, "reminder").unwrap_or_default(),
        },
        CardType::Recurring => Card::Recurring {
            rule: ["rule", "recurrence"]
                .iter()
                .find_map(|key| source.get(*key).and_then(Value::as_str))
                .and_then(RecurrenceRule::from_key)
                .unwrap_or_default(),
        },
        CardType::Priority => Card::Priority {
            action: ["action", "matrix"]
                .iter()
                .find_map(|key| source.get(*key).and_then(Value::as_str))
                .and_then(MatrixAction::from_key)
                .unwrap_or_else(|| MatrixAction::for_priority(priority)),
        },
    }
}

/// Reads checklist content from `items`/`checklist` lists or a text blob.
///
/// With no checklist content at all, the first tags seed open items.
fn checklist_items(
    source: &Value,
    tags: &[String],
    ctx: &mut NormalizeCtx<'_>,
) -> Vec<ChecklistItem> {
    let mut items = Vec::new();
    for key in ["items", "checklist", "checklistText"] {
        match source.get(key) {
            Some(Value::Array(list)) => {
                items = structured_items(list, ctx);
            }
            Some(Value::String(text)) => {
                items = parse_checklist_text(text, ctx);
            }
            _ => continue,
        }
        if !items.is_empty() {
            break;
        }
    }

    if items.is_empty() {
        items = tags
            .iter()
            .take(CHECKLIST_TAG_SEED_LIMIT)
            .map(|tag| ChecklistItem {
                id: ctx.next_id(),
                label: tag.clone(),
                done: false,
            })
            .collect();
    }
    items
}

fn structured_items(list: &[Value], ctx: &mut NormalizeCtx<'_>) -> Vec<ChecklistItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(list.len());
    for entry in list {
        let (label, done, id) = match entry {
            Value::String(label) => (label.trim().to_string(), false, None),
            other => (
                trimmed_field(other, "label")
                    .or_else(|| trimmed_field(other, "text"))
                    .unwrap_or_default(),
                other.get("done").and_then(Value::as_bool).unwrap_or(false),
                other
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            ),
        };
        if label.is_empty() {
            continue;
        }
        let id = id
            .filter(|id| !seen.contains(id))
            .unwrap_or_else(|| ctx.next_id());
        seen.insert(id.clone());
        items.push(ChecklistItem { id, label, done });
    }
    items
}

#[cfg(test)]
mod tests {
    use super::{clamp_progress, default_card, normalize_card};
    use crate::model::card::{Card, CardType, MatrixAction, RecurrenceRule};
    use crate::model::ids::{NormalizeCtx, SequentialIdGenerator};
    use crate::model::task::Priority;
    use serde_json::json;

    #[test]
    fn clamp_progress_bounds_and_fallbacks() {
        assert_eq!(clamp_progress(&json!(150), 0), 100);
        assert_eq!(clamp_progress(&json!(-4), 30), 0);
        assert_eq!(clamp_progress(&json!(49.5), 0), 50);
        assert_eq!(clamp_progress(&json!("abc"), 40), 40);
        assert_eq!(clamp_progress(&json!(" 70 "), 0), 70);
        assert_eq!(clamp_progress(&json!(null), 80), 80);
    }

    #[test]
    fn progress_defaults_follow_status() {
        let mut ids = SequentialIdGenerator::new("c");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let card = default_card(CardType::Progress, "review", Priority::Medium, &[], &mut ctx);
        assert_eq!(
            card,
            Card::Progress {
                value: 80,
                milestone: String::new()
            }
        );
    }

    #[test]
    fn checklist_prefers_items_then_text_then_tags() {
        let mut ids = SequentialIdGenerator::new("c");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let tags = vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
        ];

        let from_text = normalize_card(
            CardType::Checklist,
            &json!({ "checklist": "[x] one\n[ ] two" }),
            "backlog",
            Priority::Medium,
            &tags,
            &mut ctx,
        );
        assert_eq!(from_text.checklist_progress(), Some((1, 2)));

        let from_tags = normalize_card(
            CardType::Checklist,
            &json!({ "items": [] }),
            "backlog",
            Priority::Medium,
            &tags,
            &mut ctx,
        );
        match from_tags {
            Card::Checklist { items } => {
                let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
                assert_eq!(labels, vec!["a", "b", "c"]);
            }
            other => panic!("unexpected card: {other:?}"),
        }
    }

    #[test]
    fn structured_items_keep_ids_and_drop_blank_labels() {
        let mut ids = SequentialIdGenerator::new("c");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let card = normalize_card(
            CardType::Checklist,
            &json!({ "items": [
                { "id": "keep", "label": "first", "done": true },
                { "id": "keep", "label": "dup id" },
                { "label": "   " },
                "bare"
            ] }),
            "backlog",
            Priority::Medium,
            &[],
            &mut ctx,
        );
        let Card::Checklist { items } = card else {
            panic!("expected checklist");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "keep");
        assert!(items[0].done);
        assert_eq!(items[1].id, "c-1");
        assert_eq!(items[2].label, "bare");
    }

    #[test]
    fn enum_payloads_fall_back_to_defaults() {
        let mut ids = SequentialIdGenerator::new("c");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let recurring = normalize_card(
            CardType::Recurring,
            &json!({ "rule": "yearly" }),
            "backlog",
            Priority::Medium,
            &[],
            &mut ctx,
        );
        assert_eq!(
            recurring,
            Card::Recurring {
                rule: RecurrenceRule::Weekly
            }
        );

        let matrix = normalize_card(
            CardType::Priority,
            &json!({}),
            "backlog",
            Priority::High,
            &[],
            &mut ctx,
        );
        assert_eq!(
            matrix,
            Card::Priority {
                action: MatrixAction::Schedule
            }
        );
    }
}
