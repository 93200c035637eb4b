//! Checklist text <-> item conversion.
//!
//! Text form is one item per line: `[x] label`, `[ ] label`, or a legacy
//! `x label` line for a done item. Markdown bullets (`- `, `* `) in front
//! of a marker are tolerated.

use crate::model::card::ChecklistItem;
use crate::model::ids::NormalizeCtx;

/// Parses a checklist text blob. Blank lines and empty labels are skipped.
pub fn parse_checklist_text(text: &str, ctx: &mut NormalizeCtx<'_>) -> Vec<ChecklistItem> {
    text.lines()
        .filter_map(parse_checklist_line)
        .map(|(label, done)| ChecklistItem {
            id: ctx.next_id(),
            label,
            done,
        })
        .collect()
}

/// Renders items back into the text form accepted by
/// [`parse_checklist_text`].
pub fn checklist_text_from_items(items: &[ChecklistItem]) -> String {
    items
        .iter()
        .map(|item| {
            let marker = if item.done { "[x]" } else { "[ ]" };
            format!("{marker} {}", item.label.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_checklist_line(line: &str) -> Option<(String, bool)> {
    let mut rest = line.trim();
    if rest.is_empty() {
        return None;
    }
    for bullet in ["- ", "* "] {
        if let Some(stripped) = rest.strip_prefix(bullet) {
            if stripped.trim_start().starts_with('[') {
                rest = stripped.trim_start();
            }
            break;
        }
    }

    let (label, done) = if let Some(stripped) = strip_marker(rest, &["[x]", "[X]"]) {
        (stripped, true)
    } else if let Some(stripped) = strip_marker(rest, &["[ ]", "[]"]) {
        (stripped, false)
    } else if let Some(stripped) = strip_marker(rest, &["x ", "X "]) {
        (stripped, true)
    } else {
        (rest, false)
    };

    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some((label.to_string(), done))
}

fn strip_marker<'a>(value: &'a str, markers: &[&str]) -> Option<&'a str> {
    markers
        .iter()
        .find_map(|marker| value.strip_prefix(marker))
}

#[cfg(test)]
mod tests {
    use super::{checklist_text_from_items, parse_checklist_text};
    use crate::model::card::ChecklistItem;
    use crate::model::ids::{NormalizeCtx, SequentialIdGenerator};

    fn labels_and_state(items: &[ChecklistItem]) -> Vec<(String, bool)> {
        items
            .iter()
            .map(|item| (item.label.clone(), item.done))
            .collect()
    }

    #[test]
    fn parses_all_marker_styles() {
        let mut ids = SequentialIdGenerator::new("c");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let items = parse_checklist_text(
            "[x] ship it\n[ ] write docs\n\nx legacy done\n- [X] bullet done\nplain line\n[ ]   ",
            &mut ctx,
        );
        assert_eq!(
            labels_and_state(&items),
            vec![
                ("ship it".to_string(), true),
                ("write docs".to_string(), false),
                ("legacy done".to_string(), true),
                ("bullet done".to_string(), true),
                ("plain line".to_string(), false),
            ]
        );
        assert_eq!(items[0].id, "c-1");
    }

    #[test]
    fn text_round_trip_preserves_labels_and_state() {
        let mut ids = SequentialIdGenerator::new("c");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let original = vec![
            ChecklistItem {
                id: "a".to_string(),
                label: "x marks the spot".to_string(),
                done: false,
            },
            ChecklistItem {
                id: "b".to_string(),
                label: "[x] literal".to_string(),
                done: true,
            },
            ChecklistItem {
                id: "c".to_string(),
                label: "- dash first".to_string(),
                done: false,
            },
        ];

        let text = checklist_text_from_items(&original);
        let parsed = parse_checklist_text(&text, &mut ctx);
        assert_eq!(labels_and_state(&parsed), labels_and_state(&original));
    }
}
