//! Notes-state migration.
//!
//! Every on-disk notes shape the app has produced is first classified into
//! a [`NotesShape`], then migrated by the function for that shape:
//!
//! | shape | origin | migration |
//! |---|---|---|
//! | `Absent` | nothing stored | starter note |
//! | `LegacyBlob` | single-note era: one markdown string | wrap in one note |
//! | `LegacyList` | early multi-note era: bare array | fresh ids, first selected |
//! | `Current` | `{ notes, activeNoteId }` | keep ids, validate selection |
//! | `Unrecognized` | anything else | starter note |

use crate::model::ids::NormalizeCtx;
use crate::model::note::{create_note, starter_notes_state, Note, NoteDraft, NotesState};
use crate::normalize::resource::normalize_resources;
use crate::normalize::{positional_timestamp, tags_field, text_field, timestamp_field, trimmed_field};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Classified persisted notes value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotesShape<'a> {
    Absent,
    LegacyBlob(&'a str),
    LegacyList(&'a [Value]),
    Current {
        notes: &'a [Value],
        active_note_id: Option<&'a str>,
    },
    Unrecognized,
}

impl<'a> NotesShape<'a> {
    pub fn classify(source: &'a Value) -> Self {
        match source {
            Value::Null => Self::Absent,
            Value::String(content) => Self::LegacyBlob(content),
            Value::Array(items) => Self::LegacyList(items),
            Value::Object(map) => match map.get("notes") {
                Some(Value::Array(notes)) => Self::Current {
                    notes,
                    active_note_id: map.get("activeNoteId").and_then(Value::as_str),
                },
                _ => Self::Unrecognized,
            },
            Value::Bool(_) | Value::Number(_) => Self::Unrecognized,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::LegacyBlob(_) => "legacy_blob",
            Self::LegacyList(_) => "legacy_list",
            Self::Current { .. } => "current",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Converges any persisted notes value on a valid [`NotesState`].
pub fn normalize_notes_state(
    source: &Value,
    project_name: &str,
    ctx: &mut NormalizeCtx<'_>,
) -> NotesState {
    let shape = NotesShape::classify(source);
    debug!(
        "event=normalize_notes module=normalize status=classified shape={}",
        shape.label()
    );
    match shape {
        NotesShape::Absent => starter_notes_state(project_name, ctx),
        NotesShape::LegacyBlob(content) => migrate_legacy_blob(content, project_name, ctx),
        NotesShape::LegacyList(items) => migrate_legacy_list(items, project_name, ctx),
        NotesShape::Current {
            notes,
            active_note_id,
        } => migrate_current(notes, active_note_id, project_name, ctx),
        NotesShape::Unrecognized => {
            warn!("event=normalize_notes module=normalize status=fallback reason=unrecognized_shape");
            starter_notes_state(project_name, ctx)
        }
    }
}

/// Wraps a single legacy markdown blob in one note.
pub fn migrate_legacy_blob(
    content: &str,
    project_name: &str,
    ctx: &mut NormalizeCtx<'_>,
) -> NotesState {
    let note = create_note(
        NoteDraft::titled(format!("{project_name} Notes")).with_content(content),
        ctx,
    );
    NotesState::selecting_first(vec![note])
}

/// Migrates a bare note array. Stored ids are not trusted.
pub fn migrate_legacy_list(
    items: &[Value],
    project_name: &str,
    ctx: &mut NormalizeCtx<'_>,
) -> NotesState {
    let notes: Vec<Note> = items
        .iter()
        .filter(|item| !item.is_null())
        .enumerate()
        .map(|(index, item)| normalize_note(item, index, false, ctx))
        .collect();
    if notes.is_empty() {
        return starter_notes_state(project_name, ctx);
    }
    NotesState::selecting_first(notes)
}

/// Migrates the current `{ notes, activeNoteId }` shape.
pub fn migrate_current(
    items: &[Value],
    active_note_id: Option<&str>,
    project_name: &str,
    ctx: &mut NormalizeCtx<'_>,
) -> NotesState {
    let mut seen = HashSet::new();
    let notes: Vec<Note> = items
        .iter()
        .filter(|item| !item.is_null())
        .enumerate()
        .map(|(index, item)| {
            let mut note = normalize_note(item, index, true, ctx);
            if !seen.insert(note.id.clone()) {
                note.id = ctx.next_id();
                seen.insert(note.id.clone());
            }
            note
        })
        .collect();
    if notes.is_empty() {
        return starter_notes_state(project_name, ctx);
    }

    let active_note_id = active_note_id
        .filter(|active_id| notes.iter().any(|note| note.id == *active_id))
        .map(str::to_string)
        .unwrap_or_else(|| notes[0].id.clone());
    NotesState {
        notes,
        active_note_id,
    }
}

/// Normalizes one persisted note.
///
/// A bare string entry is read as the note body. With `keep_id` unset a
/// fresh id is always generated.
pub fn normalize_note(
    raw: &Value,
    index: usize,
    keep_id: bool,
    ctx: &mut NormalizeCtx<'_>,
) -> Note {
    if let Value::String(content) = raw {
        let fallback = positional_timestamp(ctx, index);
        return create_note(
            NoteDraft {
                title: Some(format!("Note {}", index + 1)),
                content: content.clone(),
                created_at: Some(fallback),
                updated_at: Some(fallback),
                ..NoteDraft::default()
            },
            ctx,
        );
    }

    let id = keep_id
        .then(|| raw.get("id").and_then(Value::as_str))
        .flatten()
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    let fallback = positional_timestamp(ctx, index);
    let link_previews = normalize_resources(raw.get("linkPreviews"), ctx);

    create_note(
        NoteDraft {
            id,
            title: Some(
                trimmed_field(raw, "title").unwrap_or_else(|| format!("Note {}", index + 1)),
            ),
            content: text_field(raw, "content"),
            tags: tags_field(raw, "tags"),
            link_previews,
            pinned: raw.get("pinned").and_then(Value::as_bool).unwrap_or(false),
            created_at: Some(timestamp_field(raw, "createdAt").unwrap_or(fallback)),
            updated_at: Some(timestamp_field(raw, "updatedAt").unwrap_or(fallback)),
        },
        ctx,
    )
}
