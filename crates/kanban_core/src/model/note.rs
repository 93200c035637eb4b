//! Project notes.
//!
//! # Invariants
//! - A `NotesState` always holds at least one note.
//! - `NotesState::active_note_id` references a member of `notes`.
//! - `link_previews` never holds two entries for the same URL.

use crate::model::ids::{EpochMs, NormalizeCtx};
use crate::model::resource::Resource;
use crate::normalize::clean_tags;
use serde::Serialize;

/// Default title for notes created without one.
pub const UNTITLED_NOTE: &str = "Untitled note";

/// A markdown note owned by one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Markdown source, stored verbatim.
    pub content: String,
    pub tags: Vec<String>,
    /// Previews resolved for URLs found in `content`.
    pub link_previews: Vec<Resource>,
    pub pinned: bool,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
}

/// Overrides for [`create_note`]. Unset fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub link_previews: Vec<Resource>,
    pub pinned: bool,
    pub created_at: Option<EpochMs>,
    pub updated_at: Option<EpochMs>,
}

impl NoteDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Partial edit of the active note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

/// The notes of one project plus the editor selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesState {
    pub notes: Vec<Note>,
    pub active_note_id: String,
}

impl NotesState {
    /// Wraps notes, pointing the selection at the first one.
    ///
    /// Callers must pass a non-empty list.
    pub fn selecting_first(notes: Vec<Note>) -> Self {
        let active_note_id = notes.first().map(|note| note.id.clone()).unwrap_or_default();
        Self {
            notes,
            active_note_id,
        }
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.notes
            .iter()
            .find(|note| note.id == self.active_note_id)
    }

    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }
}

/// Creates a note, filling ids and timestamps the draft leaves unset.
///
/// `created_at` and `updated_at` share one timestamp unless supplied.
pub fn create_note(draft: NoteDraft, ctx: &mut NormalizeCtx<'_>) -> Note {
    let id = draft
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| ctx.next_id());
    let title = draft
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED_NOTE.to_string());
    let created_at = draft.created_at.unwrap_or_else(|| ctx.now());
    let updated_at = draft.updated_at.unwrap_or(created_at);

    Note {
        id,
        title,
        content: draft.content,
        tags: clean_tags(draft.tags.iter().map(String::as_str)),
        link_previews: draft.link_previews,
        pinned: draft.pinned,
        created_at,
        updated_at,
    }
}

/// Markdown body of the note every new project starts with.
pub fn starter_note_content(project_name: &str) -> String {
    format!(
        "# {project_name} Notes\n\n## Highlights\n- Keep roadmap updates here\n- Track blockers and decisions\n\n## Next Actions\n- [ ] Add sprint goals\n- [ ] Add meeting notes\n"
    )
}

/// One starter note titled `<project> Notes`, selected.
pub fn starter_notes_state(project_name: &str, ctx: &mut NormalizeCtx<'_>) -> NotesState {
    let starter = create_note(
        NoteDraft::titled(format!("{project_name} Notes"))
            .with_content(starter_note_content(project_name)),
        ctx,
    );
    NotesState::selecting_first(vec![starter])
}
