//! Note use-cases on the active project's notes state.
//!
//! # Invariants
//! - The notes state never becomes empty; deleting the last note creates a
//!   fresh, empty `<project> Notes` note.
//! - `active_note_id` keeps pointing at a member after every operation.

use crate::model::ids::NormalizeCtx;
use crate::model::note::{create_note, Note, NoteDraft, NotePatch, NotesState, UNTITLED_NOTE};
use crate::model::project::Project;
use crate::normalize::clean_tags;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::store::{StoreResult, WorkspaceStore};

/// Returns `project` with `note` replaced by id; `None` when it is unknown.
pub(crate) fn replace_note(project: &Project, note: Note) -> Option<Project> {
    let mut next = project.clone();
    let slot = next
        .notes_state
        .notes
        .iter_mut()
        .find(|slot| slot.id == note.id)?;
    *slot = note;
    Some(next)
}

/// Prepends `note` and selects it.
pub(crate) fn insert_selected_note(project: &Project, note: Note) -> Project {
    let mut next = project.clone();
    next.notes_state.active_note_id = note.id.clone();
    next.notes_state.notes.insert(0, note);
    next
}

/// Returns `note` with `patch` applied, bumping `updated_at`.
///
/// Titles are trimmed; a blank one becomes `Untitled note`.
pub fn apply_note_patch(note: &Note, patch: NotePatch, ctx: &NormalizeCtx<'_>) -> Note {
    let mut next = note.clone();
    if let Some(title) = patch.title {
        next.title = match title.trim() {
            "" => UNTITLED_NOTE.to_string(),
            trimmed => trimmed.to_string(),
        };
    }
    if let Some(content) = patch.content {
        next.content = content;
    }
    if let Some(tags) = patch.tags {
        next.tags = clean_tags(tags.iter().map(String::as_str));
    }
    if let Some(pinned) = patch.pinned {
        next.pinned = pinned;
    }
    next.updated_at = ctx.now();
    next
}

impl<S: KeyValueStore> WorkspaceStore<S> {
    /// Adds a note at the top of the list, selects it and returns its id.
    pub fn create_note(&mut self, draft: NoteDraft) -> StoreResult<String> {
        let mut created = String::new();
        self.patch_active_project(|project, ctx| {
            let note = create_note(draft, ctx);
            created = note.id.clone();
            Some(insert_selected_note(project, note))
        })?;
        Ok(created)
    }

    /// Copies the active note as `<title> (Copy)`, unpinned, and selects it.
    pub fn duplicate_active_note(&mut self) -> StoreResult<Option<String>> {
        let mut created = None;
        self.patch_active_project(|project, ctx| {
            let source = project.notes_state.active_note()?;
            let copy = create_note(
                NoteDraft {
                    title: Some(format!("{} (Copy)", source.title)),
                    content: source.content.clone(),
                    tags: source.tags.clone(),
                    link_previews: source.link_previews.clone(),
                    ..NoteDraft::default()
                },
                ctx,
            );
            created = Some(copy.id.clone());
            Some(insert_selected_note(project, copy))
        })?;
        Ok(created)
    }

    /// Moves the editor selection; unknown ids are ignored.
    pub fn select_note(&mut self, note_id: &str) -> StoreResult<()> {
        self.patch_active_project(|project, _| {
            if project.notes_state.active_note_id == note_id {
                return None;
            }
            project.notes_state.note(note_id)?;
            let mut next = project.clone();
            next.notes_state.active_note_id = note_id.to_string();
            Some(next)
        })?;
        Ok(())
    }

    pub fn update_active_note(&mut self, patch: NotePatch) -> StoreResult<()> {
        self.patch_active_project(|project, ctx| {
            let note = project.notes_state.active_note()?;
            let updated = apply_note_patch(note, patch, ctx);
            replace_note(project, updated)
        })?;
        Ok(())
    }

    pub fn toggle_pinned(&mut self, note_id: &str) -> StoreResult<()> {
        self.patch_active_project(|project, ctx| {
            let note = project.notes_state.note(note_id)?;
            let patch = NotePatch {
                pinned: Some(!note.pinned),
                ..NotePatch::default()
            };
            let updated = apply_note_patch(note, patch, ctx);
            replace_note(project, updated)
        })?;
        Ok(())
    }

    /// Removes the active note and selects the first remaining one.
    pub fn delete_active_note(&mut self) -> StoreResult<()> {
        self.patch_active_project(|project, ctx| {
            let active_id = project.notes_state.active_note()?.id.clone();
            let mut next = project.clone();
            next.notes_state.notes.retain(|note| note.id != active_id);
            match next.notes_state.notes.first().map(|note| note.id.clone()) {
                Some(first_id) => next.notes_state.active_note_id = first_id,
                None => {
                    let title = format!("{} Notes", project.name);
                    let blank = create_note(NoteDraft::titled(title), ctx);
                    next.notes_state = NotesState::selecting_first(vec![blank]);
                }
            }
            Some(next)
        })?;
        Ok(())
    }
}
