//! Markdown note import/export.

use crate::model::note::{create_note, NoteDraft};
use crate::model::section::slugify;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::notes::insert_selected_note;
use crate::service::store::{StoreResult, WorkspaceStore};
use std::path::{Path, PathBuf};

pub const IMPORTED_NOTE_TITLE: &str = "Imported note";

/// A note rendered as a standalone markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedNote {
    pub file_name: String,
    pub content: String,
}

impl ExportedNote {
    /// Writes the file into `dir`, replacing an existing file of that name.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// `<slug>.md` for a note title, `note.md` when the slug is empty.
pub fn export_file_name(title: &str) -> String {
    match slugify(title) {
        slug if slug.is_empty() => "note.md".to_string(),
        slug => format!("{slug}.md"),
    }
}

/// Note title for an imported file: its name without the last extension.
pub fn import_title(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };
    match stem.trim() {
        "" => IMPORTED_NOTE_TITLE.to_string(),
        trimmed => trimmed.to_string(),
    }
}

impl<S: KeyValueStore> WorkspaceStore<S> {
    /// Adds a note from a file's name and body, selects it, returns its id.
    pub fn import_note(&mut self, file_name: &str, body: &str) -> StoreResult<String> {
        let draft = NoteDraft::titled(import_title(file_name)).with_content(body);
        let mut created = String::new();
        self.patch_active_project(|project, ctx| {
            let note = create_note(draft, ctx);
            created = note.id.clone();
            Some(insert_selected_note(project, note))
        })?;
        Ok(created)
    }

    pub fn export_active_note(&self) -> Option<ExportedNote> {
        let note = self.active_project().notes_state.active_note()?;
        Some(ExportedNote {
            file_name: export_file_name(&note.title),
            content: note.content.clone(),
        })
    }
}
