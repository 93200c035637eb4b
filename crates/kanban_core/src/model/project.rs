//! Project ("plan") aggregate.
//!
//! # Responsibility
//! - Own one board (sections + tasks), one notes state and saved links.
//!
//! # Invariants
//! - `sections` is non-empty and ids are unique.
//! - Every `task.status` names one of `sections`.
//! - `name` is non-empty after trim.

use crate::model::ids::{EpochMs, NormalizeCtx};
use crate::model::note::{starter_notes_state, NotesState};
use crate::model::resource::Resource;
use crate::model::section::{default_sections, Section};
use crate::model::task::Task;
use crate::normalize::sections::dedupe_sections;
use serde::Serialize;

/// Name used when a project is created without one.
pub const UNTITLED_PROJECT: &str = "Untitled Project";

/// Project template category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Personal,
    Home,
    Work,
    Learning,
    #[default]
    Custom,
}

impl ProjectType {
    /// Parses a stored value; anything unrecognized is `Custom`.
    pub fn from_key(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "personal" => Self::Personal,
            "home" => Self::Home,
            "work" => Self::Work,
            "learning" => Self::Learning,
            _ => Self::Custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub sections: Vec<Section>,
    pub tasks: Vec<Task>,
    pub notes_state: NotesState,
    pub resources: Vec<Resource>,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
}

impl Project {
    pub fn has_section(&self, section_id: &str) -> bool {
        self.sections.iter().any(|section| section.id == section_id)
    }

    pub fn section_ids(&self) -> Vec<String> {
        self.sections.iter().map(|section| section.id.clone()).collect()
    }

    /// Id tasks fall back to. Sections are never empty for canonical projects.
    pub fn first_section_id(&self) -> &str {
        self.sections
            .first()
            .map(|section| section.id.as_str())
            .unwrap_or("backlog")
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }
}

/// Input for creating a project from the project dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub kind: ProjectType,
    /// `None` uses the default four sections.
    pub sections: Option<Vec<Section>>,
}

impl ProjectDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Creates an empty project with a starter note.
pub fn create_project(draft: ProjectDraft, ctx: &mut NormalizeCtx<'_>) -> Project {
    let name = match draft.name.trim() {
        "" => UNTITLED_PROJECT.to_string(),
        trimmed => trimmed.to_string(),
    };
    let sections = draft
        .sections
        .map(dedupe_sections)
        .filter(|sections| !sections.is_empty())
        .unwrap_or_else(default_sections);
    let notes_state = starter_notes_state(&name, ctx);
    let now = ctx.now();

    Project {
        id: ctx.next_id(),
        name,
        description: draft.description.trim().to_string(),
        kind: draft.kind,
        sections,
        tasks: Vec::new(),
        notes_state,
        resources: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
