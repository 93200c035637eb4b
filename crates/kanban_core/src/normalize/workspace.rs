//! Workspace normalization and the flat schema migration table.
//!
//! Every persisted document generation converges on the current schema in
//! one step:
//!
//! | generation | on-disk shape | route |
//! |---|---|---|
//! | `PlainTasks` | `[task]` | legacy project from tasks |
//! | `CardTasks` | `[task with cardType]` | legacy project from tasks |
//! | `Workspace` | `{ projects: [no sections] }` | project normalizer, default sections |
//! | `Sectioned` | `{ projects: [with sections] }` | project normalizer |

use crate::model::ids::NormalizeCtx;
use crate::model::note::starter_notes_state;
use crate::model::project::{Project, ProjectType};
use crate::model::section::default_sections;
use crate::model::task::seed_tasks;
use crate::model::workspace::Workspace;
use crate::normalize::notes::normalize_notes_state;
use crate::normalize::project::normalize_project;
use crate::normalize::task::normalize_tasks;
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;

/// Name of the project synthesized from pre-workspace storage.
pub const LEGACY_PROJECT_NAME: &str = "Main Project";
const LEGACY_PROJECT_DESCRIPTION: &str = "Migrated from your existing board.";

/// Historical persisted document generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaGeneration {
    PlainTasks,
    CardTasks,
    Workspace,
    Sectioned,
}

impl SchemaGeneration {
    /// Classifies a persisted document; `None` when it matches no generation.
    pub fn detect(raw: &Value) -> Option<Self> {
        match raw {
            Value::Array(items) => {
                if items.iter().any(|item| item.get("cardType").is_some()) {
                    Some(Self::CardTasks)
                } else {
                    Some(Self::PlainTasks)
                }
            }
            Value::Object(map) => match map.get("projects") {
                Some(Value::Array(projects)) => {
                    if projects.iter().any(|project| project.get("sections").is_some()) {
                        Some(Self::Sectioned)
                    } else {
                        Some(Self::Workspace)
                    }
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainTasks => "plain_tasks",
            Self::CardTasks => "card_tasks",
            Self::Workspace => "workspace",
            Self::Sectioned => "sectioned",
        }
    }
}

/// Migrates any recognized document generation to a workspace.
pub fn migrate_document(raw: &Value, ctx: &mut NormalizeCtx<'_>) -> Option<Workspace> {
    let generation = SchemaGeneration::detect(raw)?;
    info!(
        "event=workspace_migrate module=normalize status=start generation={}",
        generation.as_str()
    );
    match generation {
        SchemaGeneration::PlainTasks | SchemaGeneration::CardTasks => {
            Some(fallback_workspace(Some(raw), None, ctx))
        }
        SchemaGeneration::Workspace | SchemaGeneration::Sectioned => normalize_workspace(raw, ctx),
    }
}

/// Normalizes a `{ projects, activeProjectId }` document.
///
/// Returns `None` unless `raw` is an object whose `projects` array yields
/// at least one project. Later duplicate project ids get fresh ids.
pub fn normalize_workspace(raw: &Value, ctx: &mut NormalizeCtx<'_>) -> Option<Workspace> {
    let items = raw.get("projects")?.as_array()?;
    let mut seen = HashSet::new();
    let projects: Vec<Project> = items
        .iter()
        .filter(|item| !item.is_null())
        .enumerate()
        .map(|(index, item)| {
            let mut project = normalize_project(item, Some(index), ctx);
            if !seen.insert(project.id.clone()) {
                project.id = ctx.next_id();
                seen.insert(project.id.clone());
            }
            project
        })
        .collect();
    if projects.is_empty() {
        debug!("event=workspace_normalize module=normalize status=empty");
        return None;
    }

    let stored_active = raw.get("activeProjectId").and_then(Value::as_str);
    let mut workspace = Workspace::selecting_first(projects);
    if let Some(active_id) = stored_active {
        if workspace.project(active_id).is_some() {
            workspace.active_project_id = active_id.to_string();
        }
    }
    Some(workspace)
}

/// Single-project workspace built from pre-workspace storage.
///
/// Missing or non-array legacy tasks fall back to the seed tasks; missing
/// legacy notes fall back to the starter note.
pub fn fallback_workspace(
    legacy_tasks: Option<&Value>,
    legacy_notes: Option<&Value>,
    ctx: &mut NormalizeCtx<'_>,
) -> Workspace {
    let sections = default_sections();
    let tasks = legacy_tasks
        .and_then(|raw| normalize_tasks(raw, &sections, ctx))
        .unwrap_or_else(|| seed_tasks(ctx));
    let notes_state = match legacy_notes {
        Some(raw) => normalize_notes_state(raw, LEGACY_PROJECT_NAME, ctx),
        None => starter_notes_state(LEGACY_PROJECT_NAME, ctx),
    };
    let now = ctx.now();

    let project = Project {
        id: ctx.next_id(),
        name: LEGACY_PROJECT_NAME.to_string(),
        description: LEGACY_PROJECT_DESCRIPTION.to_string(),
        kind: ProjectType::Custom,
        sections,
        tasks,
        notes_state,
        resources: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    Workspace::selecting_first(vec![project])
}

#[cfg(test)]
mod tests {
    use super::{fallback_workspace, migrate_document, normalize_workspace, SchemaGeneration};
    use crate::model::ids::{NormalizeCtx, SequentialIdGenerator};
    use serde_json::json;

    #[test]
    fn detect_classifies_each_generation() {
        assert_eq!(
            SchemaGeneration::detect(&json!([{ "title": "a" }])),
            Some(SchemaGeneration::PlainTasks)
        );
        assert_eq!(
            SchemaGeneration::detect(&json!([{ "title": "a", "cardType": "focus" }])),
            Some(SchemaGeneration::CardTasks)
        );
        assert_eq!(
            SchemaGeneration::detect(&json!({ "projects": [{ "name": "a" }] })),
            Some(SchemaGeneration::Workspace)
        );
        assert_eq!(
            SchemaGeneration::detect(&json!({ "projects": [{ "sections": [] }] })),
            Some(SchemaGeneration::Sectioned)
        );
        assert_eq!(SchemaGeneration::detect(&json!({ "tasks": [] })), None);
        assert_eq!(SchemaGeneration::detect(&json!("text")), None);
    }

    #[test]
    fn stale_active_id_falls_back_to_first_project() {
        let mut ids = SequentialIdGenerator::new("w");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let workspace = normalize_workspace(
            &json!({ "projects": [{ "id": "a" }, { "id": "b" }], "activeProjectId": "gone" }),
            &mut ctx,
        )
        .unwrap();
        assert_eq!(workspace.active_project_id, "a");
    }

    #[test]
    fn empty_or_invalid_project_lists_are_rejected() {
        let mut ids = SequentialIdGenerator::new("w");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        assert!(normalize_workspace(&json!({ "projects": [] }), &mut ctx).is_none());
        assert!(normalize_workspace(&json!({ "projects": [null] }), &mut ctx).is_none());
        assert!(normalize_workspace(&json!({ "projects": {} }), &mut ctx).is_none());
    }

    #[test]
    fn flat_task_document_becomes_main_project() {
        let mut ids = SequentialIdGenerator::new("w");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let workspace = migrate_document(&json!([{ "title": "X" }]), &mut ctx).unwrap();
        assert_eq!(workspace.projects.len(), 1);
        assert_eq!(workspace.projects[0].name, "Main Project");
        assert_eq!(workspace.projects[0].tasks[0].title, "X");
    }

    #[test]
    fn missing_legacy_tasks_seed_the_board() {
        let mut ids = SequentialIdGenerator::new("w");
        let mut ctx = NormalizeCtx::new(&mut ids, 50_000);
        let workspace = fallback_workspace(None, None, &mut ctx);
        let project = &workspace.projects[0];
        assert_eq!(project.tasks.len(), 3);
        assert_eq!(project.tasks[0].created_at, 40_000);
        assert_eq!(project.notes_state.notes[0].title, "Main Project Notes");
    }
}
