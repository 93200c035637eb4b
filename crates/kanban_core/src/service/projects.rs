//! Project list use-cases.
//!
//! # Invariants
//! - The workspace never ends up without a project; deleting the last one
//!   synthesizes `New Project`.
//! - Newly created projects are prepended and become active.

use crate::model::project::{create_project, ProjectDraft, ProjectType};
use crate::model::workspace::Workspace;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::store::{StoreResult, WorkspaceStore, REPLACEMENT_PROJECT_NAME};
use log::info;

/// Edit of the active project's header fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    /// Blank names are ignored.
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ProjectType>,
}

impl<S: KeyValueStore> WorkspaceStore<S> {
    /// Creates a project, selects it and returns its id.
    pub fn create_project(&mut self, draft: ProjectDraft) -> StoreResult<String> {
        let mut created = String::new();
        self.update_workspace(|workspace, ctx| {
            let project = create_project(draft, ctx);
            created = project.id.clone();
            let mut projects = Vec::with_capacity(workspace.projects.len() + 1);
            projects.push(project);
            projects.extend(workspace.projects.iter().cloned());
            Some(Workspace::selecting_first(projects))
        })?;
        info!("event=project_create module=service status=ok project_id={created}");
        Ok(created)
    }

    pub fn update_active_project(&mut self, patch: ProjectPatch) -> StoreResult<()> {
        self.patch_active_project(|project, _| {
            let mut next = project.clone();
            if let Some(name) = patch.name.map(|name| name.trim().to_string()) {
                if !name.is_empty() {
                    next.name = name;
                }
            }
            if let Some(description) = patch.description {
                next.description = description.trim().to_string();
            }
            if let Some(kind) = patch.kind {
                next.kind = kind;
            }
            Some(next)
        })?;
        Ok(())
    }

    /// Switches the active project; unknown ids are ignored.
    pub fn select_project(&mut self, project_id: &str) -> StoreResult<()> {
        self.update_workspace(|workspace, _| {
            if workspace.active_project_id == project_id {
                return None;
            }
            workspace.project(project_id)?;
            Some(Workspace {
                projects: workspace.projects.clone(),
                active_project_id: project_id.to_string(),
            })
        })?;
        Ok(())
    }

    /// Removes a project. The selection moves to the first remaining
    /// project when the active one is deleted.
    pub fn delete_project(&mut self, project_id: &str) -> StoreResult<()> {
        self.update_workspace(|workspace, ctx| {
            workspace.project(project_id)?;
            let projects: Vec<_> = workspace
                .projects
                .iter()
                .filter(|project| project.id != project_id)
                .cloned()
                .collect();
            if projects.is_empty() {
                info!("event=project_delete module=service status=replaced");
                let replacement = create_project(ProjectDraft::named(REPLACEMENT_PROJECT_NAME), ctx);
                return Some(Workspace::selecting_first(vec![replacement]));
            }
            let active_project_id = if workspace.active_project_id == project_id {
                projects[0].id.clone()
            } else {
                workspace.active_project_id.clone()
            };
            Some(Workspace {
                projects,
                active_project_id,
            })
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectPatch;
    use crate::model::ids::{ManualClock, SequentialIdGenerator};
    use crate::model::project::{ProjectDraft, ProjectType};
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use crate::service::store::WorkspaceStore;

    fn store() -> WorkspaceStore<MemoryKeyValueStore> {
        WorkspaceStore::open_with(
            MemoryKeyValueStore::new(),
            Box::new(SequentialIdGenerator::new("p")),
            Box::new(ManualClock::new(0)),
        )
        .unwrap()
    }

    #[test]
    fn created_project_is_prepended_and_active() {
        let mut store = store();
        let id = store.create_project(ProjectDraft::named("Home")).unwrap();
        let workspace = store.workspace();
        assert_eq!(workspace.projects.len(), 2);
        assert_eq!(workspace.projects[0].id, id);
        assert_eq!(workspace.active_project_id, id);
        assert_eq!(workspace.projects[0].notes_state.notes[0].title, "Home Notes");
    }

    #[test]
    fn blank_name_is_ignored_on_update() {
        let mut store = store();
        store
            .update_active_project(ProjectPatch {
                name: Some(" ".to_string()),
                kind: Some(ProjectType::Work),
                ..ProjectPatch::default()
            })
            .unwrap();
        let project = store.active_project();
        assert_eq!(project.name, "Main Project");
        assert_eq!(project.kind, ProjectType::Work);
    }

    #[test]
    fn deleting_active_project_selects_first_remaining() {
        let mut store = store();
        let original = store.workspace().projects[0].id.clone();
        let created = store.create_project(ProjectDraft::named("Temp")).unwrap();
        store.delete_project(&created).unwrap();
        assert_eq!(store.workspace().active_project_id, original);
    }

    #[test]
    fn select_ignores_unknown_project() {
        let mut store = store();
        let before = store.workspace().active_project_id.clone();
        store.select_project("missing").unwrap();
        assert_eq!(store.workspace().active_project_id, before);
    }
}
