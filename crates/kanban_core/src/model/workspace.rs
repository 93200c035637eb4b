//! Workspace root aggregate (unit of persistence).
//!
//! # Invariants
//! - `projects` is non-empty.
//! - `active_project_id` references a member of `projects`; readers heal a
//!   stale pointer by falling back to the first project.

use crate::model::project::Project;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub projects: Vec<Project>,
    pub active_project_id: String,
}

impl Workspace {
    /// Wraps projects with the first one selected.
    pub fn selecting_first(projects: Vec<Project>) -> Self {
        let active_project_id = projects
            .first()
            .map(|project| project.id.clone())
            .unwrap_or_default();
        Self {
            projects,
            active_project_id,
        }
    }

    /// Active project id, substituting the first project for a stale pointer.
    pub fn resolved_active_id(&self) -> Option<&str> {
        if self.project(&self.active_project_id).is_some() {
            return Some(self.active_project_id.as_str());
        }
        self.projects.first().map(|project| project.id.as_str())
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.resolved_active_id()
            .and_then(|active_id| self.project(active_id))
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|project| project.id == project_id)
    }
}
