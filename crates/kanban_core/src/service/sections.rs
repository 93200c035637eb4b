//! Section (board column) use-cases.
//!
//! # Invariants
//! - Section ids stay unique within a project and never change on rename.
//! - A project keeps at least one section; deleting the last is a no-op.
//! - Deleting a section moves its tasks to the new first section.

use crate::model::project::Project;
use crate::model::section::{slugify, Section};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::store::{StoreResult, WorkspaceStore};
use log::debug;

/// Slug of `label`, suffixed `-2`, `-3`, ... until unused in `sections`.
pub fn unique_section_id(label: &str, sections: &[Section]) -> String {
    let base = match slugify(label) {
        slug if slug.is_empty() => "section".to_string(),
        slug => slug,
    };
    let taken = |candidate: &str| sections.iter().any(|section| section.id == candidate);
    if !taken(&base) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Returns `project` without `section_id`, or `None` when it is unknown or
/// the last section.
pub fn remove_section(project: &Project, section_id: &str) -> Option<Project> {
    if !project.has_section(section_id) {
        return None;
    }
    if project.sections.len() <= 1 {
        debug!("event=section_delete module=service status=rejected reason=last_section");
        return None;
    }

    let mut next = project.clone();
    next.sections.retain(|section| section.id != section_id);
    let fallback = next.first_section_id().to_string();
    for task in next.tasks.iter_mut().filter(|task| task.status == section_id) {
        task.status = fallback.clone();
    }
    Some(next)
}

impl<S: KeyValueStore> WorkspaceStore<S> {
    /// Appends a section; blank labels are ignored.
    pub fn add_section(&mut self, label: &str) -> StoreResult<Option<String>> {
        let label = label.trim();
        if label.is_empty() {
            return Ok(None);
        }
        let mut created = None;
        self.patch_active_project(|project, _| {
            let id = unique_section_id(label, &project.sections);
            created = Some(id.clone());
            let mut next = project.clone();
            next.sections.push(Section::new(id, label));
            Some(next)
        })?;
        Ok(created)
    }

    /// Changes the label only.
    pub fn rename_section(&mut self, section_id: &str, label: &str) -> StoreResult<()> {
        let label = label.trim();
        if label.is_empty() {
            return Ok(());
        }
        self.patch_active_project(|project, _| {
            let mut next = project.clone();
            let section = next
                .sections
                .iter_mut()
                .find(|section| section.id == section_id)?;
            section.label = label.to_string();
            Some(next)
        })?;
        Ok(())
    }

    /// Moves a section to `to_index`, clamped to the list.
    pub fn move_section(&mut self, section_id: &str, to_index: usize) -> StoreResult<()> {
        self.patch_active_project(|project, _| {
            let from = project
                .sections
                .iter()
                .position(|section| section.id == section_id)?;
            let to = to_index.min(project.sections.len() - 1);
            if from == to {
                return None;
            }
            let mut next = project.clone();
            let section = next.sections.remove(from);
            next.sections.insert(to, section);
            Some(next)
        })?;
        Ok(())
    }

    pub fn delete_section(&mut self, section_id: &str) -> StoreResult<()> {
        self.patch_active_project(|project, _| remove_section(project, section_id))?;
        Ok(())
    }
}
