//! Project resource list and note link-preview application.
//!
//! # Invariants
//! - No two resources of a project share a preview key.
//! - No two link previews of a note share a preview key; applying a
//!   preview twice is a no-op.

use crate::model::resource::{create_resource, Resource, ResourceDraft};
use crate::normalize::resource::preview_key;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::notes::replace_note;
use crate::service::store::{StoreResult, WorkspaceStore};
use log::debug;

/// True when `resources` already hold an entry for `url`.
pub fn has_preview_for(resources: &[Resource], url: &str) -> bool {
    let key = preview_key(url);
    resources
        .iter()
        .any(|resource| preview_key(&resource.url) == key)
}

impl<S: KeyValueStore> WorkspaceStore<S> {
    /// Adds a resource at the top of the list and returns its id.
    ///
    /// Blank or already-saved URLs are ignored.
    pub fn add_resource(&mut self, draft: ResourceDraft) -> StoreResult<Option<String>> {
        let mut created = None;
        self.patch_active_project(|project, ctx| {
            let resource = create_resource(draft, ctx)?;
            if has_preview_for(&project.resources, &resource.url) {
                debug!("event=resource_add module=service status=duplicate");
                return None;
            }
            created = Some(resource.id.clone());
            let mut next = project.clone();
            next.resources.insert(0, resource);
            Some(next)
        })?;
        Ok(created)
    }

    pub fn remove_resource(&mut self, resource_id: &str) -> StoreResult<()> {
        self.patch_active_project(|project, _| {
            if !project
                .resources
                .iter()
                .any(|resource| resource.id == resource_id)
            {
                return None;
            }
            let mut next = project.clone();
            next.resources.retain(|resource| resource.id != resource_id);
            Some(next)
        })?;
        Ok(())
    }

    /// Appends a resolved preview to a note of the active project.
    ///
    /// Existence is checked against the note as it is now, so a stale
    /// resolution for an already-previewed URL changes nothing. Returns
    /// whether the preview was added.
    pub fn apply_link_preview(&mut self, note_id: &str, preview: Resource) -> StoreResult<bool> {
        let mut applied = false;
        self.patch_active_project(|project, _| {
            let note = project.notes_state.note(note_id)?;
            if has_preview_for(&note.link_previews, &preview.url) {
                debug!("event=link_preview_apply module=service status=duplicate note_id={note_id}");
                return None;
            }
            let mut updated = note.clone();
            updated.link_previews.push(preview);
            applied = true;
            replace_note(project, updated)
        })?;
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ids::{ManualClock, SequentialIdGenerator};
    use crate::model::resource::{ResourceDraft, ResourceKind};
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use crate::service::store::WorkspaceStore;

    fn store() -> WorkspaceStore<MemoryKeyValueStore> {
        WorkspaceStore::open_with(
            MemoryKeyValueStore::new(),
            Box::new(SequentialIdGenerator::new("r")),
            Box::new(ManualClock::new(0)),
        )
        .unwrap()
    }

    #[test]
    fn duplicate_urls_are_suppressed() {
        let mut store = store();
        let first = store
            .add_resource(ResourceDraft::from_url("docs.google.com/d/1"))
            .unwrap();
        let second = store
            .add_resource(ResourceDraft::from_url("https://DOCS.google.com/d/1/"))
            .unwrap();
        assert!(first.is_some());
        assert!(second.is_none());

        let resources = &store.active_project().resources;
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].kind, ResourceKind::Material);
        assert_eq!(resources[0].url, "https://docs.google.com/d/1");
    }

    #[test]
    fn blank_url_is_ignored() {
        let mut store = store();
        assert_eq!(store.add_resource(ResourceDraft::from_url("  ")).unwrap(), None);
    }

    #[test]
    fn remove_drops_by_id() {
        let mut store = store();
        let id = store
            .add_resource(ResourceDraft::from_url("https://example.com"))
            .unwrap()
            .unwrap();
        store.remove_resource(&id).unwrap();
        assert!(store.active_project().resources.is_empty());
    }
}
