//! Board use-cases: task create/edit/move/delete on the active project.
//!
//! # Invariants
//! - Every task keeps a `status` naming a section of its project.
//! - Edits replace the task value; other tasks are untouched.

use crate::model::card::Card;
use crate::model::ids::NormalizeCtx;
use crate::model::project::Project;
use crate::model::task::{create_task, Task, TaskDraft, TaskPatch};
use crate::normalize::card::default_card;
use crate::normalize::clean_tags;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::store::{StoreResult, WorkspaceStore};

/// Returns `task` with `patch` applied inside `project`.
///
/// A blank title and an unknown status are ignored. Switching the card type
/// rebuilds default metadata unless a whole card is supplied.
pub fn apply_task_patch(
    task: &Task,
    patch: TaskPatch,
    project: &Project,
    ctx: &mut NormalizeCtx<'_>,
) -> Task {
    let mut next = task.clone();
    if let Some(title) = patch.title.map(|title| title.trim().to_string()) {
        if !title.is_empty() {
            next.title = title;
        }
    }
    if let Some(description) = patch.description {
        next.description = description.trim().to_string();
    }
    if let Some(status) = patch.status.filter(|status| project.has_section(status)) {
        next.status = status;
    }
    if let Some(priority) = patch.priority {
        next.priority = priority;
    }
    if let Some(assignee) = patch.assignee {
        next.assignee = assignee.trim().to_string();
    }
    if let Some(due_date) = patch.due_date {
        next.due_date = due_date.trim().to_string();
    }
    if let Some(tags) = patch.tags {
        next.tags = clean_tags(tags.iter().map(String::as_str));
    }

    match (patch.card, patch.card_type) {
        (Some(card), _) => next.card = clamp_card(card),
        (None, Some(card_type)) if card_type != next.card.card_type() => {
            next.card = default_card(card_type, &next.status, next.priority, &next.tags, ctx);
        }
        _ => {}
    }
    next
}

fn clamp_card(card: Card) -> Card {
    match card {
        Card::Progress { value, milestone } => Card::Progress {
            value: value.min(100),
            milestone,
        },
        other => other,
    }
}

fn replace_task(project: &Project, task: Task) -> Project {
    let mut next = project.clone();
    if let Some(slot) = next.tasks.iter_mut().find(|slot| slot.id == task.id) {
        *slot = task;
    }
    next
}

impl<S: KeyValueStore> WorkspaceStore<S> {
    /// Adds a task to the active project and returns its id.
    pub fn create_task(&mut self, draft: TaskDraft) -> StoreResult<String> {
        let mut created = String::new();
        self.patch_active_project(|project, ctx| {
            let task = create_task(draft, project, ctx);
            created = task.id.clone();
            let mut next = project.clone();
            next.tasks.insert(0, task);
            Some(next)
        })?;
        Ok(created)
    }

    /// Edits one task; unknown ids are ignored.
    pub fn update_task(&mut self, task_id: &str, patch: TaskPatch) -> StoreResult<()> {
        self.patch_active_project(|project, ctx| {
            let task = project.task(task_id)?;
            let updated = apply_task_patch(task, patch, project, ctx);
            Some(replace_task(project, updated))
        })?;
        Ok(())
    }

    pub fn delete_task(&mut self, task_id: &str) -> StoreResult<()> {
        self.patch_active_project(|project, _| {
            project.task(task_id)?;
            let mut next = project.clone();
            next.tasks.retain(|task| task.id != task_id);
            Some(next)
        })?;
        Ok(())
    }

    /// Moves a task to another section; unknown tasks or sections are ignored.
    pub fn move_task(&mut self, task_id: &str, section_id: &str) -> StoreResult<()> {
        self.patch_active_project(|project, _| {
            if !project.has_section(section_id) {
                return None;
            }
            let task = project.task(task_id)?;
            if task.status == section_id {
                return None;
            }
            let mut moved = task.clone();
            moved.status = section_id.to_string();
            Some(replace_task(project, moved))
        })?;
        Ok(())
    }

    /// Flips one checklist item of a checklist card.
    pub fn toggle_checklist_item(&mut self, task_id: &str, item_id: &str) -> StoreResult<()> {
        self.patch_active_project(|project, _| {
            let mut task = project.task(task_id)?.clone();
            let Card::Checklist { items } = &mut task.card else {
                return None;
            };
            let item = items.iter_mut().find(|item| item.id == item_id)?;
            item.done = !item.done;
            Some(replace_task(project, task))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::card::{Card, CardType};
    use crate::model::ids::{ManualClock, SequentialIdGenerator};
    use crate::model::task::{Priority, TaskDraft, TaskPatch};
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use crate::service::store::WorkspaceStore;

    fn store() -> WorkspaceStore<MemoryKeyValueStore> {
        WorkspaceStore::open_with(
            MemoryKeyValueStore::new(),
            Box::new(SequentialIdGenerator::new("b")),
            Box::new(ManualClock::new(10_000)),
        )
        .unwrap()
    }

    #[test]
    fn created_task_lands_first_with_defaults() {
        let mut store = store();
        let id = store.create_task(TaskDraft::titled("  Ship it ")).unwrap();
        let task = &store.active_project().tasks[0];
        assert_eq!(task.id, id);
        assert_eq!(task.title, "Ship it");
        assert_eq!(task.status, "backlog");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.card, Card::Basic);
    }

    #[test]
    fn move_to_unknown_section_is_ignored() {
        let mut store = store();
        let id = store.create_task(TaskDraft::titled("A")).unwrap();
        store.move_task(&id, "nowhere").unwrap();
        assert_eq!(store.active_project().task(&id).unwrap().status, "backlog");

        store.move_task(&id, "review").unwrap();
        assert_eq!(store.active_project().task(&id).unwrap().status, "review");
    }

    #[test]
    fn patch_switches_card_type_and_ignores_blank_title() {
        let mut store = store();
        let id = store
            .create_task(TaskDraft {
                title: "Plan".to_string(),
                tags: vec!["a".to_string(), "b".to_string()],
                ..TaskDraft::default()
            })
            .unwrap();
        store
            .update_task(
                &id,
                TaskPatch {
                    title: Some("   ".to_string()),
                    card_type: Some(CardType::Checklist),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        let task = store.active_project().task(&id).unwrap();
        assert_eq!(task.title, "Plan");
        assert_eq!(task.card.checklist_progress(), Some((0, 2)));
    }

    #[test]
    fn checklist_items_toggle() {
        let mut store = store();
        let id = store
            .create_task(TaskDraft {
                title: "Check".to_string(),
                card_type: Some(CardType::Checklist),
                tags: vec!["one".to_string()],
                ..TaskDraft::default()
            })
            .unwrap();
        let item_id = match &store.active_project().task(&id).unwrap().card {
            Card::Checklist { items } => items[0].id.clone(),
            other => panic!("unexpected card {other:?}"),
        };
        store.toggle_checklist_item(&id, &item_id).unwrap();
        let task = store.active_project().task(&id).unwrap();
        assert_eq!(task.card.checklist_progress(), Some((1, 1)));
    }

    #[test]
    fn delete_removes_only_the_target() {
        let mut store = store();
        let before = store.active_project().tasks.len();
        let id = store.create_task(TaskDraft::titled("Temp")).unwrap();
        store.delete_task(&id).unwrap();
        assert_eq!(store.active_project().tasks.len(), before);
        assert!(store.active_project().task(&id).is_none());
    }
}
