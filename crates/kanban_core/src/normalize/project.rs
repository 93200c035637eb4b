//! Project normalization.

use crate::model::ids::NormalizeCtx;
use crate::model::project::{Project, ProjectType, UNTITLED_PROJECT};
use crate::normalize::notes::normalize_notes_state;
use crate::normalize::resource::normalize_resources;
use crate::normalize::sections::normalize_sections;
use crate::normalize::task::normalize_tasks;
use crate::normalize::{id_field, text_field, timestamp_field, trimmed_field};
use serde_json::Value;

/// Normalizes one persisted project.
///
/// `position` is the 0-based index inside a workspace list; it switches the
/// blank-name fallback from `Untitled Project` to `Project <n>`. Projects of
/// the pre-section generation get the default sections, and their tasks are
/// remapped onto them.
pub fn normalize_project(
    raw: &Value,
    position: Option<usize>,
    ctx: &mut NormalizeCtx<'_>,
) -> Project {
    let id = id_field(raw, ctx);
    let name = trimmed_field(raw, "name").unwrap_or_else(|| match position {
        Some(index) => format!("Project {}", index + 1),
        None => UNTITLED_PROJECT.to_string(),
    });
    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .map(ProjectType::from_key)
        .unwrap_or_default();
    let sections = normalize_sections(raw.get("sections").unwrap_or(&Value::Null));
    let tasks = normalize_tasks(raw.get("tasks").unwrap_or(&Value::Null), &sections, ctx)
        .unwrap_or_default();
    let notes_source = raw
        .get("notesState")
        .or_else(|| raw.get("notes"))
        .unwrap_or(&Value::Null);
    let notes_state = normalize_notes_state(notes_source, &name, ctx);
    let resources = normalize_resources(raw.get("resources"), ctx);
    let now = ctx.now();

    Project {
        id,
        name,
        description: text_field(raw, "description"),
        kind,
        sections,
        tasks,
        notes_state,
        resources,
        created_at: timestamp_field(raw, "createdAt").unwrap_or(now),
        updated_at: timestamp_field(raw, "updatedAt").unwrap_or(now),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_project;
    use crate::model::ids::{NormalizeCtx, SequentialIdGenerator};
    use crate::model::project::ProjectType;
    use serde_json::json;

    #[test]
    fn tasks_are_remapped_onto_custom_sections() {
        let mut ids = SequentialIdGenerator::new("p");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let project = normalize_project(
            &json!({
                "name": " Garden ",
                "type": "home",
                "sections": [{ "id": "seed", "label": "Seed" }, { "id": "grow", "label": "Grow" }],
                "tasks": [{ "title": "Water", "status": "grow" }, { "title": "Dig", "status": "done" }]
            }),
            None,
            &mut ctx,
        );
        assert_eq!(project.name, "Garden");
        assert_eq!(project.kind, ProjectType::Home);
        assert_eq!(project.tasks[0].status, "grow");
        assert_eq!(project.tasks[1].status, "seed");
    }

    #[test]
    fn blank_name_uses_position() {
        let mut ids = SequentialIdGenerator::new("p");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        assert_eq!(normalize_project(&json!({}), Some(2), &mut ctx).name, "Project 3");
        assert_eq!(
            normalize_project(&json!("junk"), None, &mut ctx).name,
            "Untitled Project"
        );
    }

    #[test]
    fn legacy_notes_key_is_read_when_notes_state_is_missing() {
        let mut ids = SequentialIdGenerator::new("p");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let project = normalize_project(&json!({ "name": "Old", "notes": "legacy body" }), None, &mut ctx);
        assert_eq!(project.notes_state.notes[0].content, "legacy body");
    }
}
