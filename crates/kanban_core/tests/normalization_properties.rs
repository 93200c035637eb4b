use kanban_core::model::ids::{NormalizeCtx, SequentialIdGenerator};
use kanban_core::model::project::Project;
use kanban_core::normalize::notes::normalize_notes_state;
use kanban_core::normalize::project::normalize_project;
use kanban_core::normalize::workspace::normalize_workspace;
use serde_json::{json, Value};

fn malformed_inputs() -> Vec<Value> {
    vec![
        json!(null),
        json!({}),
        json!([]),
        json!("just text"),
        json!(42),
        json!(true),
        json!({ "name": 7, "sections": "columns", "tasks": {}, "notesState": 3 }),
        json!({
            "name": "  Launch ",
            "type": "WORK",
            "sections": [null, "Ideas", { "label": "Ideas" }, { "id": "ship", "label": "" }],
            "tasks": [
                null,
                { "title": "  ", "status": "nowhere", "priority": "asap", "tags": [" a ", "a", "", 5] },
                { "id": "t", "title": "Card", "cardType": "classic", "progress": "250" },
                { "id": "t", "title": "Dup", "cardType": "checklist", "checklistText": "[x] one\n[ ] two" }
            ],
            "notesState": { "notes": [{ "id": "n", "title": "A" }, { "id": "n" }], "activeNoteId": "zzz" },
            "resources": [{ "url": "youtu.be/abc123" }, { "url": " " }, "https://youtu.be/abc123/"]
        }),
        json!({
            "name": "Legacy",
            "tasks": [{ "title": "Old", "status": "done", "cardType": "progress", "cardMeta": { "value": -3 } }],
            "notes": ["first", { "content": "second", "linkPreviews": ["example.com", "https://example.com/"] }]
        }),
    ]
}

fn normalize(raw: &Value, prefix: &str) -> Project {
    let mut ids = SequentialIdGenerator::new(prefix);
    let mut ctx = NormalizeCtx::new(&mut ids, 1_000_000);
    normalize_project(raw, None, &mut ctx)
}

fn assert_project_invariants(project: &Project) {
    assert!(!project.name.trim().is_empty());
    assert!(!project.sections.is_empty());
    let section_ids = project.section_ids();
    for (index, id) in section_ids.iter().enumerate() {
        assert!(!section_ids[..index].contains(id), "duplicate section {id}");
    }
    for task in &project.tasks {
        assert!(section_ids.contains(&task.status), "dangling status {}", task.status);
        assert!(!task.title.trim().is_empty());
        assert!(task.tags.iter().all(|tag| !tag.is_empty() && tag.trim() == tag));
    }

    let notes = &project.notes_state;
    assert!(!notes.notes.is_empty());
    assert!(notes.note(&notes.active_note_id).is_some());
    for resource in project
        .resources
        .iter()
        .chain(notes.notes.iter().flat_map(|note| note.link_previews.iter()))
    {
        assert!(resource.url.contains("://"));
        assert!(!resource.thumbnail.is_empty());
    }
}

#[test]
fn malformed_input_always_yields_a_valid_project() {
    for raw in malformed_inputs() {
        let project = normalize(&raw, "p");
        assert_project_invariants(&project);
    }
}

#[test]
fn normalizing_serialized_output_is_a_fixed_point() {
    for raw in malformed_inputs() {
        let first = normalize(&raw, "first");
        let serialized = serde_json::to_value(&first).unwrap();
        let second = normalize(&serialized, "second");
        assert_eq!(second, first, "not idempotent for input {raw}");
    }
}

#[test]
fn notes_state_is_total() {
    for raw in malformed_inputs() {
        let mut ids = SequentialIdGenerator::new("n");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let state = normalize_notes_state(&raw, "Inbox", &mut ctx);
        assert!(!state.notes.is_empty());
        assert!(state.note(&state.active_note_id).is_some());
    }
}

#[test]
fn duplicate_task_ids_are_split() {
    let project = normalize(&malformed_inputs()[7], "p");
    let ids: Vec<&str> = project.tasks.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[1], "t");
    assert_ne!(ids[2], "t");
}

#[test]
fn workspace_pointer_always_references_a_project() {
    let mut ids = SequentialIdGenerator::new("w");
    let mut ctx = NormalizeCtx::new(&mut ids, 0);
    let workspace = normalize_workspace(
        &json!({
            "projects": [{ "id": "x" }, { "id": "x" }, "oops"],
            "activeProjectId": 99
        }),
        &mut ctx,
    )
    .unwrap();
    assert_eq!(workspace.projects.len(), 3);
    assert!(workspace.project(&workspace.active_project_id).is_some());
    assert_ne!(workspace.projects[0].id, workspace.projects[1].id);
    for project in &workspace.projects {
        assert_project_invariants(project);
    }
}
