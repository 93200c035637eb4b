//! Read-side projections for the board and notes views.

use crate::model::note::Note;
use crate::model::project::Project;
use crate::model::section::Section;
use crate::model::task::{Priority, Task};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Reverse;

// ASCII word characters; accented letters split words.
static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b[\w'-]+\b)").expect("valid word regex"));

const WORDS_PER_MINUTE: f64 = 200.0;

/// Board filter. Empty query and `None` priority match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub query: String,
    pub priority: Option<Priority>,
}

/// Tasks of one section, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup<'a> {
    pub section: &'a Section,
    pub tasks: Vec<&'a Task>,
}

/// Word/character counts of a note body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteMetrics {
    pub words: usize,
    /// UTF-16 code units, so astral characters count twice.
    pub characters: usize,
    /// Zero only for an empty body.
    pub reading_minutes: usize,
}

impl NoteMetrics {
    pub fn reading_label(&self) -> String {
        format!("{} min read", self.reading_minutes)
    }
}

fn matches_query(fields: &[&str], query: &str) -> bool {
    query.is_empty() || fields.join(" ").to_lowercase().contains(query)
}

/// Filters tasks and groups them per section, in section order.
pub fn group_tasks<'a>(project: &'a Project, filter: &TaskFilter) -> Vec<SectionGroup<'a>> {
    let query = filter.query.trim().to_lowercase();
    let mut matching: Vec<&Task> = project
        .tasks
        .iter()
        .filter(|task| filter.priority.map_or(true, |priority| task.priority == priority))
        .filter(|task| {
            let tags = task.tags.join(" ");
            matches_query(
                &[
                    task.title.as_str(),
                    task.description.as_str(),
                    task.assignee.as_str(),
                    tags.as_str(),
                ],
                &query,
            )
        })
        .collect();
    matching.sort_by_key(|task| Reverse(task.created_at));

    project
        .sections
        .iter()
        .map(|section| SectionGroup {
            section,
            tasks: matching
                .iter()
                .copied()
                .filter(|task| task.status == section.id)
                .collect(),
        })
        .collect()
}

/// Notes matching `query`, pinned first, then most recently updated.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let query = query.trim().to_lowercase();
    let mut matching: Vec<&Note> = notes
        .iter()
        .filter(|note| {
            let tags = note.tags.join(" ");
            matches_query(&[note.title.as_str(), note.content.as_str(), tags.as_str()], &query)
        })
        .collect();
    matching.sort_by_key(|note| (Reverse(note.pinned), Reverse(note.updated_at)));
    matching
}

/// Counts words and UTF-16 code units of `content`.
pub fn note_metrics(content: &str) -> NoteMetrics {
    let words = WORD_RE.find_iter(content.trim()).count();
    let reading_minutes = if words == 0 {
        0
    } else {
        ((words as f64 / WORDS_PER_MINUTE).round() as usize).max(1)
    };
    NoteMetrics {
        words,
        characters: content.encode_utf16().count(),
        reading_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_notes, group_tasks, note_metrics, TaskFilter};
    use crate::model::ids::{NormalizeCtx, SequentialIdGenerator};
    use crate::model::note::{create_note, NoteDraft};
    use crate::model::project::{create_project, ProjectDraft};
    use crate::model::task::{create_task, Priority, TaskDraft};

    #[test]
    fn groups_follow_section_order_and_filters() {
        let mut ids = SequentialIdGenerator::new("q");
        let mut ctx = NormalizeCtx::new(&mut ids, 100);
        let mut project = create_project(ProjectDraft::named("Board"), &mut ctx);
        for (title, status, priority, created_at) in [
            ("Old", "backlog", Priority::High, 1),
            ("New", "backlog", Priority::High, 5),
            ("Other", "done", Priority::Low, 3),
        ] {
            let mut task = create_task(
                TaskDraft {
                    title: title.to_string(),
                    status: Some(status.to_string()),
                    priority: Some(priority),
                    ..TaskDraft::default()
                },
                &project,
                &mut ctx,
            );
            task.created_at = created_at;
            project.tasks.push(task);
        }

        let groups = group_tasks(
            &project,
            &TaskFilter {
                priority: Some(Priority::High),
                ..TaskFilter::default()
            },
        );
        assert_eq!(groups.len(), 4);
        let titles: Vec<&str> = groups[0].tasks.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, ["New", "Old"]);
        assert!(groups[3].tasks.is_empty());

        let groups = group_tasks(
            &project,
            &TaskFilter {
                query: " OTH ".to_string(),
                priority: None,
            },
        );
        assert_eq!(groups[3].tasks.len(), 1);
    }

    #[test]
    fn pinned_notes_sort_first() {
        let mut ids = SequentialIdGenerator::new("q");
        let mut ctx = NormalizeCtx::new(&mut ids, 0);
        let notes = vec![
            create_note(
                NoteDraft {
                    updated_at: Some(50),
                    ..NoteDraft::titled("recent")
                },
                &mut ctx,
            ),
            create_note(
                NoteDraft {
                    pinned: true,
                    updated_at: Some(1),
                    ..NoteDraft::titled("pinned")
                },
                &mut ctx,
            ),
        ];
        let titles: Vec<&str> = filter_notes(&notes, "")
            .iter()
            .map(|note| note.title.as_str())
            .collect();
        assert_eq!(titles, ["pinned", "recent"]);
        assert!(filter_notes(&notes, "nothing").is_empty());
    }

    #[test]
    fn reading_time_rounds_with_floor_of_one() {
        assert_eq!(note_metrics("").reading_label(), "0 min read");
        assert_eq!(note_metrics("one two").reading_label(), "1 min read");
        let long = "word ".repeat(500);
        let metrics = note_metrics(&long);
        assert_eq!(metrics.words, 500);
        assert_eq!(metrics.reading_minutes, 3);
    }

    #[test]
    fn counts_ascii_words_and_utf16_units() {
        let metrics = note_metrics("café don't re-run 🙂");
        assert_eq!(metrics.words, 3);
        assert_eq!(metrics.characters, 20);
    }
}
