//! Board sections (task status columns).
//!
//! # Invariants
//! - Section ids are unique within one project.
//! - A project always keeps at least one section.

use serde::Serialize;

/// Sections every new project starts with.
pub const DEFAULT_SECTIONS: [(&str, &str); 4] = [
    ("backlog", "Backlog"),
    ("in-progress", "In Progress"),
    ("review", "Review"),
    ("done", "Done"),
];

/// One status column of a project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Slug id referenced by `Task::status`.
    pub id: String,
    /// User-facing column title.
    pub label: String,
}

impl Section {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Returns a fresh copy of the default section list.
pub fn default_sections() -> Vec<Section> {
    DEFAULT_SECTIONS
        .iter()
        .map(|(id, label)| Section::new(*id, *label))
        .collect()
}

/// Lowercases and collapses every non-alphanumeric run into one `-`.
///
/// Leading and trailing hyphens are dropped; the result may be empty.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for ch in value.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::{default_sections, slugify};

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify("  In  Progress!! "), "in-progress");
        assert_eq!(slugify("--Q3 / Q4 plans--"), "q3-q4-plans");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn default_sections_start_with_backlog() {
        let sections = default_sections();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].id, "backlog");
        assert_eq!(sections[3].label, "Done");
    }
}
