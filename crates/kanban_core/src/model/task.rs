//! Task (board card) model.
//!
//! # Invariants
//! - `title` is non-empty after trim.
//! - `status` is a section id of the owning project.
//! - `tags` are trimmed, non-empty and unique.

use crate::model::card::{Card, CardType};
use crate::model::ids::{EpochMs, NormalizeCtx};
use crate::model::project::Project;
use crate::normalize::card::default_card;
use crate::normalize::clean_tags;
use serde::Serialize;

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn from_key(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Canonical board task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Section id within the owning project.
    pub status: String,
    pub priority: Priority,
    /// Serialized as the adjacent `cardType` + `cardMeta` keys.
    #[serde(flatten)]
    pub card: Card,
    pub assignee: String,
    /// Free-form date string as entered (`YYYY-MM-DD` from the date picker).
    pub due_date: String,
    pub tags: Vec<String>,
    pub created_at: EpochMs,
}

/// Input for creating a task from the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub card_type: Option<CardType>,
    pub assignee: String,
    pub due_date: String,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial edit of an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Blank titles are ignored.
    pub title: Option<String>,
    pub description: Option<String>,
    /// Ignored unless it names a section of the project.
    pub status: Option<String>,
    pub priority: Option<Priority>,
    /// Switches the variant, rebuilding default metadata.
    pub card_type: Option<CardType>,
    /// Replaces the whole card; wins over `card_type`.
    pub card: Option<Card>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Creates a task that is valid inside `project`.
///
/// Falls back to the first section for unknown statuses and derives the
/// card from the status when no card type is requested.
pub fn create_task(draft: TaskDraft, project: &Project, ctx: &mut NormalizeCtx<'_>) -> Task {
    let status = draft
        .status
        .filter(|status| project.has_section(status))
        .unwrap_or_else(|| project.first_section_id().to_string());
    let title = match draft.title.trim() {
        "" => format!("Task {}", project.tasks.len() + 1),
        trimmed => trimmed.to_string(),
    };
    let priority = draft.priority.unwrap_or_default();
    let tags = clean_tags(draft.tags.iter().map(String::as_str));
    let card_type = draft
        .card_type
        .or_else(|| CardType::for_status(&status))
        .unwrap_or(CardType::Basic);
    let card = default_card(card_type, &status, priority, &tags, ctx);

    Task {
        id: ctx.next_id(),
        title,
        description: draft.description.trim().to_string(),
        status,
        priority,
        card,
        assignee: draft.assignee.trim().to_string(),
        due_date: draft.due_date.trim().to_string(),
        tags,
        created_at: ctx.now(),
    }
}

/// Demo tasks for a first run against the default sections.
pub fn seed_tasks(ctx: &mut NormalizeCtx<'_>) -> Vec<Task> {
    let seeds = [
        (
            "Define project scope",
            "Capture business goals, constraints, and MVP boundaries.",
            "backlog",
            Priority::High,
            "Product Team",
            ["planning", "mvp"],
            10_000,
        ),
        (
            "Design board wireframes",
            "Prepare desktop and mobile layout plus interactions.",
            "in-progress",
            Priority::Medium,
            "Design",
            ["ux", "ui"],
            9_000,
        ),
        (
            "Review API integration",
            "Validate endpoints and failure handling before release.",
            "review",
            Priority::Urgent,
            "Backend",
            ["api", "qa"],
            8_000,
        ),
    ];

    seeds
        .into_iter()
        .map(
            |(title, description, status, priority, assignee, tags, age_ms)| {
                let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
                let card_type = CardType::for_status(status).unwrap_or(CardType::Basic);
                let card = default_card(card_type, status, priority, &tags, ctx);
                Task {
                    id: ctx.next_id(),
                    title: title.to_string(),
                    description: description.to_string(),
                    status: status.to_string(),
                    priority,
                    card,
                    assignee: assignee.to_string(),
                    due_date: String::new(),
                    tags,
                    created_at: ctx.now() - age_ms,
                }
            },
        )
        .collect()
}
