//! Task card variants.
//!
//! A task's `cardType` decides which metadata it carries. In memory this is
//! one sum type; on disk it stays two adjacent keys (`cardType`, `cardMeta`).
//!
//! # Invariants
//! - `Card::Progress::value` is always within `0..=100`.
//! - Checklist item labels are non-empty after trim.

use crate::model::task::Priority;
use serde::Serialize;

/// Tag of a [`Card`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Basic,
    Focus,
    Progress,
    Checklist,
    Deadline,
    Recurring,
    Priority,
}

impl CardType {
    /// Cycle order used when neither the stored tag nor the status decide.
    pub const ALL: [CardType; 7] = [
        CardType::Basic,
        CardType::Focus,
        CardType::Progress,
        CardType::Checklist,
        CardType::Deadline,
        CardType::Recurring,
        CardType::Priority,
    ];

    /// Parses a stored tag, including the first-generation `classic` alias.
    pub fn from_key(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" | "classic" => Some(Self::Basic),
            "focus" => Some(Self::Focus),
            "progress" => Some(Self::Progress),
            "checklist" => Some(Self::Checklist),
            "deadline" => Some(Self::Deadline),
            "recurring" => Some(Self::Recurring),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Focus => "focus",
            Self::Progress => "progress",
            Self::Checklist => "checklist",
            Self::Deadline => "deadline",
            Self::Recurring => "recurring",
            Self::Priority => "priority",
        }
    }

    /// Default card type for the built-in sections.
    pub fn for_status(status: &str) -> Option<Self> {
        match status {
            "backlog" => Some(Self::Basic),
            "in-progress" => Some(Self::Progress),
            "review" => Some(Self::Checklist),
            "done" => Some(Self::Basic),
            _ => None,
        }
    }
}

/// Repeat rule of a recurring card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceRule {
    Daily,
    Weekdays,
    #[default]
    Weekly,
    Monthly,
}

impl RecurrenceRule {
    pub fn from_key(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekdays" => Some(Self::Weekdays),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Eisenhower-matrix quadrant of a priority card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixAction {
    Do,
    Schedule,
    Delegate,
    Eliminate,
}

impl MatrixAction {
    pub fn from_key(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "do" => Some(Self::Do),
            "schedule" => Some(Self::Schedule),
            "delegate" => Some(Self::Delegate),
            "eliminate" => Some(Self::Eliminate),
            _ => None,
        }
    }

    /// Quadrant implied by a task priority.
    pub fn for_priority(priority: Priority) -> Self {
        match priority {
            Priority::Urgent => Self::Do,
            Priority::High => Self::Schedule,
            Priority::Medium => Self::Delegate,
            Priority::Low => Self::Eliminate,
        }
    }
}

/// One line of a checklist card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub done: bool,
}

/// Card variant with its metadata payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cardType", content = "cardMeta", rename_all = "lowercase")]
pub enum Card {
    Basic,
    Focus { objective: String, blocker: String },
    Progress { value: u8, milestone: String },
    Checklist { items: Vec<ChecklistItem> },
    Deadline { reminder: String },
    Recurring { rule: RecurrenceRule },
    Priority { action: MatrixAction },
}

impl Card {
    pub fn card_type(&self) -> CardType {
        match self {
            Self::Basic => CardType::Basic,
            Self::Focus { .. } => CardType::Focus,
            Self::Progress { .. } => CardType::Progress,
            Self::Checklist { .. } => CardType::Checklist,
            Self::Deadline { .. } => CardType::Deadline,
            Self::Recurring { .. } => CardType::Recurring,
            Self::Priority { .. } => CardType::Priority,
        }
    }

    /// Completed/total checklist items, `None` for other variants.
    pub fn checklist_progress(&self) -> Option<(usize, usize)> {
        match self {
            Self::Checklist { items } => {
                Some((items.iter().filter(|item| item.done).count(), items.len()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardType, ChecklistItem, MatrixAction};
    use crate::model::task::Priority;

    #[test]
    fn classic_is_an_alias_of_basic() {
        assert_eq!(CardType::from_key("Classic"), Some(CardType::Basic));
        assert_eq!(CardType::from_key("kanban"), None);
    }

    #[test]
    fn card_serializes_as_adjacent_type_and_meta() {
        let card = Card::Progress {
            value: 40,
            milestone: "beta".to_string(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["cardType"], "progress");
        assert_eq!(json["cardMeta"]["value"], 40);

        let basic = serde_json::to_value(Card::Basic).unwrap();
        assert_eq!(basic["cardType"], "basic");
    }

    #[test]
    fn checklist_progress_counts_done_items() {
        let card = Card::Checklist {
            items: vec![
                ChecklistItem {
                    id: "a".to_string(),
                    label: "one".to_string(),
                    done: true,
                },
                ChecklistItem {
                    id: "b".to_string(),
                    label: "two".to_string(),
                    done: false,
                },
            ],
        };
        assert_eq!(card.checklist_progress(), Some((1, 2)));
        assert_eq!(Card::Basic.checklist_progress(), None);
    }

    #[test]
    fn matrix_action_follows_priority() {
        assert_eq!(MatrixAction::for_priority(Priority::Urgent), MatrixAction::Do);
        assert_eq!(
            MatrixAction::for_priority(Priority::Low),
            MatrixAction::Eliminate
        );
    }
}
