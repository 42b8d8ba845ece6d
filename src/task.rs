use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    Progress,
    Done,
}

impl Status {
    /// Column order on the board.
    pub const ALL: [Status; 3] = [Status::Todo, Status::Progress, Status::Done];

    /// The "Start" / "Complete" transition.
    pub fn next(self) -> Option<Status> {
        match self {
            Status::Todo => Some(Status::Progress),
            Status::Progress => Some(Status::Done),
            Status::Done => None,
        }
    }

    /// The "back" transition.
    pub fn previous(self) -> Option<Status> {
        match self {
            Status::Todo => None,
            Status::Progress => Some(Status::Todo),
            Status::Done => Some(Status::Progress),
        }
    }

    pub fn column(self) -> usize {
        match self {
            Status::Todo => 0,
            Status::Progress => 1,
            Status::Done => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "Todo",
            Status::Progress => "Progress",
            Status::Done => "Done",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Status::Todo => "○",
            Status::Progress => "◐",
            Status::Done => "●",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Progress => "progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "progress" | "in-progress" | "in_progress" | "doing" => Ok(Status::Progress),
            "done" => Ok(Status::Done),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Cycles low -> medium -> high -> low, used by the form.
    pub fn cycle(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

// Stored boards may carry values written by hand. An unknown priority renders as
// medium; an unknown status lands in the todo column so the task stays reachable.
fn lenient_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Priority, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        warn!(priority = %raw, "unknown stored priority, using medium");
        Priority::Medium
    }))
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Status, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        warn!(status = %raw, "unknown stored status, using todo");
        Status::Todo
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "lenient_status")]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != Status::Done && self.due_date.is_some_and(|due| due < today)
    }
}

/// User input for creating or editing a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            due_date: task.due_date,
        }
    }
}

/// Parses an optional `YYYY-MM-DD` date; blank input means no due date.
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::InvalidDueDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_follow_board_buttons() {
        assert_eq!(Status::Todo.next(), Some(Status::Progress));
        assert_eq!(Status::Progress.next(), Some(Status::Done));
        assert_eq!(Status::Done.next(), None);
        assert_eq!(Status::Done.previous(), Some(Status::Progress));
        assert_eq!(Status::Progress.previous(), Some(Status::Todo));
        assert_eq!(Status::Todo.previous(), None);
    }

    #[test]
    fn status_parses_aliases() {
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::Progress);
        assert_eq!("DONE".parse::<Status>().unwrap(), Status::Done);
        assert!(matches!(
            "later".parse::<Status>(),
            Err(Error::InvalidStatus(_))
        ));
    }

    fn stored(status: &str, priority: &str) -> Task {
        let json = format!(
            r#"{{"id":"1","title":"t","status":"{status}","priority":"{priority}","createdAt":"2024-01-01T00:00:00Z"}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn priority_input_is_strict_but_stored_values_fall_back() {
        assert!("urgent".parse::<Priority>().is_err());
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
        assert_eq!(stored("todo", "urgent").priority, Priority::Medium);
        assert_eq!(stored("todo", "high").priority, Priority::High);
    }

    #[test]
    fn unknown_stored_status_lands_in_todo() {
        assert_eq!(stored("blocked", "low").status, Status::Todo);
        assert_eq!(stored("done", "low").status, Status::Done);
    }

    #[test]
    fn missing_priority_defaults_to_medium() {
        let task: Task = serde_json::from_str(
            r#"{"id":"1","title":"t","status":"progress","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, "");
    }

    #[test]
    fn task_uses_camel_case_field_names() {
        let json = r#"{
            "id": "1700000000000",
            "title": "Write report",
            "description": "",
            "status": "progress",
            "priority": "low",
            "dueDate": "2024-03-01",
            "createdAt": "2023-11-14T22:13:20.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, Status::Progress);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 1));

        let out = serde_json::to_value(&task).unwrap();
        assert_eq!(out["dueDate"], "2024-03-01");
        assert!(out.get("due_date").is_none());
    }

    #[test]
    fn missing_due_date_is_omitted() {
        let task = Task {
            id: "1".into(),
            title: "t".into(),
            description: String::new(),
            status: Status::Todo,
            priority: Priority::Medium,
            due_date: None,
            created_at: Utc::now(),
        };
        let out = serde_json::to_value(&task).unwrap();
        assert!(out.get("dueDate").is_none());
    }

    #[test]
    fn due_date_parsing() {
        assert_eq!(parse_due_date("  ").unwrap(), None);
        assert_eq!(
            parse_due_date("2025-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
        assert!(matches!(
            parse_due_date("31/12/2025"),
            Err(Error::InvalidDueDate(_))
        ));
    }

    #[test]
    fn overdue_ignores_done_tasks() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut task = Task {
            id: "1".into(),
            title: "t".into(),
            description: String::new(),
            status: Status::Todo,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 9),
            created_at: Utc::now(),
        };
        assert!(task.is_overdue(today));
        task.status = Status::Done;
        assert!(!task.is_overdue(today));
    }
}
