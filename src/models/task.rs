use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use crate::forms::{self, FieldErrors};

/// Workflow state of a task. Stored as its display string, so database rows
/// read `'In Progress'` rather than an internal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TaskStatus {
    Pending,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<TaskStatus> {
        match value {
            "Pending" => Some(TaskStatus::Pending),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority on the 1..=3 scale the forms submit. Stored as the integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[repr(i32)]
pub enum TaskPriority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    pub fn from_i32(value: i32) -> Option<TaskPriority> {
        match value {
            1 => Some(TaskPriority::Low),
            2 => Some(TaskPriority::Medium),
            3 => Some(TaskPriority::High),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// A task row, owned by exactly one user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
}

impl Task {
    /// Human-readable due date for list views.
    pub fn due_badge(&self) -> String {
        match self.due_date {
            Some(date) => date.format("%d %b %Y").to_string(),
            None => "No due date".to_string(),
        }
    }
}

/// Validated, typed task fields ready for the repository. Produced from the
/// forms below; never constructed from raw request input directly.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

/// Filter applied when listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring matched against title or description.
    pub q: Option<String>,
    /// Exact status match.
    pub status: Option<TaskStatus>,
}

/// Sort order for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Due date ascending, tasks without one last. The default.
    #[default]
    DueDate,
    /// Priority descending, ties broken by due date ascending.
    Priority,
    /// Most recently created first.
    CreatedAt,
}

impl TaskSort {
    pub fn parse(value: &str) -> Option<TaskSort> {
        match value {
            "due_date" => Some(TaskSort::DueDate),
            "priority" => Some(TaskSort::Priority),
            "created_at" => Some(TaskSort::CreatedAt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskSort::DueDate => "due_date",
            TaskSort::Priority => "priority",
            TaskSort::CreatedAt => "created_at",
        }
    }
}

/// The full task form (`/tasks/new`, `/tasks/{id}/edit`), as submitted.
/// Fields stay raw strings so a failed submission re-renders exactly what
/// the user typed; `to_draft` is the validation/coercion step.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskForm {
    pub csrf_token: String,
    #[validate(length(max = 150, message = "Title must be at most 150 characters."))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters."))]
    #[serde(default)]
    pub description: String,
    pub status: String,
    pub priority: String,
    #[serde(default)]
    pub due_date: String,
}

impl TaskForm {
    pub fn to_draft(&self) -> Result<TaskDraft, FieldErrors> {
        let mut errors = forms::collect(self.validate());

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", "Title is required.");
        }

        let status = match TaskStatus::parse(&self.status) {
            Some(status) => status,
            None => {
                errors.add("status", "Not a valid choice.");
                TaskStatus::Pending
            }
        };

        let priority = match self.priority.parse::<i32>().ok().and_then(TaskPriority::from_i32) {
            Some(priority) => priority,
            None => {
                errors.add("priority", "Not a valid choice.");
                TaskPriority::Low
            }
        };

        let due_date = match parse_due_date(&self.due_date) {
            Ok(due_date) => due_date,
            Err(message) => {
                errors.add("due_date", message);
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TaskDraft {
            title: title.to_string(),
            description: normalize_description(&self.description),
            status,
            priority,
            due_date,
        })
    }
}

/// The abbreviated quick-add form on the index page: title and a short
/// description only; everything else defaults.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskQuickForm {
    pub csrf_token: String,
    #[validate(length(max = 150, message = "Title must be at most 150 characters."))]
    pub title: String,
    #[validate(length(max = 300, message = "Description must be at most 300 characters."))]
    #[serde(default)]
    pub description: String,
}

impl TaskQuickForm {
    pub fn to_draft(&self) -> Result<TaskDraft, FieldErrors> {
        let mut errors = forms::collect(self.validate());

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", "Title is required.");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TaskDraft {
            title: title.to_string(),
            description: normalize_description(&self.description),
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            due_date: None,
        })
    }
}

/// An absent due date is stored as NULL, not a sentinel date.
fn parse_due_date(value: &str) -> Result<Option<NaiveDate>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Not a valid date value.")
}

fn normalize_description(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
