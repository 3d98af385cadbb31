//! Task types: Task, Priority, TaskFields

use crate::error::{KanbanError, Result};
use crate::ids::{BoardId, ColumnId, TaskId};
use crate::tags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How urgent a task is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(KanbanError::validation(
                "priority",
                format!("'{other}' is not one of low, medium, high"),
            )),
        }
    }
}

/// A task/card on the kanban board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: Vec<String>,

    /// Containing column. Restored from containment on load.
    #[serde(skip, default = "ColumnId::unlinked")]
    pub column_id: ColumnId,

    /// Containing board. Restored from containment on load.
    #[serde(skip, default = "BoardId::unlinked")]
    pub board_id: BoardId,
}

impl Task {
    /// Build a task from already-validated fields
    pub fn from_fields(
        id: TaskId,
        fields: TaskFields,
        board_id: BoardId,
        column_id: ColumnId,
    ) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            tags: fields.tags,
            column_id,
            board_id,
        }
    }

    /// Replace the editable fields, leaving id and container untouched
    pub fn apply_fields(&mut self, fields: TaskFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.priority = fields.priority;
        self.tags = fields.tags;
    }

    /// The editable fields of this task, e.g. to prefill an edit form
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            tags: self.tags.clone(),
        }
    }
}

/// The editable fields of a task, as submitted by a create or edit form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TaskFields {
    /// Create fields with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Build fields from raw form values: priority by name, tags comma-separated
    pub fn from_form(title: &str, description: &str, priority: &str, tags: &str) -> Result<Self> {
        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            priority: priority.parse()?,
            tags: tags::format_tags(tags),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the tags (replaces all existing tags)
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the tags from a comma-separated form value
    pub fn with_tag_string(mut self, tags: &str) -> Self {
        self.tags = tags::format_tags(tags);
        self
    }

    /// Check field rules and normalize: trimmed non-empty title, normalized tags
    pub fn validated(&self) -> Result<TaskFields> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(KanbanError::validation("title", "must not be empty"));
        }
        Ok(TaskFields {
            title: title.to_string(),
            description: self.description.clone(),
            priority: self.priority,
            tags: tags::normalize_tags(&self.tags),
        })
    }
}
