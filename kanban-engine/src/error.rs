//! Error types for the kanban engine

use std::fmt;
use thiserror::Error;

/// Result type for kanban operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// The kinds of entity a mutation can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Board,
    Column,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Task => "task",
        })
    }
}

/// Errors that can occur in kanban operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Payload fails a field-level rule (empty title, unknown priority)
    #[error("invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    /// Payload violates a uniqueness or enumeration invariant
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// A referenced id does not resolve in the current snapshot
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Persisted document failed schema or integrity validation
    #[error("corrupt state data: {message}")]
    CorruptData { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),

    /// The dispatcher stopped before the mutation could be committed
    #[error("dispatcher closed before commit")]
    DispatcherClosed,
}

impl KanbanError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a corrupt data error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptData {
            message: message.into(),
        }
    }

    /// Create a duplicate id conflict
    pub fn duplicate_id(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::conflict(format!("duplicate {kind} id: {id}"))
    }

    /// True when the target was already gone. Callers deleting or editing
    /// a stale entity treat this as "nothing left to do".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }
}

impl From<figment::Error> for KanbanError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}
