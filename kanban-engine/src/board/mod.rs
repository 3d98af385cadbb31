//! Board commands

mod activate;
mod add;
mod delete;
mod rename;

pub use activate::SetActiveBoard;
pub use add::AddBoard;
pub use delete::DeleteBoard;
pub use rename::RenameBoard;

use crate::error::{KanbanError, Result};

/// Trim a board name, rejecting blank names
pub(crate) fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(KanbanError::validation("name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}
