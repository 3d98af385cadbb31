//! UpdateColumn command

use crate::error::Result;
use crate::ids::{BoardId, ColumnId};
use crate::mutation::{Applied, Mutation};
use crate::types::{BoardState, ColumnState};
use serde::{Deserialize, Serialize};

/// Update a column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumn {
    pub board_id: BoardId,
    pub column_id: ColumnId,
    /// New title (None = don't change)
    #[serde(default)]
    pub title: Option<String>,
}

impl UpdateColumn {
    pub fn new(board_id: impl Into<BoardId>, column_id: impl Into<ColumnId>) -> Self {
        Self {
            board_id: board_id.into(),
            column_id: column_id.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Mutation for UpdateColumn {
    fn op(&self) -> &'static str {
        "update column"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let board = state.board(&self.board_id)?;
        board.column(&self.column_id)?;

        let title = match &self.title {
            Some(title) => {
                let title: ColumnState = title.parse()?;
                board.ensure_state_free(title, Some(&self.column_id))?;
                Some(title)
            }
            None => None,
        };

        let mut next = state.clone();
        let column = next.board_mut(&self.board_id)?.column_mut(&self.column_id)?;
        if let Some(title) = title {
            column.title = title;
        }
        let value = serde_json::to_value(&*column)?;

        Ok(Applied::new(next, value))
    }
}
