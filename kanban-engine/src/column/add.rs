//! AddColumn command

use crate::error::{EntityKind, KanbanError, Result};
use crate::ids::{BoardId, ColumnId};
use crate::mutation::{Applied, Mutation};
use crate::types::{BoardState, Column, ColumnState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Append a column to a board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddColumn {
    /// Id for the new column, allocated when the command is built
    #[serde(default)]
    pub id: ColumnId,
    /// The board receiving the column
    pub board_id: BoardId,
    /// The column title; must be a workflow state label not yet used on the board
    pub title: String,
}

impl AddColumn {
    /// Create a new AddColumn command
    pub fn new(board_id: impl Into<BoardId>, title: impl Into<String>) -> Self {
        Self {
            id: ColumnId::new(),
            board_id: board_id.into(),
            title: title.into(),
        }
    }
}

impl Mutation for AddColumn {
    fn op(&self) -> &'static str {
        "add column"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let board = state.board(&self.board_id)?;
        let title: ColumnState = self.title.parse()?;
        board.ensure_state_free(title, None)?;
        if state.contains_column(&self.id) {
            return Err(KanbanError::duplicate_id(EntityKind::Column, &self.id));
        }

        let column = Column::new(self.id.clone(), title, self.board_id.clone());
        let value = serde_json::to_value(&column)?;

        let mut next = state.clone();
        next.board_mut(&self.board_id)?.columns.push(column);

        debug!(board = %self.board_id, column = %self.id, %title, "column added");
        Ok(Applied::new(next, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::AddBoard;
    use crate::column::test_support::seeded_board;

    #[test]
    fn test_add_column() {
        let board = AddBoard::new("Sprint 1");
        let state = board.apply(&BoardState::empty()).unwrap().state;

        let cmd = AddColumn::new(&board.id, "Review");
        let applied = cmd.apply(&state).unwrap();

        assert_eq!(applied.value["id"], cmd.id.as_str());
        assert_eq!(applied.value["title"], "Review");
        let columns = &applied.state.boards[0].columns;
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].board_id, board.id);
        applied.state.check_integrity().unwrap();
    }

    #[test]
    fn test_add_column_appends() {
        let board = AddBoard::new("B");
        let state = board.apply(&BoardState::empty()).unwrap().state;
        let state = AddColumn::new(&board.id, "Done").apply(&state).unwrap().state;
        let state = AddColumn::new(&board.id, "Backlog").apply(&state).unwrap().state;

        let titles: Vec<_> = state.boards[0].columns.iter().map(|c| c.title).collect();
        assert_eq!(titles, vec![ColumnState::Done, ColumnState::Backlog]);
    }

    #[test]
    fn test_add_column_duplicate_title() {
        let (state, board_id) = seeded_board();
        let err = AddColumn::new(&board_id, "Review").apply(&state).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_add_column_unknown_label() {
        let board = AddBoard::new("B");
        let state = board.apply(&BoardState::empty()).unwrap().state;
        let err = AddColumn::new(&board.id, "Blocked").apply(&state).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_add_column_board_not_found() {
        let err = AddColumn::new("missing", "Done")
            .apply(&BoardState::empty())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_same_title_allowed_on_different_boards() {
        let a = AddBoard::new("A");
        let b = AddBoard::new("B");
        let state = a.apply(&BoardState::empty()).unwrap().state;
        let state = b.apply(&state).unwrap().state;
        let state = AddColumn::new(&a.id, "Done").apply(&state).unwrap().state;
        let state = AddColumn::new(&b.id, "Done").apply(&state).unwrap().state;
        state.check_integrity().unwrap();
    }
}
