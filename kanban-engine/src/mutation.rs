//! The mutation seam.
//!
//! Every state transition is a command struct whose fields are its payload.
//! `apply` is pure: it reads the input snapshot and either returns a new,
//! fully consistent snapshot or fails without producing one.

use crate::board::{AddBoard, DeleteBoard, RenameBoard, SetActiveBoard};
use crate::column::{AddColumn, DeleteColumn, ReorderColumn, UpdateColumn};
use crate::error::Result;
use crate::ids::BoardId;
use crate::task::{AddTask, DeleteTask, MoveTask, UpdateTask};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// The outcome of a successful mutation
#[derive(Debug, Clone)]
pub struct Applied {
    /// The new snapshot
    pub state: BoardState,
    /// The affected entity, or a deletion receipt
    pub value: Value,
}

impl Applied {
    pub fn new(state: BoardState, value: Value) -> Self {
        Self { state, value }
    }
}

/// A validated transformation from one snapshot to the next
pub trait Mutation: Debug + Send + Sync {
    /// Canonical op string (e.g. "add task", "move task")
    fn op(&self) -> &'static str;

    /// The board this mutation is ordered against
    fn board_id(&self) -> &BoardId;

    /// Produce the next snapshot, or fail leaving `state` untouched
    fn apply(&self, state: &BoardState) -> Result<Applied>;
}

/// Build a `{"deleted": true, "id": ...}` receipt
pub(crate) fn deletion_receipt(id: impl std::fmt::Display) -> Value {
    serde_json::json!({
        "deleted": true,
        "id": id.to_string()
    })
}

/// Any mutation, addressable by name.
///
/// Lets presentation code dispatch `{"op": "add task", ...}` payloads
/// without naming the command types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum KanbanMutation {
    #[serde(rename = "add board")]
    AddBoard(AddBoard),
    #[serde(rename = "rename board")]
    RenameBoard(RenameBoard),
    #[serde(rename = "delete board")]
    DeleteBoard(DeleteBoard),
    #[serde(rename = "activate board")]
    SetActiveBoard(SetActiveBoard),
    #[serde(rename = "add column")]
    AddColumn(AddColumn),
    #[serde(rename = "update column")]
    UpdateColumn(UpdateColumn),
    #[serde(rename = "delete column")]
    DeleteColumn(DeleteColumn),
    #[serde(rename = "reorder column")]
    ReorderColumn(ReorderColumn),
    #[serde(rename = "add task")]
    AddTask(AddTask),
    #[serde(rename = "update task")]
    UpdateTask(UpdateTask),
    #[serde(rename = "delete task")]
    DeleteTask(DeleteTask),
    #[serde(rename = "move task")]
    MoveTask(MoveTask),
}

macro_rules! delegate {
    ($self:ident, $m:ident => $body:expr) => {
        match $self {
            KanbanMutation::AddBoard($m) => $body,
            KanbanMutation::RenameBoard($m) => $body,
            KanbanMutation::DeleteBoard($m) => $body,
            KanbanMutation::SetActiveBoard($m) => $body,
            KanbanMutation::AddColumn($m) => $body,
            KanbanMutation::UpdateColumn($m) => $body,
            KanbanMutation::DeleteColumn($m) => $body,
            KanbanMutation::ReorderColumn($m) => $body,
            KanbanMutation::AddTask($m) => $body,
            KanbanMutation::UpdateTask($m) => $body,
            KanbanMutation::DeleteTask($m) => $body,
            KanbanMutation::MoveTask($m) => $body,
        }
    };
}

impl Mutation for KanbanMutation {
    fn op(&self) -> &'static str {
        delegate!(self, m => m.op())
    }

    fn board_id(&self) -> &BoardId {
        delegate!(self, m => m.board_id())
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        delegate!(self, m => m.apply(state))
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for KanbanMutation {
                fn from(m: $variant) -> Self {
                    Self::$variant(m)
                }
            }
        )*
    };
}

impl_from!(
    AddBoard,
    RenameBoard,
    DeleteBoard,
    SetActiveBoard,
    AddColumn,
    UpdateColumn,
    DeleteColumn,
    ReorderColumn,
    AddTask,
    UpdateTask,
    DeleteTask,
    MoveTask
);
