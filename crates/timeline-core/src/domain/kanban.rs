//! Kanban boards and cards scoped to a single node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BoardId, CardId, NodeId};
use crate::CoreError;

/// A kanban board owned by one node; multiple boards order by `position`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanbanBoard {
    pub id: BoardId,
    pub node_id: NodeId,
    pub title: String,
    /// Display order among the node's boards
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl KanbanBoard {
    /// Create a board at the given display position
    pub fn new(node_id: NodeId, title: impl Into<String>, position: u32) -> Self {
        Self {
            id: BoardId::new(),
            node_id,
            title: title.into(),
            position,
            created_at: Utc::now(),
        }
    }
}

/// A card on a kanban board.
///
/// Progress is a manually-set integer percentage, purely declarative and not
/// derived from any checklist state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanbanCard {
    pub id: CardId,
    pub board_id: BoardId,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Manual progress percentage, 0–100 inclusive
    pub progress: u8,
    /// Display order within the board
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl KanbanCard {
    /// Create a card, rejecting progress outside 0–100
    pub fn new(
        board_id: BoardId,
        title: impl Into<String>,
        description: Option<String>,
        tags: Vec<String>,
        progress: i64,
        position: u32,
    ) -> Result<Self, CoreError> {
        let progress = validate_progress(progress)?;
        Ok(Self {
            id: CardId::new(),
            board_id,
            title: title.into(),
            description,
            tags,
            progress,
            position,
            created_at: Utc::now(),
        })
    }
}

/// Validate a manual progress value, rejecting anything outside 0–100
pub fn validate_progress(progress: i64) -> Result<u8, CoreError> {
    if !(0..=100).contains(&progress) {
        return Err(CoreError::Validation(format!(
            "progress must be between 0 and 100, got {}",
            progress
        )));
    }
    Ok(progress as u8)
}

/// A board together with its cards, both in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardWithCards {
    pub board: KanbanBoard,
    pub cards: Vec<KanbanCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_boundaries() {
        assert_eq!(validate_progress(0).unwrap(), 0);
        assert_eq!(validate_progress(100).unwrap(), 100);
        assert!(matches!(
            validate_progress(-1),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            validate_progress(101),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn card_creation_rejects_invalid_progress() {
        let board = BoardId::new();
        assert!(KanbanCard::new(board, "Task", None, vec![], 101, 0).is_err());
        let card = KanbanCard::new(board, "Task", None, vec!["design".into()], 40, 0).unwrap();
        assert_eq!(card.progress, 40);
        assert_eq!(card.tags, vec!["design".to_string()]);
    }
}
