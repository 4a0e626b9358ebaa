//! Drag-and-drop gestures and the board transitions they produce.

use crate::domain::board::BoardState;
use crate::domain::card::{CardId, CardStatus};
use serde::{Deserialize, Serialize};

/// A slot on the board: a column and an index within that column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    pub column: CardStatus,
    pub index: usize,
}

impl DragLocation {
    pub fn new(column: CardStatus, index: usize) -> Self {
        Self { column, index }
    }
}

/// Outcome of one drag gesture as reported by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragResult {
    pub card_id: CardId,
    pub source: DragLocation,
    /// `None` when the gesture was cancelled or dropped outside any column
    pub destination: Option<DragLocation>,
}

impl DragResult {
    pub fn new(card_id: impl Into<CardId>, source: DragLocation, destination: DragLocation) -> Self {
        Self {
            card_id: card_id.into(),
            source,
            destination: Some(destination),
        }
    }

    pub fn cancelled(card_id: impl Into<CardId>, source: DragLocation) -> Self {
        Self {
            card_id: card_id.into(),
            source,
            destination: None,
        }
    }

    /// Dropped back onto the slot it came from
    pub fn is_noop(&self) -> bool {
        match self.destination {
            None => true,
            Some(destination) => destination == self.source,
        }
    }
}

/// A column change that must be confirmed by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub card_id: CardId,
    pub from: CardStatus,
    pub to: CardStatus,
}

/// The board after a drag, plus the status change to persist, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub board: BoardState,
    pub status_change: Option<StatusChange>,
}

/// Computes the board that results from `drag`.
///
/// Returns `None` when the board does not change: the drop had no
/// destination, landed where it started, or names a card that is no longer
/// on the board. The card is removed from where it actually is, not from the
/// reported source index, so a list that changed mid-gesture still resolves.
pub fn apply_drag(board: &BoardState, drag: &DragResult) -> Option<Transition> {
    if drag.is_noop() {
        return None;
    }
    let destination = drag.destination?;
    let current = board.position(drag.card_id)?;

    let mut next = board.clone();
    let mut card = next.remove(current);
    let from = card.status;

    let status_change = if drag.source.column == destination.column {
        None
    } else {
        card.status = destination.column;
        Some(StatusChange {
            card_id: card.id,
            from,
            to: destination.column,
        })
    };

    next.insert_in_column(destination.index, card);
    Some(Transition {
        board: next,
        status_change,
    })
}
