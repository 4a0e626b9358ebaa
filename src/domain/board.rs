use crate::domain::card::{Card, CardId, CardStatus};
use serde::{Deserialize, Serialize};

/// A column of the board, computed from the board state on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub status: CardStatus,
    pub title: String,
    pub cards: Vec<Card>,
}

/// Ordered cards in display order.
///
/// Display order is local: after a drag it no longer matches the order the
/// repository returned. Columns are never stored, only filtered out of this
/// sequence, so the two can not disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardState {
    cards: Vec<Card>,
}

impl BoardState {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Index of the card in the full sequence
    pub fn position(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Cards with the given status, in display order
    pub fn column(&self, status: CardStatus) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |card| card.status == status)
    }

    /// All four columns in board order
    pub fn columns(&self) -> Vec<ColumnView> {
        CardStatus::ALL
            .into_iter()
            .map(|status| ColumnView {
                status,
                title: status.title(),
                cards: self.column(status).cloned().collect(),
            })
            .collect()
    }

    pub(crate) fn remove(&mut self, index: usize) -> Card {
        self.cards.remove(index)
    }

    /// Inserts `card` so that it lands at `index` within its status column.
    ///
    /// An index at or past the end of the column places the card right after
    /// the column's last card; an empty column appends to the sequence.
    pub(crate) fn insert_in_column(&mut self, index: usize, card: Card) {
        let column_positions: Vec<usize> = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.status == card.status)
            .map(|(i, _)| i)
            .collect();

        let at = match column_positions.get(index) {
            Some(&position) => position,
            None => column_positions
                .last()
                .map(|&last| last + 1)
                .unwrap_or(self.cards.len()),
        };
        self.cards.insert(at, card);
    }
}

impl From<Vec<Card>> for BoardState {
    fn from(cards: Vec<Card>) -> Self {
        Self::new(cards)
    }
}

/// Whether the board reflects the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    /// The last load failed; holds the message to show
    Failed(String),
}
