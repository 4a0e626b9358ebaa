//! # Kanban Board
//!
//! Client-side core of a kanban board backed by a remote card API.
//!
//! This crate owns the board state, turns drag-and-drop gestures into
//! reorders and status transitions with optimistic updates, and talks to the
//! card repository. Rendering is left to the caller, which reads immutable
//! snapshots from the [`BoardStore`].

pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod store;

// Re-export commonly used types
pub use config::ClientConfig;
pub use domain::{
    board::{BoardState, ColumnView, LoadState},
    card::{Card, CardId, CardPatch, CardStatus, CardUpdate, NewCard},
    drag::{DragLocation, DragResult},
};
pub use error::{KanbanError, Result};
#[cfg(feature = "http")]
pub use repository::HttpCardRepository;
pub use repository::{CardRepository, MemoryCardRepository};
pub use store::{BoardSnapshot, BoardStore, DragOutcome};
