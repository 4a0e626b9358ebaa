pub mod board;
pub mod card;
pub mod drag;

pub use board::{BoardState, ColumnView, LoadState};
pub use card::{Card, CardId, CardPatch, CardStatus, CardUpdate, NewCard};
pub use drag::{apply_drag, DragLocation, DragResult, StatusChange, Transition};
