//! The board store: sole owner of board state.
//!
//! Every mutation goes through [`BoardStore`]. Readers take a
//! [`BoardSnapshot`] or subscribe to a `watch` channel that is notified after
//! each change. No lock is held on the state across a network call, so the
//! latest completed reload or optimistic patch wins.

use crate::{
    domain::{
        apply_drag, BoardState, Card, CardId, CardPatch, CardStatus, CardUpdate, ColumnView,
        DragResult, LoadState, NewCard, StatusChange,
    },
    error::Result,
    repository::CardRepository,
};
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Immutable view of the board handed to the rendering layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub board: BoardState,
    pub load_state: LoadState,
    /// When the board last loaded successfully
    pub loaded_at: Option<DateTime<Utc>>,
}

impl BoardSnapshot {
    pub fn columns(&self) -> Vec<ColumnView> {
        self.board.columns()
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// Message for a full-page error state, if the last load failed
    pub fn error(&self) -> Option<&str> {
        match &self.load_state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What a drag did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Cancelled, dropped in place, or the card was no longer on the board
    Unchanged,
    /// Reordered within a column; nothing was sent to the repository
    Reordered,
    /// Moved to another column and confirmed by the repository
    Moved { card_id: CardId, status: CardStatus },
    /// The repository rejected the move and the board was reloaded
    RolledBack { card_id: CardId, reason: String },
}

pub struct BoardStore<R: ?Sized> {
    repository: Arc<R>,
    state: watch::Sender<BoardSnapshot>,
    // Orders status updates per card so the last gesture is the last request
    card_locks: Mutex<HashMap<CardId, Arc<Mutex<()>>>>,
}

impl<R: CardRepository + ?Sized> BoardStore<R> {
    /// Creates an empty store in the loading state. Call [`reload`](Self::reload) to fill it.
    pub fn new(repository: Arc<R>) -> Self {
        let (state, _) = watch::channel(BoardSnapshot::default());
        Self {
            repository,
            state,
            card_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.state.subscribe()
    }

    /// Replaces the board with the repository's current cards.
    ///
    /// On failure the previous cards are kept and the snapshot enters the
    /// failed state with a user-facing message. There is no retry.
    pub async fn reload(&self) -> Result<BoardState> {
        self.state.send_modify(|s| s.load_state = LoadState::Loading);

        match self.repository.list().await {
            Ok(cards) => {
                let board = BoardState::from(cards);
                info!(cards = board.len(), "board loaded");
                self.state.send_modify(|s| {
                    s.board = board.clone();
                    s.load_state = LoadState::Ready;
                    s.loaded_at = Some(Utc::now());
                });
                Ok(board)
            }
            Err(err) => {
                let err = err.into_load();
                warn!(error = %err, "failed to load board");
                let message = err.user_message();
                self.state
                    .send_modify(|s| s.load_state = LoadState::Failed(message));
                Err(err)
            }
        }
    }

    /// Applies a drag gesture.
    ///
    /// The new ordering is published before anything is sent. A move to another
    /// column then persists the new status; if that fails the optimistic board
    /// is discarded by one full reload. Only a failed reload is returned as an
    /// error.
    pub async fn apply_drag(&self, drag: DragResult) -> Result<DragOutcome> {
        let mut change: Option<Option<StatusChange>> = None;
        self.state.send_if_modified(|s| match apply_drag(&s.board, &drag) {
            Some(transition) => {
                s.board = transition.board;
                change = Some(transition.status_change);
                true
            }
            None => false,
        });

        let change = match change {
            None => {
                debug!(card = %drag.card_id, "drag left the board unchanged");
                return Ok(DragOutcome::Unchanged);
            }
            Some(None) => {
                debug!(card = %drag.card_id, "reordered card within its column");
                return Ok(DragOutcome::Reordered);
            }
            Some(Some(change)) => change,
        };

        info!(
            card = %change.card_id,
            from = %change.from,
            to = %change.to,
            "moving card"
        );

        let result = {
            let lock = self.card_lock(change.card_id).await;
            let _guard = lock.lock().await;
            self.repository
                .update(change.card_id, &CardPatch::status(change.to))
                .await
        };
        self.release_card_lock(change.card_id).await;

        match result {
            Ok(_) => Ok(DragOutcome::Moved {
                card_id: change.card_id,
                status: change.to,
            }),
            Err(err) => {
                warn!(card = %change.card_id, error = %err, "status update failed, reloading board");
                self.reload().await?;
                Ok(DragOutcome::RolledBack {
                    card_id: change.card_id,
                    reason: err.user_message(),
                })
            }
        }
    }

    /// Creates a TODO card and reloads the board.
    ///
    /// Validation failures return before anything is sent.
    pub async fn create_card(&self, card: NewCard) -> Result<Card> {
        let card = card.normalized()?;
        let created = self.repository.create(&card).await?;
        info!(card = %created.id, "card created");
        self.reload().await?;
        Ok(created)
    }

    /// Replaces a card's editable fields and reloads the board.
    ///
    /// Returns the card as the repository stored it, when it sent one back.
    pub async fn update_card(&self, id: CardId, update: CardUpdate) -> Result<Option<Card>> {
        let patch = CardPatch::from(update.normalized()?);
        let updated = self.repository.update(id, &patch).await?;
        info!(card = %id, "card updated");
        self.reload().await?;
        Ok(updated)
    }

    /// Deletes a card and reloads the board. Confirmation is the caller's job.
    pub async fn delete_card(&self, id: CardId) -> Result<()> {
        self.repository.delete(id).await?;
        info!(card = %id, "card deleted");
        self.reload().await?;
        Ok(())
    }

    async fn card_lock(&self, id: CardId) -> Arc<Mutex<()>> {
        let mut locks = self.card_locks.lock().await;
        locks.entry(id).or_default().clone()
    }

    async fn release_card_lock(&self, id: CardId) {
        let mut locks = self.card_locks.lock().await;
        if locks.get(&id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&id);
        }
    }
}
