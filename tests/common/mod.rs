//! Repository double that records every call and can be told to fail.

#![allow(dead_code)]

use async_trait::async_trait;
use kanban_board::{
    BoardSnapshot, BoardState, Card, CardId, CardPatch, CardRepository, CardStatus, KanbanError,
    MemoryCardRepository, NewCard, Result,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Default)]
pub struct RecordingRepository {
    inner: MemoryCardRepository,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub fail_updates: AtomicBool,
    pub fail_lists: AtomicBool,
    pub updates: Mutex<Vec<(CardId, CardPatch)>>,
    pub deletes: Mutex<Vec<CardId>>,
    /// Delay applied to successive update calls, front first
    pub update_delays: Mutex<VecDeque<Duration>>,
    /// Board as the store published it when each update arrived
    pub seen_during_update: Mutex<Vec<BoardState>>,
    observer: Mutex<Option<watch::Receiver<BoardSnapshot>>>,
}

impl RecordingRepository {
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            inner: MemoryCardRepository::with_cards(cards),
            ..Self::default()
        }
    }

    /// Lets update calls capture the store's board at the time they are made
    pub fn observe(&self, rx: watch::Receiver<BoardSnapshot>) {
        *self.observer.lock().unwrap() = Some(rx);
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_log(&self) -> Vec<(CardId, CardPatch)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn delete_log(&self) -> Vec<CardId> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Changes a card behind the store's back
    pub async fn set_status(&self, id: u64, status: CardStatus) {
        self.inner
            .update(CardId::new(id), &CardPatch::status(status))
            .await
            .unwrap();
    }

    pub async fn stored(&self) -> Vec<Card> {
        self.inner.list().await.unwrap()
    }
}

#[async_trait]
impl CardRepository for RecordingRepository {
    async fn list(&self) -> Result<Vec<Card>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(KanbanError::Request("service unavailable".to_string()));
        }
        self.inner.list().await
    }

    async fn create(&self, card: &NewCard) -> Result<Card> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create(card).await
    }

    async fn update(&self, id: CardId, patch: &CardPatch) -> Result<Option<Card>> {
        let observed = self
            .observer
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| rx.borrow().board.clone());
        if let Some(board) = observed {
            self.seen_during_update.lock().unwrap().push(board);
        }

        let delay = self.update_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.updates.lock().unwrap().push((id, patch.clone()));
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(KanbanError::Request("status update rejected".to_string()));
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: CardId) -> Result<()> {
        self.deletes.lock().unwrap().push(id);
        self.inner.delete(id).await
    }
}

pub fn card(id: u64, status: CardStatus) -> Card {
    Card::new(id, format!("card {}", id)).with_status(status)
}

pub fn layout(board: &BoardState) -> Vec<(u64, CardStatus)> {
    board
        .cards()
        .iter()
        .map(|c| (c.id.value(), c.status))
        .collect()
}
