use crate::{
    domain::{Card, CardId, CardPatch, CardStatus, NewCard},
    error::{KanbanError, Result},
    repository::CardRepository,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    cards: Vec<Card>,
    next_id: u64,
}

/// In-process card repository with sequential IDs
#[derive(Debug)]
pub struct MemoryCardRepository {
    inner: RwLock<Inner>,
}

impl Default for MemoryCardRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCardRepository {
    pub fn new() -> Self {
        Self::with_cards(Vec::new())
    }

    /// Seeds the repository; new IDs continue after the highest seeded one
    pub fn with_cards(cards: Vec<Card>) -> Self {
        let next_id = cards.iter().map(|c| c.id.value()).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(Inner { cards, next_id }),
        }
    }

    fn not_found(id: CardId) -> KanbanError {
        KanbanError::Request(format!("Card {} not found", id))
    }
}

#[async_trait]
impl CardRepository for MemoryCardRepository {
    async fn list(&self) -> Result<Vec<Card>> {
        Ok(self.inner.read().await.cards.clone())
    }

    async fn create(&self, card: &NewCard) -> Result<Card> {
        let mut inner = self.inner.write().await;
        let id = CardId::new(inner.next_id);
        inner.next_id += 1;

        let created = Card {
            id,
            title: card.title.clone(),
            description: card.description.clone(),
            img_url: card.img_url.clone(),
            status: CardStatus::Todo,
        };
        inner.cards.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: CardId, patch: &CardPatch) -> Result<Option<Card>> {
        let mut inner = self.inner.write().await;
        let card = inner
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        card.apply(patch);
        Ok(Some(card.clone()))
    }

    async fn delete(&self, id: CardId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let position = inner
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        inner.cards.remove(position);
        Ok(())
    }
}
