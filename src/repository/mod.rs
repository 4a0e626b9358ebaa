use crate::{
    domain::{Card, CardId, CardPatch, NewCard},
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "http")]
pub mod http;
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpCardRepository;
pub use memory::MemoryCardRepository;

/// Remote collection of cards
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Lists every card, in the repository's order
    async fn list(&self) -> Result<Vec<Card>>;

    /// Creates a card in TODO and returns it with its assigned ID
    async fn create(&self, card: &NewCard) -> Result<Card>;

    /// Updates the fields present in `patch`.
    ///
    /// Returns the stored card when the repository sends one back; an
    /// accepted update with an empty body is `Ok(None)`.
    async fn update(&self, id: CardId, patch: &CardPatch) -> Result<Option<Card>>;

    /// Deletes a card
    async fn delete(&self, id: CardId) -> Result<()>;
}
