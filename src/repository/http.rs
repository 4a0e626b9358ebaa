use crate::{
    config::ClientConfig,
    domain::{Card, CardId, CardPatch, CardStatus, NewCard},
    error::{KanbanError, Result},
    repository::CardRepository,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, instrument};

/// Card repository backed by the board's HTTP API
#[derive(Debug)]
pub struct HttpCardRepository {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCardRequest<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    img_url: Option<&'a str>,
    status: CardStatus,
}

impl HttpCardRepository {
    const CARDS_PATH: &'static str = "cards";

    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(concat!("kanban-board/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KanbanError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            token: config
                .token
                .as_ref()
                .map(|token| SecretString::from(token.expose_secret().to_string())),
        })
    }

    fn cards_url(&self) -> String {
        format!("{}/{}", self.base_url, Self::CARDS_PATH)
    }

    fn card_url(&self, id: CardId) -> String {
        format!("{}/{}/{}", self.base_url, Self::CARDS_PATH, id)
    }

    /// Attaches the bearer token, when one is configured
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        debug!(token_present = self.token.is_some(), "preparing card request");
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Turns a non-success response into a request error carrying the server's message
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body).unwrap_or_else(|| status.to_string());
        debug!(status = status.as_u16(), %message, "card request rejected");
        Err(KanbanError::Request(message))
    }
}

/// Reads `message` from a JSON error body, joining it when it is a list.
/// Falls back to the raw body, or `None` when the body is empty.
fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        match json.get("message") {
            Some(serde_json::Value::String(message)) => return Some(message.clone()),
            Some(serde_json::Value::Array(messages)) => {
                let joined: Vec<&str> = messages.iter().filter_map(|m| m.as_str()).collect();
                if !joined.is_empty() {
                    return Some(joined.join(", "));
                }
            }
            _ => {}
        }
    }

    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}

#[async_trait]
impl CardRepository for HttpCardRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Card>> {
        let response = self.authorize(self.client.get(self.cards_url())).send().await?;
        let response = Self::check_response(response).await?;
        let cards: Vec<Card> = response.json().await?;
        debug!(count = cards.len(), "listed cards");
        Ok(cards)
    }

    #[instrument(skip(self, card), fields(title = %card.title))]
    async fn create(&self, card: &NewCard) -> Result<Card> {
        let body = CreateCardRequest {
            title: &card.title,
            description: card.description.as_deref(),
            img_url: card.img_url.as_deref(),
            status: CardStatus::Todo,
        };
        let response = self
            .authorize(self.client.post(self.cards_url()))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    async fn update(&self, id: CardId, patch: &CardPatch) -> Result<Option<Card>> {
        let response = self
            .authorize(self.client.patch(self.card_url(id)))
            .json(patch)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            debug!("update accepted without a card body");
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: CardId) -> Result<()> {
        let response = self
            .authorize(self.client.delete(self.card_url(id)))
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }
}
