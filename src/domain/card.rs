use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use url::Url;

use crate::error::{KanbanError, Result};

/// Identifier assigned to a card by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u64);

impl CardId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for CardId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for CardId {
    type Err = KanbanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| KanbanError::validation("card id", format!("'{}' is not a card id", s)))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a card, which is also the column it is shown in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    #[default]
    Todo,
    InProgress,
    Qa,
    Done,
}

impl CardStatus {
    /// Every status in board order
    pub const ALL: [CardStatus; 4] = [Self::Todo, Self::InProgress, Self::Qa, Self::Done];

    /// Wire value, also used as the column id
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Qa => "QA",
            Self::Done => "DONE",
        }
    }

    /// Column heading
    pub fn title(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = KanbanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Accept the column heading and dashed forms as well as the wire value
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| KanbanError::InvalidStatus(s.to_string()))
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    pub status: CardStatus,
}

impl Card {
    /// Creates a TODO card with the given ID and title
    pub fn new(id: impl Into<CardId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            img_url: None,
            status: CardStatus::Todo,
        }
    }

    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_img_url(mut self, img_url: impl Into<String>) -> Self {
        self.img_url = Some(img_url.into());
        self
    }

    /// Applies the fields present in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: &CardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(img_url) = &patch.img_url {
            self.img_url = Some(img_url.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Fields for a card that does not exist yet. New cards always start in TODO.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub img_url: Option<String>,
}

impl NewCard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_img_url(mut self, img_url: impl Into<String>) -> Self {
        self.img_url = Some(img_url.into());
        self
    }

    /// Validates the fields and drops blank optional values
    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            title: validate_title(&self.title)?,
            description: blank_to_none(self.description),
            img_url: validate_img_url(self.img_url)?,
        })
    }
}

/// Full replacement of a card's editable fields, as submitted by the edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardUpdate {
    pub title: String,
    pub description: Option<String>,
    pub img_url: Option<String>,
    pub status: CardStatus,
}

impl CardUpdate {
    /// Starts an edit from the card's current values
    pub fn from_card(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone(),
            img_url: card.img_url.clone(),
            status: card.status,
        }
    }

    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            title: validate_title(&self.title)?,
            description: blank_to_none(self.description),
            img_url: validate_img_url(self.img_url)?,
            status: self.status,
        })
    }
}

/// Partial update body; absent fields are left unchanged by the repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
}

impl CardPatch {
    /// Patch that only moves the card to another column
    pub fn status(status: CardStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_status_only(&self) -> bool {
        self.status.is_some()
            && self.title.is_none()
            && self.description.is_none()
            && self.img_url.is_none()
    }
}

impl From<CardUpdate> for CardPatch {
    fn from(update: CardUpdate) -> Self {
        Self {
            title: Some(update.title),
            description: update.description,
            img_url: update.img_url,
            status: Some(update.status),
        }
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(KanbanError::validation("title", "Title is required"));
    }
    Ok(title.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_img_url(img_url: Option<String>) -> Result<Option<String>> {
    match blank_to_none(img_url) {
        Some(raw) => {
            let raw = raw.trim();
            Url::parse(raw).map_err(|e| {
                KanbanError::validation("image URL", format!("'{}' is not a valid URL: {}", raw, e))
            })?;
            Ok(Some(raw.to_string()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_parsing() {
        assert_eq!(CardId::from_str("42").unwrap(), CardId::new(42));
        assert_eq!(CardId::from_str(" 7 ").unwrap().value(), 7);
        assert!(CardId::from_str("HLA1").is_err());
        assert!(CardId::from_str("-1").is_err());
        assert!(CardId::from_str("").is_err());
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&CardStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(serde_json::to_string(&CardStatus::Qa).unwrap(), "\"QA\"");
        let status: CardStatus = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(status, CardStatus::Done);
        assert!(serde_json::from_str::<CardStatus>("\"ARCHIVED\"").is_err());
    }

    #[test]
    fn test_status_parsing_accepts_headings() {
        assert_eq!(CardStatus::from_str("TODO").unwrap(), CardStatus::Todo);
        assert_eq!(CardStatus::from_str("in progress").unwrap(), CardStatus::InProgress);
        assert_eq!(CardStatus::from_str("In-Progress").unwrap(), CardStatus::InProgress);
        assert_eq!(CardStatus::from_str("qa").unwrap(), CardStatus::Qa);
        assert!(CardStatus::from_str("review").is_err());
    }

    #[test]
    fn test_status_title() {
        assert_eq!(CardStatus::InProgress.title(), "IN PROGRESS");
        assert_eq!(CardStatus::Todo.title(), "TODO");
    }

    #[test]
    fn test_status_defaults_to_todo() {
        assert_eq!(CardStatus::default(), CardStatus::Todo);
    }

    #[test]
    fn test_card_deserialization() {
        let json = r#"{
            "id": 3,
            "title": "Write docs",
            "description": null,
            "imgUrl": "https://example.com/a.png",
            "status": "QA"
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, CardId::new(3));
        assert!(card.description.is_none());
        assert_eq!(card.img_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(card.status, CardStatus::Qa);
    }

    #[test]
    fn test_card_deserialization_without_optional_fields() {
        let card: Card = serde_json::from_str(r#"{"id":1,"title":"A","status":"TODO"}"#).unwrap();
        assert!(card.description.is_none());
        assert!(card.img_url.is_none());
    }

    #[test]
    fn test_new_card_requires_title() {
        let err = NewCard::new("").normalized().unwrap_err();
        assert!(err.is_validation());

        let err = NewCard::new("   ").normalized().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_new_card_drops_blank_optionals() {
        let card = NewCard::new("  Ship it ")
            .with_description("  ")
            .with_img_url("")
            .normalized()
            .unwrap();

        assert_eq!(card.title, "Ship it");
        assert!(card.description.is_none());
        assert!(card.img_url.is_none());
    }

    #[test]
    fn test_new_card_rejects_invalid_image_url() {
        let err = NewCard::new("Card")
            .with_img_url("not a url")
            .normalized()
            .unwrap_err();
        assert!(err.is_validation());

        let card = NewCard::new("Card")
            .with_img_url("https://spaces-wp.imgix.net/cover.png")
            .normalized()
            .unwrap();
        assert_eq!(
            card.img_url.as_deref(),
            Some("https://spaces-wp.imgix.net/cover.png")
        );
    }

    #[test]
    fn test_status_patch_serializes_only_status() {
        let patch = CardPatch::status(CardStatus::Done);
        assert!(patch.is_status_only());
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"status":"DONE"}"#);
    }

    #[test]
    fn test_update_converts_to_full_patch() {
        let card = Card::new(5, "Old").with_description("desc");
        let mut update = CardUpdate::from_card(&card);
        update.title = "New".to_string();
        update.status = CardStatus::Qa;

        let patch = CardPatch::from(update.normalized().unwrap());
        assert!(!patch.is_status_only());
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(patch.description.as_deref(), Some("desc"));
        assert_eq!(patch.status, Some(CardStatus::Qa));

        let json = serde_json::to_string(&patch).unwrap();
        assert!(!json.contains("imgUrl"));
    }

    #[test]
    fn test_apply_patch() {
        let mut card = Card::new(1, "Title");
        card.apply(&CardPatch::status(CardStatus::InProgress));
        assert_eq!(card.status, CardStatus::InProgress);
        assert_eq!(card.title, "Title");

        card.apply(&CardPatch {
            title: Some("Renamed".to_string()),
            img_url: Some("https://example.com/x.png".to_string()),
            ..CardPatch::default()
        });
        assert_eq!(card.title, "Renamed");
        assert_eq!(card.img_url.as_deref(), Some("https://example.com/x.png"));
        assert_eq!(card.status, CardStatus::InProgress);
    }
}
