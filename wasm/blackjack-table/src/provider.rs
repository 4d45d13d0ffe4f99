use std::collections::HashMap;

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use thiserror::Error;

use crate::deck::{Card, CardError, DeckId, Shoe};

pub const DEFAULT_BASE_URL: &str = "https://deckofcardsapi.com/api/deck";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("deck api rejected request: {0}")]
    Rejected(String),
    #[error("expected {expected} cards, got {got}")]
    ShortDraw { expected: usize, got: usize },
    #[error("unknown deck: {0}")]
    UnknownDeck(DeckId),
    #[error(transparent)]
    Card(#[from] CardError),
}

/// Cards drawn in one call, plus the size of the deck afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub cards: Vec<Card>,
    pub remaining: usize,
}

/// Source of shuffled decks. Implementations either answer with exactly the
/// number of cards asked for or fail.
#[async_trait(?Send)]
pub trait DeckProvider {
    async fn new_deck(&mut self) -> Result<DeckId, ProviderError>;
    async fn draw(&mut self, deck: &DeckId, count: usize) -> Result<Draw, ProviderError>;
}

#[async_trait(?Send)]
impl<P: DeckProvider + ?Sized> DeckProvider for Box<P> {
    async fn new_deck(&mut self) -> Result<DeckId, ProviderError> {
        (**self).new_deck().await
    }

    async fn draw(&mut self, deck: &DeckId, count: usize) -> Result<Draw, ProviderError> {
        (**self).draw(deck, count).await
    }
}

#[derive(Debug, Deserialize)]
struct NewDeckPayload {
    success: bool,
    #[serde(default)]
    deck_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DrawPayload {
    success: bool,
    #[serde(default)]
    cards: Vec<CardPayload>,
    #[serde(default)]
    remaining: usize,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardPayload {
    code: String,
    image: String,
    value: String,
    suit: String,
}

impl TryFrom<CardPayload> for Card {
    type Error = CardError;

    fn try_from(payload: CardPayload) -> Result<Self, Self::Error> {
        Ok(Card {
            rank: payload.value.parse()?,
            suit: payload.suit.parse()?,
            code: payload.code,
            image: payload.image,
        })
    }
}

fn rejected(error: Option<String>) -> ProviderError {
    ProviderError::Rejected(error.unwrap_or_else(|| "success was false".to_string()))
}

pub(crate) fn parse_new_deck(body: &str) -> Result<DeckId, ProviderError> {
    let payload: NewDeckPayload = serde_json::from_str(body)?;
    match payload.deck_id {
        Some(id) if payload.success => Ok(DeckId::new(id)),
        _ => Err(rejected(payload.error)),
    }
}

pub(crate) fn parse_draw(body: &str, expected: usize) -> Result<Draw, ProviderError> {
    let payload: DrawPayload = serde_json::from_str(body)?;
    if !payload.success {
        return Err(rejected(payload.error));
    }
    if payload.cards.len() != expected {
        return Err(ProviderError::ShortDraw {
            expected,
            got: payload.cards.len(),
        });
    }
    let cards = payload
        .cards
        .into_iter()
        .map(Card::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Draw {
        cards,
        remaining: payload.remaining,
    })
}

/// Deck provider backed by the deckofcardsapi.com HTTP API.
pub struct HttpDeckProvider {
    base_url: String,
    deck_count: u8,
}

impl HttpDeckProvider {
    pub fn new(base_url: impl Into<String>, deck_count: u8) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpDeckProvider {
            base_url,
            deck_count: deck_count.max(1),
        }
    }

    pub fn new_deck_url(&self) -> String {
        format!("{}/new/shuffle/?deck_count={}", self.base_url, self.deck_count)
    }

    pub fn draw_url(&self, deck: &DeckId, count: usize) -> String {
        format!("{}/{}/draw/?count={}", self.base_url, deck, count)
    }

    async fn get(&self, url: &str) -> Result<String, ProviderError> {
        let transport = |err: gloo_net::Error| ProviderError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        };
        let response = Request::get(url).send().await.map_err(transport)?;
        if !response.ok() {
            return Err(ProviderError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        response.text().await.map_err(transport)
    }
}

impl Default for HttpDeckProvider {
    fn default() -> Self {
        HttpDeckProvider::new(DEFAULT_BASE_URL, 1)
    }
}

#[async_trait(?Send)]
impl DeckProvider for HttpDeckProvider {
    async fn new_deck(&mut self) -> Result<DeckId, ProviderError> {
        let url = self.new_deck_url();
        log::debug!("requesting deck: {url}");
        let body = self.get(&url).await?;
        parse_new_deck(&body)
    }

    async fn draw(&mut self, deck: &DeckId, count: usize) -> Result<Draw, ProviderError> {
        let url = self.draw_url(deck, count);
        log::debug!("drawing {count} from {deck}");
        let body = self.get(&url).await?;
        parse_draw(&body, count)
    }
}

/// Offline deck provider: shuffled shoes kept in memory, reproducible from a
/// seed.
pub struct LocalDeckProvider {
    deck_count: u8,
    seed: u64,
    shoes: HashMap<DeckId, Shoe>,
}

impl LocalDeckProvider {
    pub fn new(deck_count: u8, seed: u64) -> Self {
        LocalDeckProvider {
            deck_count: deck_count.max(1),
            seed,
            shoes: HashMap::new(),
        }
    }
}

#[async_trait(?Send)]
impl DeckProvider for LocalDeckProvider {
    async fn new_deck(&mut self) -> Result<DeckId, ProviderError> {
        let index = self.shoes.len() as u64;
        let id = DeckId::new(format!("local-{}-{}", self.seed, index));
        let shoe = Shoe::seeded(self.deck_count, self.seed.wrapping_add(index));
        self.shoes.insert(id.clone(), shoe);
        Ok(id)
    }

    async fn draw(&mut self, deck: &DeckId, count: usize) -> Result<Draw, ProviderError> {
        let shoe = self
            .shoes
            .get_mut(deck)
            .ok_or_else(|| ProviderError::UnknownDeck(deck.clone()))?;
        if shoe.remaining_cards() < count {
            return Err(ProviderError::Rejected(format!(
                "Not enough cards remaining to draw {count} additional"
            )));
        }
        let cards = shoe.deal(count);
        Ok(Draw {
            cards,
            remaining: shoe.remaining_cards(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Rank, Suit};
    use futures::executor::block_on;

    const NEW_DECK: &str = r#"{
        "success": true,
        "deck_id": "3p40paa87x90",
        "shuffled": true,
        "remaining": 52
    }"#;

    const DRAW_TWO: &str = r#"{
        "success": true,
        "deck_id": "3p40paa87x90",
        "cards": [
            {
                "code": "KH",
                "image": "https://deckofcardsapi.com/static/img/KH.png",
                "images": {
                    "svg": "https://deckofcardsapi.com/static/img/KH.svg",
                    "png": "https://deckofcardsapi.com/static/img/KH.png"
                },
                "value": "KING",
                "suit": "HEARTS"
            },
            {
                "code": "0C",
                "image": "https://deckofcardsapi.com/static/img/0C.png",
                "value": "10",
                "suit": "CLUBS"
            }
        ],
        "remaining": 50
    }"#;

    #[test]
    fn parses_new_deck() {
        let id = parse_new_deck(NEW_DECK).unwrap();
        assert_eq!(id.as_str(), "3p40paa87x90");
    }

    #[test]
    fn new_deck_failure_is_rejected() {
        let err = parse_new_deck(r#"{"success": false, "error": "bad deck_count"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Rejected(msg) if msg == "bad deck_count"));
    }

    #[test]
    fn parses_draw_in_provider_order() {
        let draw = parse_draw(DRAW_TWO, 2).unwrap();
        assert_eq!(draw.remaining, 50);
        assert_eq!(draw.cards[0].rank, Rank::King);
        assert_eq!(draw.cards[0].suit, Suit::Hearts);
        assert_eq!(draw.cards[1].rank, Rank::Ten);
        assert_eq!(draw.cards[1].code, "0C");
    }

    #[test]
    fn draw_with_fewer_cards_fails() {
        let err = parse_draw(DRAW_TWO, 3).unwrap_err();
        assert!(matches!(err, ProviderError::ShortDraw { expected: 3, got: 2 }));
    }

    #[test]
    fn exhausted_deck_is_rejected() {
        let body = r#"{
            "success": false,
            "deck_id": "3p40paa87x90",
            "cards": [],
            "remaining": 0,
            "error": "Not enough cards remaining to draw 1 additional"
        }"#;
        let err = parse_draw(body, 1).unwrap_err();
        assert!(matches!(err, ProviderError::Rejected(_)));
    }

    #[test]
    fn garbage_is_a_payload_error() {
        assert!(matches!(
            parse_draw("<html>502</html>", 1),
            Err(ProviderError::Payload(_))
        ));
    }

    #[test]
    fn unknown_card_value_fails() {
        let body = r#"{"success": true, "cards": [
            {"code": "X1", "image": "", "value": "JOKER", "suit": "HEARTS"}
        ], "remaining": 51}"#;
        assert!(matches!(
            parse_draw(body, 1),
            Err(ProviderError::Card(CardError::Value(_)))
        ));
    }

    #[test]
    fn urls_follow_the_api() {
        let provider = HttpDeckProvider::new("https://deckofcardsapi.com/api/deck/", 1);
        assert_eq!(
            provider.new_deck_url(),
            "https://deckofcardsapi.com/api/deck/new/shuffle/?deck_count=1"
        );
        assert_eq!(
            provider.draw_url(&DeckId::new("abc"), 2),
            "https://deckofcardsapi.com/api/deck/abc/draw/?count=2"
        );
    }

    #[test]
    fn local_provider_draws_and_counts_down() {
        let mut provider = LocalDeckProvider::new(1, 11);
        let deck = block_on(provider.new_deck()).unwrap();
        let draw = block_on(provider.draw(&deck, 2)).unwrap();
        assert_eq!(draw.cards.len(), 2);
        assert_eq!(draw.remaining, 50);
        let rest = block_on(provider.draw(&deck, 50)).unwrap();
        assert_eq!(rest.remaining, 0);
        assert!(matches!(
            block_on(provider.draw(&deck, 1)),
            Err(ProviderError::Rejected(_))
        ));
    }

    #[test]
    fn local_provider_refuses_unknown_decks() {
        let mut provider = LocalDeckProvider::new(1, 0);
        let err = block_on(provider.draw(&DeckId::new("nope"), 1)).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownDeck(_)));
    }
}
