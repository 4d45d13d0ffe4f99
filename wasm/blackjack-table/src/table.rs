use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{
    deck::{Card, DeckId},
    game::{Game, GameState, Outcome},
    hand::Hand,
    provider::{DeckProvider, HttpDeckProvider, LocalDeckProvider, DEFAULT_BASE_URL},
};

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_deck_count() -> u8 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_deck_count")]
    pub deck_count: u8,
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            base_url: default_base_url(),
            deck_count: default_deck_count(),
            offline: false,
            seed: 0,
            log_level: default_log_level(),
        }
    }
}

impl TableConfig {
    pub fn provider(&self) -> Box<dyn DeckProvider> {
        if self.offline {
            Box::new(LocalDeckProvider::new(self.deck_count, self.seed))
        } else {
            Box::new(HttpDeckProvider::new(self.base_url.as_str(), self.deck_count))
        }
    }

    /// Unknown level names fall back to `info`.
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    NotStarted,
    InProgress,
    Over,
}

#[derive(Debug, Serialize)]
pub struct CardView {
    pub code: String,
    pub value: &'static str,
    pub suit: &'static str,
    pub image: String,
    pub label: String,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        CardView {
            code: card.code.clone(),
            value: card.rank.as_str(),
            suit: card.suit.as_str(),
            image: card.image.clone(),
            label: card.label(),
        }
    }
}

fn cards(hand: &Hand) -> Vec<CardView> {
    hand.cards().iter().map(CardView::from).collect()
}

/// Everything the page needs to draw the table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub status: Status,
    pub player_hand: Vec<CardView>,
    pub house_hand: Vec<CardView>,
    pub player_total: u32,
    pub house_total: u32,
    pub message: Option<&'static str>,
    pub outcome: Option<Outcome>,
    pub player_won: Option<bool>,
    pub can_hit: bool,
    pub can_stand: bool,
    pub can_restart: bool,
    pub deck_id: Option<DeckId>,
    pub remaining: Option<usize>,
}

impl TableView {
    pub fn from_game<P: DeckProvider>(game: &Game<P>) -> Self {
        let status = match game.state() {
            GameState::NotStarted => Status::NotStarted,
            GameState::InProgress => Status::InProgress,
            GameState::Over(_) => Status::Over,
        };
        let outcome = game.outcome();
        let message = game.message();
        TableView {
            status,
            player_hand: cards(game.player()),
            house_hand: cards(game.house()),
            player_total: game.player().total(),
            house_total: game.house().total(),
            message,
            outcome,
            player_won: outcome.map(Outcome::player_won),
            can_hit: status == Status::InProgress,
            can_stand: status == Status::InProgress,
            can_restart: message.is_some(),
            deck_id: game.deck().cloned(),
            remaining: game.remaining(),
        }
    }
}
