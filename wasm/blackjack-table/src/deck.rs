use std::fmt;
use std::str::FromStr;

use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;
use thiserror::Error;

const IMAGE_BASE: &str = "https://deckofcardsapi.com/static/img";

#[derive(Debug, Error, PartialEq)]
pub enum CardError {
    #[error("unknown card value: {0}")]
    Value(String),
    #[error("unknown card suit: {0}")]
    Suit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Blackjack value with the ace counted high.
    pub fn value(self) -> u32 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    /// Name used by the card API in the `value` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "JACK",
            Rank::Queen => "QUEEN",
            Rank::King => "KING",
            Rank::Ace => "ACE",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Rank::Ten => "0",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            other => other.as_str(),
        }
    }
}

impl FromStr for Rank {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .into_iter()
            .find(|rank| rank.as_str() == s)
            .ok_or_else(|| CardError::Value(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn as_str(self) -> &'static str {
        match self {
            Suit::Hearts => "HEARTS",
            Suit::Diamonds => "DIAMONDS",
            Suit::Clubs => "CLUBS",
            Suit::Spades => "SPADES",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Suit::Hearts => "H",
            Suit::Diamonds => "D",
            Suit::Clubs => "C",
            Suit::Spades => "S",
        }
    }
}

impl FromStr for Suit {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suit::ALL
            .into_iter()
            .find(|suit| suit.as_str() == s)
            .ok_or_else(|| CardError::Suit(s.to_string()))
    }
}

/// A drawn card. `code` and `image` are display references handed out by the
/// provider and are never interpreted.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    pub code: String,
    pub image: String,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        let code = format!("{}{}", rank.code(), suit.code());
        let image = format!("{IMAGE_BASE}/{code}.png");
        Card {
            rank,
            suit,
            code,
            image,
        }
    }

    pub fn label(&self) -> String {
        format!("{} of {}", self.rank.as_str(), self.suit.as_str())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeckId(String);

impl DeckId {
    pub fn new(id: impl Into<String>) -> Self {
        DeckId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An in-memory shuffled shoe of one or more standard decks.
pub struct Shoe {
    cards: Vec<Card>,
}

impl Shoe {
    pub fn new(num_decks: u8, rng: &mut SmallRng) -> Self {
        let mut cards = Vec::with_capacity(num_decks as usize * 52);
        for _ in 0..num_decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        cards.shuffle(rng);
        Shoe { cards }
    }

    pub fn seeded(num_decks: u8, seed: u64) -> Self {
        Shoe::new(num_decks, &mut SmallRng::seed_from_u64(seed))
    }

    /// Deals up to `count` cards from the top of the shoe.
    pub fn deal(&mut self, count: usize) -> Vec<Card> {
        let keep = self.cards.len().saturating_sub(count);
        let mut dealt = self.cards.split_off(keep);
        dealt.reverse();
        dealt
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }
}
