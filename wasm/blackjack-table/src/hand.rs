use crate::deck::{Card, Rank};

pub const BLACKJACK: u32 = 21;

/// Scores a sequence of ranks. Aces start at 11 and drop to 1, one at a
/// time, while the total is over 21.
pub fn score<I>(ranks: I) -> u32
where
    I: IntoIterator<Item = Rank>,
{
    let mut total = 0;
    let mut aces = 0;

    for rank in ranks {
        total += rank.value();
        if rank == Rank::Ace {
            aces += 1;
        }
    }

    while total > BLACKJACK && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    total
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seat {
    Player,
    House,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    seat: Seat,
    cards: Vec<Card>,
}

impl Hand {
    pub fn new(seat: Seat) -> Self {
        Hand {
            seat,
            cards: Vec::new(),
        }
    }

    pub fn dealt(seat: Seat, cards: Vec<Card>) -> Self {
        Hand { seat, cards }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn total(&self) -> u32 {
        score(self.cards.iter().map(|card| card.rank))
    }

    pub fn is_bust(&self) -> bool {
        self.total() > BLACKJACK
    }
}
