use serde::Serialize;

use crate::{
    deck::DeckId,
    hand::{Hand, Seat, BLACKJACK},
    provider::{DeckProvider, Draw, ProviderError},
};

const INITIAL_CARDS: usize = 2;

/// How a finished round ended. A tie is a loss for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    PlayerBlackjack,
    HouseBlackjack,
    PlayerBust,
    PlayerWins,
    Draw,
    HouseWins,
}

impl Outcome {
    /// Runs after every change to the totals. `None` means play continues.
    ///
    /// A player ahead of the house is paid out immediately, even straight
    /// off the deal.
    pub fn check(player: u32, house: u32) -> Option<Outcome> {
        if player == BLACKJACK && house < BLACKJACK {
            Some(Outcome::PlayerBlackjack)
        } else if house == BLACKJACK && player < BLACKJACK {
            Some(Outcome::HouseBlackjack)
        } else if player > BLACKJACK {
            Some(Outcome::PlayerBust)
        } else if player > house && player < BLACKJACK {
            Some(Outcome::PlayerWins)
        } else if player == BLACKJACK && house == BLACKJACK {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// Resolves a round the player has stood on.
    pub fn settle(player: u32, house: u32) -> Outcome {
        if house > BLACKJACK || (player <= BLACKJACK && player > house) {
            Outcome::PlayerWins
        } else if player == house {
            Outcome::Draw
        } else {
            Outcome::HouseWins
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::PlayerBlackjack => "Blackjack! You win!",
            Outcome::HouseBlackjack => "Computer has Blackjack. You lose!",
            Outcome::PlayerBust => "Busted! You lose.",
            Outcome::PlayerWins => "Congratulations! You win!",
            Outcome::Draw => "It's a draw! You lose!",
            Outcome::HouseWins => "Sorry, you lose. Better luck next time.",
        }
    }

    pub fn player_won(self) -> bool {
        matches!(self, Outcome::PlayerBlackjack | Outcome::PlayerWins)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    InProgress,
    Over(Outcome),
}

/// The provider call an action was waiting on when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    NewDeck,
    Deal,
    Draw,
}

impl Failure {
    pub fn message(self) -> &'static str {
        match self {
            Failure::NewDeck => "Error initializing game. Please try again.",
            Failure::Deal => "Error dealing initial cards. Please try again.",
            Failure::Draw => "Error drawing a card. Please try again.",
        }
    }
}

/// One game session: the active deck, both hands and the round status.
///
/// Every action draws first and commits afterwards, so a provider failure
/// leaves the session as it was apart from the error notice.
pub struct Game<P> {
    provider: P,
    deck: Option<DeckId>,
    player: Hand,
    house: Hand,
    state: GameState,
    notice: Option<Failure>,
    remaining: Option<usize>,
}

impl<P: DeckProvider> Game<P> {
    pub fn new(provider: P) -> Self {
        Game {
            provider,
            deck: None,
            player: Hand::new(Seat::Player),
            house: Hand::new(Seat::House),
            state: GameState::NotStarted,
            notice: None,
            remaining: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            GameState::Over(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    pub fn house(&self) -> &Hand {
        &self.house
    }

    pub fn deck(&self) -> Option<&DeckId> {
        self.deck.as_ref()
    }

    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn notice(&self) -> Option<Failure> {
        self.notice
    }

    /// Text to show the player: a pending error notice, otherwise the
    /// outcome of a finished round.
    pub fn message(&self) -> Option<&'static str> {
        self.notice
            .map(Failure::message)
            .or_else(|| self.outcome().map(Outcome::message))
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Acquires a deck and deals the first round.
    pub async fn play(&mut self) {
        if self.state != GameState::NotStarted {
            log::debug!("play ignored in state {:?}", self.state);
            return;
        }
        log::debug!("play");
        let deck = match self.provider.new_deck().await {
            Ok(deck) => deck,
            Err(err) => return self.fail(Failure::NewDeck, err),
        };
        log::info!("acquired deck {deck}");
        self.deal(deck).await;
    }

    /// Clears the table and deals again from the deck already held.
    pub async fn restart(&mut self) {
        let Some(deck) = self.deck.clone() else {
            return self.play().await;
        };
        log::debug!("restart on deck {deck}");
        self.deal(deck).await;
    }

    pub async fn hit(&mut self) {
        if self.state != GameState::InProgress {
            log::debug!("hit ignored in state {:?}", self.state);
            return;
        }
        let Some(deck) = self.deck.clone() else {
            return;
        };
        log::debug!("hit");
        match self.provider.draw(&deck, 1).await {
            Ok(draw) => {
                self.remaining = Some(draw.remaining);
                for card in draw.cards {
                    self.player.push(card);
                }
                self.notice = None;
                self.check();
            }
            Err(err) => self.fail(Failure::Draw, err),
        }
    }

    pub fn stand(&mut self) {
        if self.state != GameState::InProgress {
            log::debug!("stand ignored in state {:?}", self.state);
            return;
        }
        log::debug!("stand");
        let outcome = Outcome::settle(self.player.total(), self.house.total());
        self.finish(outcome);
    }

    async fn deal(&mut self, deck: DeckId) {
        // Player cards are requested before the house's.
        let player = match self.draw_initial(&deck).await {
            Ok(draw) => draw,
            Err(err) => return self.fail(Failure::Deal, err),
        };
        let house = match self.draw_initial(&deck).await {
            Ok(draw) => draw,
            Err(err) => return self.fail(Failure::Deal, err),
        };

        self.remaining = Some(house.remaining);
        self.player = Hand::dealt(Seat::Player, player.cards);
        self.house = Hand::dealt(Seat::House, house.cards);
        self.deck = Some(deck);
        self.notice = None;
        self.state = GameState::InProgress;
        log::debug!(
            "dealt player {} house {}",
            self.player.total(),
            self.house.total()
        );
        self.check();
    }

    async fn draw_initial(&mut self, deck: &DeckId) -> Result<Draw, ProviderError> {
        self.provider.draw(deck, INITIAL_CARDS).await
    }

    fn check(&mut self) {
        if let Some(outcome) = Outcome::check(self.player.total(), self.house.total()) {
            self.finish(outcome);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        log::info!(
            "round over: {outcome:?} (player {} house {})",
            self.player.total(),
            self.house.total()
        );
        self.notice = None;
        self.state = GameState::Over(outcome);
    }

    fn fail(&mut self, failure: Failure, err: ProviderError) {
        log::error!("{failure:?} failed: {err}");
        self.notice = Some(failure);
    }
}
