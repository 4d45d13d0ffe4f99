use std::rc::Rc;

use futures::lock::Mutex;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

pub mod deck;
pub mod game;
pub mod hand;
pub mod logger;
pub mod provider;
pub mod table;

use game::Game;
use provider::DeckProvider;
use table::{TableConfig, TableView};

type Session = Game<Box<dyn DeckProvider>>;

fn render(game: &Session) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&TableView::from_game(game))
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}

/// A blackjack table for one page. Actions queue behind each other, so a
/// second click while a draw is in flight runs after it.
#[wasm_bindgen]
pub struct BlackjackTable {
    session: Rc<Mutex<Session>>,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<BlackjackTable, JsValue> {
        console_error_panic_hook::set_once();
        let config: TableConfig = if config.is_undefined() || config.is_null() {
            TableConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|err| JsValue::from_str(&format!("Invalid config: {err}")))?
        };
        logger::init(config.log_level());
        log::debug!("table config: {config:?}");

        Ok(BlackjackTable {
            session: Rc::new(Mutex::new(Game::new(config.provider()))),
        })
    }

    pub fn play(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let mut game = session.lock().await;
            game.play().await;
            render(&game)
        })
    }

    pub fn hit(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let mut game = session.lock().await;
            game.hit().await;
            render(&game)
        })
    }

    pub fn stand(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let mut game = session.lock().await;
            game.stand();
            render(&game)
        })
    }

    pub fn restart(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let mut game = session.lock().await;
            game.restart().await;
            render(&game)
        })
    }

    pub fn view(&self) -> Promise {
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let game = session.lock().await;
            render(&game)
        })
    }
}

/// Scores card values as the deck API names them, e.g. `["ACE", "KING"]`.
#[wasm_bindgen]
pub fn score_hand(values: &JsValue) -> Result<u32, JsValue> {
    console_error_panic_hook::set_once();
    let values: Vec<String> = serde_wasm_bindgen::from_value(values.clone())
        .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?;
    let ranks = values
        .iter()
        .map(|value| value.parse::<deck::Rank>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| JsValue::from_str(&format!("Invalid card: {err}")))?;
    Ok(hand::score(ranks))
}
