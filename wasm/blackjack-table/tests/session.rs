use blackjack_table::{
    game::{Failure, Game, GameState, Outcome},
    hand::score,
    provider::LocalDeckProvider,
    table::{Status, TableView},
};
use futures::executor::block_on;

fn play_out(game: &mut Game<LocalDeckProvider>) {
    while game.state() == GameState::InProgress && game.player().total() < 17 {
        let before = game.player().cards().len();
        block_on(game.hit());
        if game.player().cards().len() == before {
            return;
        }
    }
    game.stand();
}

fn assert_consistent(game: &Game<LocalDeckProvider>) {
    let player = game.player();
    assert_eq!(
        player.total(),
        score(player.cards().iter().map(|c| c.rank))
    );
    assert_eq!(game.outcome().is_some(), matches!(game.state(), GameState::Over(_)));
    if game.notice().is_none() {
        assert_eq!(game.message().is_some(), game.outcome().is_some());
    }
    if let Some(outcome) = game.outcome() {
        if outcome == Outcome::PlayerBust {
            assert!(player.is_bust());
        }
    }
}

#[test]
fn sessions_run_until_the_deck_is_spent() {
    for seed in 0..25 {
        let mut game = Game::new(LocalDeckProvider::new(1, seed));
        block_on(game.play());
        let deck = game.deck().cloned().expect("deck after play");
        assert_eq!(game.remaining(), Some(48));

        let mut rounds = 1;
        loop {
            assert_consistent(&game);
            play_out(&mut game);
            assert!(matches!(game.state(), GameState::Over(_)) || game.notice().is_some());

            let remaining = game.remaining().unwrap();
            block_on(game.restart());
            if game.notice() == Some(Failure::Deal) {
                assert!(remaining < 4, "seed {seed}: gave up with {remaining} cards");
                break;
            }
            rounds += 1;
            assert_eq!(game.deck(), Some(&deck));
            assert_eq!(game.remaining(), Some(remaining - 4));
            assert_eq!(game.player().cards().len(), 2);
            assert_eq!(game.house().cards().len(), 2);
        }
        assert!(rounds >= 5, "seed {seed}: only {rounds} rounds");
    }
}

#[test]
fn view_tracks_the_session() {
    let mut game = Game::new(LocalDeckProvider::new(1, 8));
    block_on(game.play());
    play_out(&mut game);

    let view = TableView::from_game(&game);
    assert_eq!(view.status, Status::Over);
    assert!(view.can_restart);
    assert!(!view.can_hit && !view.can_stand);
    assert_eq!(view.message, game.outcome().map(Outcome::message));
    assert_eq!(view.player_won, game.outcome().map(Outcome::player_won));

    block_on(game.restart());
    let view = TableView::from_game(&game);
    assert_eq!(view.player_hand.len(), 2);
    assert_eq!(view.deck_id.as_ref(), game.deck());
}

#[test]
fn same_seed_same_session() {
    let run = |seed| {
        let mut game = Game::new(LocalDeckProvider::new(2, seed));
        block_on(game.play());
        play_out(&mut game);
        (game.outcome(), game.player().total(), game.house().total())
    };
    assert_eq!(run(31), run(31));
}
