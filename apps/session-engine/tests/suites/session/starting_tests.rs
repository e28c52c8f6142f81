// Formation and the starting-choice phase

use std::collections::BTreeMap;
use std::sync::Arc;

use session_engine::{
    ChannelSocket, ErrorCode, FoodType, Game, GameError, Notification, Phase, Socket,
};

use crate::support::{kinds, test_config, Table};

#[test]
fn empty_roster_is_rejected() {
    let err = Game::new(Vec::<Arc<dyn Socket>>::new(), test_config()).unwrap_err();
    assert_eq!(err, GameError::NoPlayers);
    assert_eq!(err.code(), ErrorCode::NoPlayers);
}

#[test]
fn zero_sized_rows_or_tray_are_rejected() {
    let roster = || {
        let (socket, _rx) = ChannelSocket::pair();
        vec![socket as Arc<dyn Socket>]
    };

    let mut config = test_config();
    config.row_columns = 0;
    let err = Game::new(roster(), config).unwrap_err();
    assert!(matches!(err, GameError::InvalidConfig(_)));
    assert_eq!(err.code(), ErrorCode::InvalidConfig);

    let mut config = test_config();
    config.tray_size = 0;
    assert!(matches!(
        Game::new(roster(), config),
        Err(GameError::InvalidConfig(_))
    ));
}

#[test]
fn formation_deals_hands_food_and_tray() {
    let table = Table::form(2, test_config());
    let game = &table.game;

    assert_eq!(game.phase(), Phase::Forming);
    assert_eq!(game.players().len(), 2);
    // 170 cards, 5 per player, 3 in the tray
    assert_eq!(game.deck_len(), 170 - 10 - 3);
    assert_eq!(game.tray().len(), 3);
    assert_eq!(game.feeder().values().sum::<u32>(), 5);

    // Top of the deck goes to the first seat
    let first: Vec<_> = game.hand(table.seats[0].pid).unwrap().iter().map(|b| b.id).collect();
    assert_eq!(first, vec![165, 166, 167, 168, 169]);
    for seat in &table.seats {
        let food = game.food(seat.pid).unwrap();
        for kind in FoodType::ALL {
            assert_eq!(food.get(&kind), Some(&1));
        }
    }
}

#[tokio::test]
async fn start_sends_starting_hands() {
    let mut table = Table::started(2, test_config());
    assert_eq!(table.game.phase(), Phase::AwaitingStartingChoices);

    for seat in &mut table.seats {
        let msgs = seat.drain();
        match msgs.as_slice() {
            [Notification::StartingHand { birds, food }] => {
                assert_eq!(birds.len(), 5);
                assert_eq!(food.values().sum::<u32>(), 5);
            }
            other => panic!("unexpected notifications: {other:?}"),
        }
    }

    let err = table
        .game
        .start(test_config().starting_timeout)
        .unwrap_err();
    assert!(matches!(err, GameError::PhaseMismatch(_)));
}

#[tokio::test]
async fn choices_then_discard_begin_the_first_round() {
    let mut table = Table::started(2, test_config());
    table.drain_all();
    let game = Arc::clone(&table.game);

    let seat0 = table.seats[0].socket.id();
    let keep: Vec<_> = game.hand(table.seats[0].pid).unwrap()[..2]
        .iter()
        .map(|b| b.id)
        .collect();
    game.choose_birds(seat0, &keep).unwrap();
    assert_eq!(game.hand(table.seats[0].pid).unwrap().len(), 2);
    assert_eq!(game.discarded_len(), 3);
    match table.seats[0].drain().as_slice() {
        [Notification::DiscardFood { amount, .. }] => assert_eq!(*amount, 2),
        other => panic!("unexpected notifications: {other:?}"),
    }

    let discard = BTreeMap::from([(FoodType::Fish, 1), (FoodType::Seed, 1)]);
    game.discard_food(seat0, &discard).unwrap();
    assert_eq!(game.food(table.seats[0].pid).unwrap().values().sum::<u32>(), 3);
    assert_eq!(game.phase(), Phase::AwaitingStartingChoices);

    // A second answer from the same player is refused
    assert_eq!(
        game.discard_food(seat0, &BTreeMap::new()).unwrap_err(),
        GameError::AlreadyResponded
    );
    assert_eq!(
        game.choose_birds(seat0, &[]).unwrap_err(),
        GameError::AlreadyResponded
    );

    let seat1 = table.seats[1].socket.id();
    game.discard_food(seat1, &BTreeMap::new()).unwrap();
    assert_eq!(game.phase(), Phase::TurnActive);
    assert_eq!(game.round(), 0);
    assert_eq!(game.turn(), 0);
    // Ring order follows answer order
    assert_eq!(game.current_player(), Some(table.seats[0].pid));
    assert_eq!(game.first_player(), Some(table.seats[0].pid));

    assert_eq!(kinds(&table.seats[0].drain()), ["round_started", "start_turn"]);
    assert_eq!(kinds(&table.seats[1].drain()), ["round_started", "wait_turn"]);
}

#[tokio::test]
async fn invalid_starting_choices_change_nothing() {
    let table = Table::started(2, test_config());
    let game = &table.game;
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    assert_eq!(
        game.choose_birds(socket, &[1]).unwrap_err(),
        GameError::CardNotFound(1)
    );
    assert_eq!(game.hand(pid).unwrap().len(), 5);

    let greedy = BTreeMap::from([(FoodType::Fish, 2)]);
    assert!(game.discard_food(socket, &greedy).is_err());
    assert_eq!(game.food(pid).unwrap().values().sum::<u32>(), 5);
    assert!(game.turn_order().is_empty());
}

#[tokio::test]
async fn turn_actions_are_refused_before_the_round() {
    let table = Table::started(2, test_config());
    let socket = table.seats[0].socket.id();
    assert!(matches!(
        table.game.end_turn(socket).unwrap_err(),
        GameError::PhaseMismatch(_)
    ));
    assert!(matches!(
        table.game.draw_cards(socket).unwrap_err(),
        GameError::PhaseMismatch(_)
    ));
}

#[tokio::test]
async fn start_turn_needs_a_ready_player() {
    let table = Table::started(2, test_config());
    let game = &table.game;
    assert_eq!(game.start_turn().unwrap_err(), GameError::NoPlayerReady);
    assert_eq!(game.start_turn().unwrap_err().code(), ErrorCode::NoPlayerReady);

    game.discard_food(table.seats[0].socket.id(), &BTreeMap::new())
        .unwrap();
    assert!(matches!(
        game.start_turn().unwrap_err(),
        GameError::PhaseMismatch(_)
    ));
}

#[test]
fn start_needs_a_runtime() {
    let table = Table::form(1, test_config());
    assert_eq!(
        table.game.start(test_config().starting_timeout).unwrap_err(),
        GameError::NoRuntime
    );
    assert_eq!(table.game.phase(), Phase::Forming);
}
