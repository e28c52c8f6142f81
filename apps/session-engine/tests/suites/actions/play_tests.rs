// Playing birds: row placement, egg and food costs, powers

use std::collections::BTreeMap;
use std::sync::Arc;

use session_engine::domain::power::{DrawFromDeckPower, FoodSource, GainFoodPower};
use session_engine::domain::{CostCondition, PlayOutcome};
use session_engine::{Bird, FoodType, GameError, Habitat, Notification, Socket};

use crate::support::{kinds, test_config, Table};

/// 160 blank birds under `top`; the first seat is dealt the last five of `top`.
fn deck_under(top: Vec<Bird>) -> Vec<Bird> {
    let mut cards: Vec<Bird> = (0..160).map(Bird::new).collect();
    cards.extend(top);
    cards
}

fn blank_hand(ids: [u32; 5]) -> Vec<Bird> {
    ids.into_iter().map(Bird::new).collect()
}

#[tokio::test]
async fn free_bird_goes_to_its_row() {
    let mut table = Table::ready(2, test_config());
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    match game.play_bird(socket, 165).unwrap() {
        PlayOutcome::Played(bird) => assert_eq!(bird.id, 165),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(game.hand(pid).unwrap().len(), 4);
    let board = game.board(pid).unwrap();
    assert_eq!(board[&Habitat::Forest].len(), 1);
    assert!(board[&Habitat::Wetland].is_empty());

    assert!(kinds(&table.seats[0].drain()).contains(&"board_updated".to_string()));
    match table.seats[1].drain().as_slice() {
        [Notification::BirdPlayed { player, bird }] => {
            assert_eq!(*player, pid);
            assert_eq!(bird.id, 165);
        }
        other => panic!("unexpected notifications: {other:?}"),
    }
}

#[tokio::test]
async fn later_birds_cost_eggs() {
    let table = Table::ready(2, test_config());
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    game.play_bird(socket, 165).unwrap();
    assert_eq!(
        game.play_bird(socket, 166).unwrap_err(),
        GameError::InsufficientEggs {
            required: 1,
            available: 0
        }
    );
    assert_eq!(game.hand(pid).unwrap().len(), 4);

    game.lay_eggs(socket).unwrap();
    assert!(matches!(game.play_bird(socket, 166).unwrap(), PlayOutcome::Played(_)));
    let forest = &game.board(pid).unwrap()[&Habitat::Forest];
    assert_eq!(forest[0].egg_count, 1);
    assert_eq!(game.score(pid).unwrap(), 1 + 1 + 1);
}

#[tokio::test]
async fn full_rows_refuse_more_birds() {
    let mut config = test_config();
    config.row_columns = 1;
    let table = Table::ready(2, config);
    let socket = table.seats[0].socket.id();

    table.game.play_bird(socket, 165).unwrap();
    assert_eq!(
        table.game.play_bird(socket, 166).unwrap_err(),
        GameError::RowFull(Habitat::Forest)
    );
    assert_eq!(
        table.game.play_bird(socket, 1).unwrap_err(),
        GameError::CardNotFound(1)
    );
}

#[tokio::test]
async fn any_of_cost_with_choices_waits_for_payment() {
    let choosy = Bird::new(500)
        .with_habitat(Habitat::Wetland)
        .with_cost(CostCondition::AnyOf, [(FoodType::Fish, 1), (FoodType::Seed, 1)]);
    let mut top = blank_hand([501, 502, 503, 504, 505]);
    top[0] = choosy;
    let mut table = Table::ready_with_deck(2, test_config(), deck_under(top));
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    assert!(matches!(
        game.play_bird(socket, 500).unwrap(),
        PlayOutcome::AwaitingPayment
    ));
    assert!(game.board(pid).unwrap()[&Habitat::Wetland].is_empty());
    match table.seats[0].drain().as_slice() {
        [Notification::PayBirdCost {
            bird_id, egg_cost, food, ..
        }] => {
            assert_eq!(*bird_id, 500);
            assert_eq!(*egg_cost, 0);
            assert_eq!(food, &vec![FoodType::Seed, FoodType::Fish]);
        }
        other => panic!("unexpected notifications: {other:?}"),
    }

    assert_eq!(
        game.pay_bird_cost(socket, 500, &[FoodType::Rodent], &BTreeMap::new())
            .unwrap_err(),
        GameError::InsufficientFood
    );
    let played = game
        .pay_bird_cost(socket, 500, &[FoodType::Fish], &BTreeMap::new())
        .unwrap();
    assert_eq!(played.id, 500);
    assert_eq!(game.food(pid).unwrap().get(&FoodType::Fish), None);
    assert_eq!(game.food(pid).unwrap().get(&FoodType::Seed), Some(&1));
    assert_eq!(game.board(pid).unwrap()[&Habitat::Wetland].len(), 1);
}

#[tokio::test]
async fn payment_needs_a_prompt_from_this_turn() {
    let choosy = Bird::new(500)
        .with_habitat(Habitat::Wetland)
        .with_cost(CostCondition::AnyOf, [(FoodType::Fish, 1), (FoodType::Seed, 1)]);
    let mut top = blank_hand([501, 502, 503, 504, 505]);
    top[0] = choosy;
    let table = Table::ready_with_deck(1, test_config(), deck_under(top));
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    // A free bird in hand cannot be slipped in through a payment
    assert_eq!(
        game.pay_bird_cost(socket, 502, &[], &BTreeMap::new())
            .unwrap_err(),
        GameError::NoPendingAction
    );
    assert!(game.board(pid).unwrap()[&Habitat::Forest].is_empty());

    assert!(matches!(
        game.play_bird(socket, 500).unwrap(),
        PlayOutcome::AwaitingPayment
    ));
    assert_eq!(
        game.pay_bird_cost(socket, 502, &[], &BTreeMap::new())
            .unwrap_err(),
        GameError::UnexpectedInput
    );

    // The reservation does not outlive the turn
    game.end_turn(socket).unwrap();
    assert_eq!(
        game.pay_bird_cost(socket, 500, &[FoodType::Fish], &BTreeMap::new())
            .unwrap_err(),
        GameError::NoPendingAction
    );
}

#[tokio::test]
async fn unaffordable_food_cost_is_refused() {
    let pricey = Bird::new(500).with_cost(CostCondition::All, [(FoodType::Fish, 2)]);
    let mut top = blank_hand([501, 502, 503, 504, 505]);
    top[0] = pricey;
    let table = Table::ready_with_deck(2, test_config(), deck_under(top));
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    assert_eq!(
        table.game.play_bird(socket, 500).unwrap_err(),
        GameError::InsufficientFood
    );
    assert_eq!(table.game.food(pid).unwrap().values().sum::<u32>(), 5);
    assert_eq!(table.game.hand(pid).unwrap().len(), 5);
}

#[tokio::test]
async fn when_played_power_fires_on_placement() {
    let scout = Bird::new(500).with_power(
        session_engine::domain::Trigger::WhenPlayed,
        Arc::new(DrawFromDeckPower { qty: 2 }),
    );
    let mut top = blank_hand([501, 502, 503, 504, 505]);
    top[0] = scout;
    let table = Table::ready_with_deck(2, test_config(), deck_under(top));
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;
    let deck_before = table.game.deck_len();

    table.game.play_bird(socket, 500).unwrap();
    assert_eq!(table.game.hand(pid).unwrap().len(), 4 + 2);
    assert_eq!(table.game.deck_len(), deck_before - 2);
}

#[tokio::test]
async fn placing_a_bird_activates_the_row_behind_it() {
    let forager = Bird::new(500).with_power(
        session_engine::domain::Trigger::WhenActivated,
        Arc::new(GainFoodPower {
            food: FoodType::Fish,
            qty: Some(1),
            source: FoodSource::Supply,
        }),
    );
    let mut top = blank_hand([501, 502, 503, 504, 505]);
    top[0] = forager;
    let table = Table::ready_with_deck(2, test_config(), deck_under(top));
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    game.play_bird(socket, 500).unwrap();
    // Nothing behind the first bird
    assert_eq!(game.food(pid).unwrap()[&FoodType::Fish], 1);

    // The forager took 501's place in the hand
    assert!(game.hand(pid).unwrap().iter().all(|b| b.id != 501));
    game.lay_eggs(socket).unwrap();
    game.play_bird(socket, 502).unwrap();
    assert_eq!(game.food(pid).unwrap()[&FoodType::Fish], 2);

    // Explicit activation runs the same power
    game.activate_power(socket, 500).unwrap();
    assert_eq!(game.food(pid).unwrap()[&FoodType::Fish], 3);
    // Birds without the power do nothing; birds not on the board are refused
    game.activate_power(socket, 502).unwrap();
    assert_eq!(
        game.activate_power(socket, 503).unwrap_err(),
        GameError::CardNotFound(503)
    );
}
