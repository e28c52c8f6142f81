// Forest food gains from the shared birdfeeder

use std::collections::BTreeMap;

use session_engine::domain::{ActionOutcome, PendingAction, Resolution};
use session_engine::{GameError, Notification, Socket};

use crate::support::{test_config, Table};

#[tokio::test]
async fn gained_food_leaves_the_feeder() {
    let mut table = Table::ready(2, test_config());
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;
    let before = game.feeder();

    let gained = match game.gain_food(socket).unwrap() {
        Resolution::Resolved(ActionOutcome::FoodGained(food)) => food,
        Resolution::Prompted => {
            assert_eq!(game.pending(pid).unwrap(), Some(PendingAction::ChooseFood { qty: 1 }));
            match table.seats[0].drain().as_slice() {
                [Notification::ChooseFood { amount, available }] => {
                    assert_eq!(*amount, 1);
                    assert_eq!(available, &before);
                }
                other => panic!("unexpected notifications: {other:?}"),
            }

            let kind = *before.keys().next().unwrap();
            assert_eq!(
                game.choose_food(socket, BTreeMap::from([(kind, 2)])).unwrap_err(),
                GameError::InvalidQuantity {
                    allowed: 1,
                    requested: 2
                }
            );
            match game.choose_food(socket, BTreeMap::from([(kind, 1)])).unwrap() {
                ActionOutcome::FoodGained(food) => food,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        other => panic!("unexpected resolution: {other:?}"),
    };

    assert_eq!(gained.values().sum::<u32>(), 1);
    assert_eq!(game.feeder().values().sum::<u32>(), 4);
    assert_eq!(game.food(pid).unwrap().values().sum::<u32>(), 6);
    assert_eq!(game.pending(pid).unwrap(), None);
}

#[tokio::test]
async fn food_the_feeder_lacks_is_refused() {
    let table = Table::ready(2, test_config());
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();

    if let Resolution::Prompted = game.gain_food(socket).unwrap() {
        let feeder = game.feeder();
        let missing = session_engine::FoodType::ALL
            .into_iter()
            .find(|kind| !feeder.contains_key(kind));
        if let Some(kind) = missing {
            assert_eq!(
                game.choose_food(socket, BTreeMap::from([(kind, 1)])).unwrap_err(),
                GameError::FoodNotFound(kind)
            );
            assert_eq!(game.feeder(), feeder);
        }
    }
}
