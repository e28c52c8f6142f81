// Grassland egg laying

use std::collections::BTreeMap;

use session_engine::domain::{ActionOutcome, PendingAction, PlayOutcome, Resolution};
use session_engine::{GameError, Habitat, Socket};

use crate::support::{test_config, Table};

#[tokio::test]
async fn nothing_to_lay_on_resolves_empty() {
    let table = Table::ready(2, test_config());
    match table.game.lay_eggs(table.seats[0].socket.id()).unwrap() {
        Resolution::Resolved(ActionOutcome::EggsLaid(eggs)) => assert!(eggs.is_empty()),
        other => panic!("unexpected resolution: {other:?}"),
    }
}

#[tokio::test]
async fn several_birds_with_room_prompt_for_a_split() {
    let table = Table::ready(2, test_config());
    let game = table.game.clone();
    let socket = table.seats[0].socket.id();
    let pid = table.seats[0].pid;

    // 165 is free; 166 then costs one egg, taken from 165
    assert!(matches!(game.play_bird(socket, 165).unwrap(), PlayOutcome::Played(_)));
    match game.lay_eggs(socket).unwrap() {
        Resolution::Resolved(ActionOutcome::EggsLaid(eggs)) => {
            assert_eq!(eggs, BTreeMap::from([(165, 2)]));
        }
        other => panic!("unexpected resolution: {other:?}"),
    }
    assert!(matches!(game.play_bird(socket, 166).unwrap(), PlayOutcome::Played(_)));

    assert!(matches!(game.lay_eggs(socket).unwrap(), Resolution::Prompted));
    assert_eq!(game.pending(pid).unwrap(), Some(PendingAction::LayEggs { qty: 2 }));

    assert_eq!(
        game.lay_eggs_on_birds(socket, BTreeMap::from([(166, 3)])).unwrap_err(),
        GameError::InvalidQuantity {
            allowed: 2,
            requested: 3
        }
    );
    assert_eq!(
        game.lay_eggs_on_birds(socket, BTreeMap::from([(165, 2)])).unwrap_err(),
        GameError::EggLimitReached(165)
    );
    assert_eq!(
        game.lay_eggs_on_birds(socket, BTreeMap::from([(7, 1)])).unwrap_err(),
        GameError::CardNotFound(7)
    );

    game.lay_eggs_on_birds(socket, BTreeMap::from([(165, 1), (166, 1)]))
        .unwrap();
    let forest = &game.board(pid).unwrap()[&Habitat::Forest];
    let eggs: Vec<_> = forest.iter().map(|b| (b.id, b.egg_count)).collect();
    assert_eq!(eggs, vec![(165, 2), (166, 1)]);
    assert_eq!(game.pending(pid).unwrap(), None);
}
