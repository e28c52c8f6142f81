// The turn ring, round boundaries and game over

use std::collections::HashMap;

use session_engine::domain::rules;
use session_engine::{GameError, Notification, Phase, Socket, TurnOutcome};

use crate::support::{kinds, test_config, Table};

#[tokio::test]
async fn end_turn_rotates_and_counts_laps() {
    let mut table = Table::ready(3, test_config());
    let game = table.game.clone();
    let pids: Vec<_> = table.seats.iter().map(|s| s.pid).collect();

    assert_eq!(game.turn_order(), pids);
    let outcome = game.end_turn(table.seats[0].socket.id()).unwrap();
    assert_eq!(outcome, TurnOutcome::Continued);
    assert_eq!(game.current_player(), Some(pids[1]));
    assert_eq!(game.turn(), 0);

    game.end_turn(table.seats[1].socket.id()).unwrap();
    game.end_turn(table.seats[2].socket.id()).unwrap();
    // Back at the first player: one full lap
    assert_eq!(game.current_player(), Some(pids[0]));
    assert_eq!(game.turn(), 1);

    assert_eq!(kinds(&table.seats[0].drain()), ["wait_turn", "wait_turn", "start_turn"]);
}

#[tokio::test]
async fn only_the_current_player_may_act() {
    let table = Table::ready(2, test_config());
    let game = &table.game;
    let other = table.seats[1].socket.id();

    assert_eq!(game.end_turn(other).unwrap_err(), GameError::NotYourTurn);
    assert_eq!(game.draw_cards(other).unwrap_err(), GameError::NotYourTurn);
    assert_eq!(game.current_player(), Some(table.seats[0].pid));

    let stranger = session_engine::SocketId::new();
    assert_eq!(game.end_turn(stranger).unwrap_err(), GameError::PlayerNotFound);
}

#[tokio::test]
async fn rounds_shrink_and_the_first_player_moves() {
    let mut table = Table::ready(2, test_config());
    let game = table.game.clone();
    let pids: Vec<_> = table.seats.iter().map(|s| s.pid).collect();

    // Round 0 lasts max_turns laps
    let laps = rules::turns_for_round(game.config().max_turns, 0);
    let mut outcomes = Vec::new();
    for _ in 0..laps * 2 {
        let socket = table.current().socket.id();
        outcomes.push(game.end_turn(socket).unwrap());
    }
    assert_eq!(outcomes.last(), Some(&TurnOutcome::RoundEnded));
    assert!(outcomes[..outcomes.len() - 1]
        .iter()
        .all(|o| *o == TurnOutcome::Continued));

    assert_eq!(game.round(), 1);
    assert_eq!(game.turn(), 0);
    assert_eq!(game.first_player(), Some(pids[1]));
    assert_eq!(game.current_player(), Some(pids[1]));
    assert_eq!(game.tray().len(), game.config().tray_size);

    let msgs = table.seats[0].drain();
    assert!(msgs.iter().any(|m| matches!(
        m,
        Notification::RoundStarted { round: 1, first_player } if *first_player == pids[1]
    )));
}

#[tokio::test]
async fn a_full_game_ends_with_one_winner() {
    let mut table = Table::ready(2, test_config());
    let game = table.game.clone();

    let mut rounds_ended = 0;
    let mut finished = None;
    let mut turns_per_round: Vec<HashMap<_, u32>> = vec![HashMap::new()];
    for _ in 0..52 {
        let current = table.current().pid;
        *turns_per_round
            .last_mut()
            .unwrap()
            .entry(current)
            .or_default() += 1;
        let socket = table.current().socket.id();
        match game.end_turn(socket).unwrap() {
            TurnOutcome::Continued => {}
            TurnOutcome::RoundEnded => {
                rounds_ended += 1;
                turns_per_round.push(HashMap::new());
            }
            TurnOutcome::GameOver(result) => finished = Some(result),
        }
    }

    assert_eq!(rounds_ended, 3);
    let result = finished.expect("game over after the last round");
    assert_eq!(game.phase(), Phase::GameOver);
    assert!(game.is_closed());
    assert_eq!(game.result(), Some(result.clone()));
    assert_eq!(result.ranking.len(), 2);
    assert_eq!(result.losers.len(), 1);

    // 8, 7, 6, 5 turns each, and every player got the same share
    let expected = [8, 7, 6, 5];
    for (round, counts) in turns_per_round.iter().take(4).enumerate() {
        for seat in &table.seats {
            assert_eq!(counts.get(&seat.pid), Some(&expected[round]), "round {round}");
        }
    }

    let mut winners = 0;
    for seat in &mut table.seats {
        let over: Vec<_> = seat
            .drain()
            .into_iter()
            .filter_map(|m| match m {
                Notification::GameOver { won, .. } => Some(won),
                _ => None,
            })
            .collect();
        assert_eq!(over.len(), 1);
        winners += over.iter().filter(|w| **w).count();
    }
    assert_eq!(winners, 1);

    let socket = table.seats[0].socket.id();
    assert_eq!(game.end_turn(socket).unwrap_err(), GameError::SessionClosed);
    assert_eq!(game.draw_cards(socket).unwrap_err(), GameError::SessionClosed);
}

#[tokio::test]
async fn end_round_closes_the_round_early() {
    let table = Table::ready(2, test_config());
    let game = &table.game;

    assert_eq!(game.end_round().unwrap(), TurnOutcome::RoundEnded);
    assert_eq!(game.round(), 1);
    assert_eq!(game.current_player(), Some(table.seats[1].pid));
}

#[tokio::test]
async fn start_turn_reannounces_the_current_turn() {
    let mut table = Table::ready(2, test_config());
    table.game.start_turn().unwrap();
    assert_eq!(kinds(&table.seats[0].drain()), ["start_turn"]);
    assert_eq!(kinds(&table.seats[1].drain()), ["wait_turn"]);
}
