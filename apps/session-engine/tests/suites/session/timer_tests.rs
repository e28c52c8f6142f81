// Turn and starting timers under a paused clock

use std::time::Duration;

use session_engine::{ChannelSocket, Notification, Phase, Socket};
use tokio::time::sleep;

use crate::support::{drain, test_config, Table};

fn quick_turns() -> session_engine::GameConfig {
    test_config().with_turn_duration(Duration::from_millis(50))
}

#[tokio::test(start_paused = true)]
async fn idle_turn_passes_on_timeout() {
    let table = Table::ready(2, quick_turns());
    let game = table.game.clone();
    assert_eq!(game.current_player(), Some(table.seats[0].pid));

    sleep(Duration::from_millis(60)).await;
    assert_eq!(game.current_player(), Some(table.seats[1].pid));

    sleep(Duration::from_millis(50)).await;
    assert_eq!(game.current_player(), Some(table.seats[0].pid));
    assert_eq!(game.turn(), 1);
}

#[tokio::test(start_paused = true)]
async fn ending_a_turn_rearms_the_timer() {
    let table = Table::ready(2, quick_turns());
    let game = table.game.clone();

    sleep(Duration::from_millis(30)).await;
    game.end_turn(table.seats[0].socket.id()).unwrap();

    // The first timer would have fired at 50ms; it must not skip seat 1
    sleep(Duration::from_millis(30)).await;
    assert_eq!(game.current_player(), Some(table.seats[1].pid));

    sleep(Duration::from_millis(30)).await;
    assert_eq!(game.current_player(), Some(table.seats[0].pid));
}

#[tokio::test(start_paused = true)]
async fn timeouts_alone_finish_the_game() {
    let config = quick_turns();
    let table = Table::ready(2, config);
    let game = table.game.clone();
    let closed = game.closed();

    tokio::time::timeout(Duration::from_secs(60), closed.cancelled())
        .await
        .expect("game finishes on timeouts");
    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(game.round(), 4);
}

#[tokio::test(start_paused = true)]
async fn starting_timeout_cancels_the_match() {
    let config = test_config().with_starting_timeout(Duration::from_millis(100));
    let mut table = Table::started(2, config);
    table.drain_all();
    let game = table.game.clone();

    game.discard_food(table.seats[0].socket.id(), &Default::default())
        .unwrap();
    sleep(Duration::from_millis(150)).await;

    assert_eq!(game.phase(), Phase::Cancelled);
    assert!(game.is_closed());
    for seat in &mut table.seats {
        assert!(seat
            .drain()
            .iter()
            .any(|m| matches!(m, Notification::MatchCancelled { .. })));
    }
}

#[tokio::test(start_paused = true)]
async fn answering_in_time_disarms_the_starting_timer() {
    let config = test_config().with_starting_timeout(Duration::from_millis(100));
    let table = Table::ready(2, config);
    let game = table.game.clone();

    sleep(Duration::from_millis(150)).await;
    assert_eq!(game.phase(), Phase::TurnActive);
    assert!(!game.is_closed());
}

#[tokio::test(start_paused = true)]
async fn reconnect_reports_the_time_left_on_the_turn() {
    let table = Table::ready(2, quick_turns());
    let game = table.game.clone();
    let pid = table.seats[0].pid;

    sleep(Duration::from_millis(20)).await;
    game.disconnect(table.seats[0].socket.id()).unwrap();
    let (socket, mut rx) = ChannelSocket::pair();
    game.reconnect(pid, socket).unwrap();

    match drain(&mut rx).as_slice() {
        [Notification::StartTurn { duration_ms, .. }] => {
            assert!((25..=30).contains(duration_ms), "{duration_ms}ms left");
        }
        other => panic!("unexpected notifications: {other:?}"),
    }
    // Reconnecting did not extend the turn
    sleep(Duration::from_millis(35)).await;
    assert_eq!(game.current_player(), Some(table.seats[1].pid));
}
