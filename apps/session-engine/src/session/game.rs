//! Session lifecycle: formation, starting choices, the turn ring and rounds.
//!
//! Lock order is `state` → player → tray → deck/feeder. Every operation that
//! touches a player takes the state lock first, so round and turn counters and
//! the armed timer always move together.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::domain::bird::{Bird, BirdId, Habitat};
use crate::domain::deck::Deck;
use crate::domain::food::{Birdfeeder, FoodMap, FoodType};
use crate::domain::pending::PendingAction;
use crate::domain::player::{Player, PlayerId};
use crate::domain::power::Supply;
use crate::domain::ring_buffer::RingBuffer;
use crate::domain::rules;
use crate::domain::scoring::{GameResult, PlayerScore};
use crate::domain::tray::BirdTray;
use crate::errors::GameError;
use crate::session::timer::{PhaseTimer, TimerKind};
use crate::session::{MatchId, Phase, TurnOutcome};
use crate::ws::protocol::Notification;
use crate::ws::socket::{Socket, SocketId};

#[derive(Debug)]
pub(super) struct SessionState {
    pub(super) phase: Phase,
    /// 0-based.
    pub(super) round: u32,
    /// Full laps of the ring completed this round.
    pub(super) turn: u32,
    pub(super) first_player: Option<PlayerId>,
    pub(super) timer: Option<PhaseTimer>,
    pub(super) epoch: u64,
    pub(super) result: Option<GameResult>,
}

#[derive(Debug)]
pub struct Game {
    pub(super) id: MatchId,
    pub(super) config: GameConfig,
    pub(super) roster: DashMap<PlayerId, Arc<Mutex<Player>>>,
    pub(super) sockets: DashMap<SocketId, PlayerId>,
    pub(super) seating: Vec<PlayerId>,
    pub(super) deck: Deck,
    pub(super) tray: BirdTray,
    pub(super) feeder: Birdfeeder,
    pub(super) turn_order: RingBuffer<PlayerId>,
    pub(super) state: Mutex<SessionState>,
    pub(super) closed: CancellationToken,
    pub(super) me: Weak<Game>,
}

impl Game {
    /// Forms a match over a shuffled deck of `config.deck_size` blank birds.
    pub fn new(roster: Vec<Arc<dyn Socket>>, config: GameConfig) -> Result<Arc<Self>, GameError> {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::random::<u64>()),
        };
        let cards: Vec<Bird> = (0..config.deck_size).map(Bird::new).collect();
        let deck = Deck::shuffled(cards, &mut rng);
        Self::with_deck(roster, config, deck)
    }

    /// Forms a match over a prepared deck. The top of the deck is dealt first.
    pub fn with_deck(
        roster: Vec<Arc<dyn Socket>>,
        config: GameConfig,
        deck: Deck,
    ) -> Result<Arc<Self>, GameError> {
        if roster.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if config.row_columns == 0 {
            return Err(GameError::InvalidConfig("row_columns must be greater than zero"));
        }
        if config.tray_size == 0 {
            return Err(GameError::InvalidConfig("tray_size must be greater than zero"));
        }

        let players = DashMap::new();
        let sockets = DashMap::new();
        let mut seating = Vec::with_capacity(roster.len());
        for socket in roster {
            let mut player =
                Player::new(PlayerId::new(), config.row_columns).with_socket(socket.clone());
            player.draw(&deck, config.initial_birds as usize)?;
            for food in FoodType::ALL {
                player.gain_food(food, config.initial_food_per_type);
            }
            sockets.insert(socket.id(), player.id());
            seating.push(player.id());
            players.insert(player.id(), Arc::new(Mutex::new(player)));
        }

        let tray = BirdTray::new(config.tray_size);
        tray.refill(&deck)?;
        let feeder = Birdfeeder::new(config.feeder_size, config.seed.map(|s| s.wrapping_add(1)));
        let turn_order = RingBuffer::new(seating.len());

        let game = Arc::new_cyclic(|me| Self {
            id: MatchId::new(),
            config,
            roster: players,
            sockets,
            seating,
            deck,
            tray,
            feeder,
            turn_order,
            state: Mutex::new(SessionState {
                phase: Phase::Forming,
                round: 0,
                turn: 0,
                first_player: None,
                timer: None,
                epoch: 0,
                result: None,
            }),
            closed: CancellationToken::new(),
            me: me.clone(),
        });
        info!(match_id = %game.id, players = game.seating.len(), "Match formed");
        Ok(game)
    }

    /// Sends every player their starting hand and arms the cancellation timer.
    pub fn start(&self, timeout: Duration) -> Result<(), GameError> {
        let mut state = self.state.lock();
        ensure_open(&state)?;
        if state.phase != Phase::Forming {
            return Err(GameError::PhaseMismatch("match already started"));
        }
        self.arm_timer(&mut state, timeout, TimerKind::Starting)?;
        state.phase = Phase::AwaitingStartingChoices;

        for player in self.players_in_seating() {
            let player = player.lock();
            player.notify(Notification::StartingHand {
                birds: player.hand(),
                food: player.food().clone(),
            });
        }
        info!(match_id = %self.id, ?timeout, "Match started");
        Ok(())
    }

    /// Keeps the listed starting birds and prompts for the food discard.
    pub fn choose_birds(&self, socket: SocketId, birds: &[BirdId]) -> Result<(), GameError> {
        let state = self.state.lock();
        ensure_phase(&state, Phase::AwaitingStartingChoices, "not choosing starting birds")?;
        let (pid, player) = self.player_for_socket(socket)?;
        if self.turn_order.contains(&pid) {
            return Err(GameError::AlreadyResponded);
        }

        let mut player = player.lock();
        let released = player.keep_birds(birds)?;
        self.deck.discard(released);
        player.notify(Notification::DiscardFood {
            amount: birds.len() as u32,
            food: player.food().clone(),
        });
        debug!(match_id = %self.id, player_id = %pid, kept = birds.len(), "Starting birds chosen");
        Ok(())
    }

    /// Applies the starting discard and queues the player. The round begins once everyone has.
    pub fn discard_food(&self, socket: SocketId, food: &FoodMap) -> Result<(), GameError> {
        let mut state = self.state.lock();
        ensure_phase(&state, Phase::AwaitingStartingChoices, "not discarding starting food")?;
        let (pid, player) = self.player_for_socket(socket)?;
        if self.turn_order.contains(&pid) {
            return Err(GameError::AlreadyResponded);
        }

        player.lock().discard_foods(food)?;
        self.turn_order.push(pid);
        debug!(match_id = %self.id, player_id = %pid, ready = self.turn_order.len(), "Starting food discarded");

        if self.turn_order.full() {
            self.disarm_timer(&mut state);
            self.begin_round(&mut state)?;
        }
        Ok(())
    }

    /// Announces the current turn again and re-arms its timer with the full duration.
    ///
    /// Host-side only; clients cannot reach it through the router.
    pub fn start_turn(&self) -> Result<(), GameError> {
        let mut state = self.state.lock();
        ensure_open(&state)?;
        if self.turn_order.is_empty() {
            return Err(GameError::NoPlayerReady);
        }
        ensure_phase(&state, Phase::TurnActive, "no round in progress")?;
        self.start_turn_locked(&mut state)
    }

    /// Ends the caller's turn and rotates the ring.
    pub fn end_turn(&self, socket: SocketId) -> Result<TurnOutcome, GameError> {
        let mut state = self.state.lock();
        self.validate_socket(&state, socket)?;
        self.advance_turn(&mut state)
    }

    /// Closes the current round immediately.
    pub fn end_round(&self) -> Result<TurnOutcome, GameError> {
        let mut state = self.state.lock();
        ensure_phase(&state, Phase::TurnActive, "no round in progress")?;
        self.end_round_locked(&mut state)
    }

    /// Detaches a socket. The player keeps their seat and state.
    pub fn disconnect(&self, socket: SocketId) -> Result<PlayerId, GameError> {
        let _state = self.state.lock();
        let (_, pid) = self
            .sockets
            .remove(&socket)
            .ok_or(GameError::PlayerNotFound)?;
        let player = self.player(pid)?;
        player.lock().detach_socket();
        info!(match_id = %self.id, player_id = %pid, socket_id = %socket, "Player disconnected");
        Ok(pid)
    }

    /// Attaches a new socket and replays what the player is expected to answer.
    pub fn reconnect(&self, pid: PlayerId, socket: Arc<dyn Socket>) -> Result<(), GameError> {
        let state = self.state.lock();
        ensure_open(&state)?;
        let player = self.player(pid)?;
        let mut player = player.lock();

        if let Some(old) = player.attach_socket(socket.clone()) {
            self.sockets.remove(&old.id());
        }
        self.sockets.insert(socket.id(), pid);
        info!(match_id = %self.id, player_id = %pid, socket_id = %socket.id(), "Player reconnected");

        match state.phase {
            Phase::AwaitingStartingChoices if !self.turn_order.contains(&pid) => {
                player.notify(Notification::StartingHand {
                    birds: player.hand(),
                    food: player.food().clone(),
                });
            }
            Phase::TurnActive => {
                if let Some(current) = self.turn_order.peek() {
                    player.notify(self.turn_notice(&state, pid, current));
                }
            }
            _ => {}
        }
        player.reprompt(&self.supply());
        Ok(())
    }

    /// Removes a player from roster and ring. Their turn, if current, passes on.
    pub fn remove_player(&self, pid: PlayerId) -> Result<(), GameError> {
        let mut state = self.state.lock();
        let (_, player) = self.roster.remove(&pid).ok_or(GameError::PlayerNotFound)?;
        player.lock().detach_socket();
        self.sockets.retain(|_, owner| *owner != pid);

        let ring = self.turn_order.values();
        let was_current = ring.first() == Some(&pid);
        let successor = ring
            .iter()
            .position(|p| *p == pid)
            .and_then(|i| ring.get((i + 1) % ring.len()).copied())
            .filter(|p| *p != pid);
        if !self.turn_order.evict(&pid) {
            let capacity = self.turn_order.capacity().saturating_sub(1);
            self.turn_order.resize(capacity);
        }
        info!(match_id = %self.id, player_id = %pid, remaining = self.roster.len(), "Player removed");

        if self.roster.is_empty() {
            if !state.phase.is_closed() {
                self.cancel_match(&mut state, "all players left");
            }
            return Ok(());
        }

        match state.phase {
            Phase::AwaitingStartingChoices if self.turn_order.full() => {
                self.disarm_timer(&mut state);
                self.begin_round(&mut state)?;
            }
            Phase::TurnActive => {
                let first = state.first_player;
                if first == Some(pid) {
                    state.first_player = successor;
                }
                match successor {
                    // Handing the turn back to the first player closes the lap.
                    Some(next) if was_current && first == Some(next) => {
                        self.pass_turn(&mut state, pid, next)?;
                    }
                    _ if was_current => self.start_turn_locked(&mut state)?,
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn round(&self) -> u32 {
        self.state.lock().round
    }

    pub fn turn(&self) -> u32 {
        self.state.lock().turn
    }

    pub fn first_player(&self) -> Option<PlayerId> {
        self.state.lock().first_player
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        if self.phase() != Phase::TurnActive {
            return None;
        }
        self.turn_order.peek()
    }

    /// Players still seated, in seating order.
    pub fn players(&self) -> Vec<PlayerId> {
        self.seating
            .iter()
            .filter(|pid| self.roster.contains_key(pid))
            .copied()
            .collect()
    }

    pub fn turn_order(&self) -> Vec<PlayerId> {
        self.turn_order.values()
    }

    pub fn player_for(&self, socket: SocketId) -> Option<PlayerId> {
        self.sockets.get(&socket).map(|entry| *entry.value())
    }

    pub fn tray(&self) -> Vec<Bird> {
        self.tray.birds()
    }

    pub fn feeder(&self) -> FoodMap {
        self.feeder.list()
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn discarded_len(&self) -> usize {
        self.deck.discarded_len()
    }

    pub fn hand(&self, pid: PlayerId) -> Result<Vec<Bird>, GameError> {
        Ok(self.player(pid)?.lock().hand())
    }

    pub fn food(&self, pid: PlayerId) -> Result<FoodMap, GameError> {
        Ok(self.player(pid)?.lock().food().clone())
    }

    pub fn board(&self, pid: PlayerId) -> Result<BTreeMap<Habitat, Vec<Bird>>, GameError> {
        Ok(self.player(pid)?.lock().board().rows())
    }

    pub fn pending(&self, pid: PlayerId) -> Result<Option<PendingAction>, GameError> {
        Ok(self.player(pid)?.lock().pending())
    }

    pub fn score(&self, pid: PlayerId) -> Result<u32, GameError> {
        Ok(self.player(pid)?.lock().total_score())
    }

    pub fn result(&self) -> Option<GameResult> {
        self.state.lock().result.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Cancelled when the match ends or is abandoned.
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Runs `f` on a player. `f` must not call back into this session.
    pub fn with_player_mut<R>(
        &self,
        pid: PlayerId,
        f: impl FnOnce(&mut Player) -> R,
    ) -> Result<R, GameError> {
        let player = self.player(pid)?;
        let mut player = player.lock();
        Ok(f(&mut player))
    }

    pub fn broadcast(&self, msg: Notification) {
        for player in self.players_in_seating() {
            player.lock().notify(msg.clone());
        }
    }

    pub(super) fn broadcast_except(&self, skip: PlayerId, msg: Notification) {
        for player in self.players_in_seating() {
            let player = player.lock();
            if player.id() != skip {
                player.notify(msg.clone());
            }
        }
    }

    pub(super) fn supply(&self) -> Supply<'_> {
        Supply {
            deck: &self.deck,
            tray: &self.tray,
            feeder: &self.feeder,
        }
    }

    pub(super) fn player(&self, pid: PlayerId) -> Result<Arc<Mutex<Player>>, GameError> {
        self.roster
            .get(&pid)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(GameError::PlayerNotFound)
    }

    fn player_for_socket(
        &self,
        socket: SocketId,
    ) -> Result<(PlayerId, Arc<Mutex<Player>>), GameError> {
        let pid = self.player_for(socket).ok_or(GameError::PlayerNotFound)?;
        Ok((pid, self.player(pid)?))
    }

    fn players_in_seating(&self) -> Vec<Arc<Mutex<Player>>> {
        self.seating
            .iter()
            .filter_map(|pid| self.player(*pid).ok())
            .collect()
    }

    /// The caller must own the current turn.
    pub(super) fn validate_socket(
        &self,
        state: &SessionState,
        socket: SocketId,
    ) -> Result<(PlayerId, Arc<Mutex<Player>>), GameError> {
        ensure_phase(state, Phase::TurnActive, "no turn in progress")?;
        let (pid, player) = self.player_for_socket(socket)?;
        let current = self.turn_order.peek().ok_or(GameError::NoPlayerReady)?;
        if current != pid {
            return Err(GameError::NotYourTurn);
        }
        Ok((pid, player))
    }

    fn begin_round(&self, state: &mut SessionState) -> Result<(), GameError> {
        let first = self.turn_order.peek().ok_or(GameError::NoPlayerReady)?;
        state.phase = Phase::TurnActive;
        state.first_player = Some(first);
        info!(match_id = %self.id, round = state.round, first_player = %first, "Round started");
        self.broadcast(Notification::RoundStarted {
            round: state.round,
            first_player: first,
        });
        self.start_turn_locked(state)
    }

    /// Time left on the armed turn timer, or the full duration when none is armed.
    fn turn_remaining(&self, state: &SessionState) -> Duration {
        state
            .timer
            .as_ref()
            .and_then(|timer| timer.remaining(TimerKind::Turn))
            .unwrap_or(self.config.turn_duration)
    }

    fn turn_notice(&self, state: &SessionState, to: PlayerId, current: PlayerId) -> Notification {
        let duration_ms = self.turn_remaining(state).as_millis() as u64;
        if to == current {
            Notification::StartTurn {
                round: state.round,
                turn: state.turn,
                duration_ms,
            }
        } else {
            Notification::WaitTurn {
                round: state.round,
                turn: state.turn,
                current,
                duration_ms,
            }
        }
    }

    pub(super) fn start_turn_locked(&self, state: &mut SessionState) -> Result<(), GameError> {
        let current = self.turn_order.peek().ok_or(GameError::NoPlayerReady)?;
        self.arm_timer(state, self.config.turn_duration, TimerKind::Turn)?;
        for player in self.players_in_seating() {
            let player = player.lock();
            player.notify(self.turn_notice(state, player.id(), current));
        }
        debug!(
            match_id = %self.id,
            round = state.round,
            turn = state.turn,
            player_id = %current,
            "Turn started"
        );
        Ok(())
    }

    /// Rotates the ring and passes the turn on.
    pub(super) fn advance_turn(&self, state: &mut SessionState) -> Result<TurnOutcome, GameError> {
        self.disarm_timer(state);
        let finished = self.turn_order.peek().ok_or(GameError::NoPlayerReady)?;
        if let Ok(player) = self.player(finished) {
            if let Some(abandoned) = player.lock().clear_state() {
                debug!(match_id = %self.id, player_id = %finished, ?abandoned, "Pending action dropped at turn end");
            }
        }

        let next = self.turn_order.rotate().ok_or(GameError::NoPlayerReady)?;
        self.pass_turn(state, finished, next)
    }

    /// Hands the turn to `next`, now at the head; counts a lap when it is the first player.
    fn pass_turn(
        &self,
        state: &mut SessionState,
        finished: PlayerId,
        next: PlayerId,
    ) -> Result<TurnOutcome, GameError> {
        if state.first_player == Some(next) {
            state.turn += 1;
        }
        debug!(match_id = %self.id, from = %finished, to = %next, turn = state.turn, "Turn rotated");

        if state.turn >= rules::turns_for_round(self.config.max_turns, state.round) {
            return self.end_round_locked(state);
        }
        if let Err(err) = self.tray.refill(&self.deck) {
            warn!(match_id = %self.id, error = %err, "Bird tray could not be topped up");
        }
        self.start_turn_locked(state)?;
        Ok(TurnOutcome::Continued)
    }

    fn end_round_locked(&self, state: &mut SessionState) -> Result<TurnOutcome, GameError> {
        self.disarm_timer(state);
        state.round += 1;
        state.turn = 0;
        self.turn_order.rotate();

        if state.round >= self.config.max_rounds {
            let result = self.finish(state)?;
            return Ok(TurnOutcome::GameOver(result));
        }

        if let Err(err) = self.tray.reset(&self.deck) {
            warn!(match_id = %self.id, error = %err, "Bird tray could not be reset");
        }
        let first = self.turn_order.peek().ok_or(GameError::NoPlayerReady)?;
        state.first_player = Some(first);
        info!(match_id = %self.id, round = state.round, first_player = %first, "Round started");
        self.broadcast(Notification::RoundStarted {
            round: state.round,
            first_player: first,
        });
        self.start_turn_locked(state)?;
        Ok(TurnOutcome::RoundEnded)
    }

    fn finish(&self, state: &mut SessionState) -> Result<GameResult, GameError> {
        let scores = self
            .players_in_seating()
            .iter()
            .map(|player| {
                let player = player.lock();
                PlayerScore {
                    player: player.id(),
                    score: player.total_score(),
                    food: player.food_total(),
                }
            })
            .collect();
        let result = GameResult::from_scores(scores).ok_or(GameError::NoPlayerReady)?;

        state.phase = Phase::GameOver;
        state.result = Some(result.clone());
        for player in self.players_in_seating() {
            let player = player.lock();
            player.notify(Notification::GameOver {
                won: result.is_winner(player.id()),
                result: result.clone(),
            });
        }
        info!(match_id = %self.id, winner = %result.winner, rounds = state.round, "Game over");
        self.closed.cancel();
        Ok(result)
    }

    pub(super) fn cancel_match(&self, state: &mut SessionState, reason: &str) {
        self.disarm_timer(state);
        state.phase = Phase::Cancelled;
        info!(match_id = %self.id, reason, "Match cancelled");
        self.broadcast(Notification::MatchCancelled {
            reason: reason.to_string(),
        });
        self.closed.cancel();
    }
}

fn ensure_open(state: &SessionState) -> Result<(), GameError> {
    if state.phase.is_closed() {
        return Err(GameError::SessionClosed);
    }
    Ok(())
}

fn ensure_phase(state: &SessionState, phase: Phase, reason: &'static str) -> Result<(), GameError> {
    ensure_open(state)?;
    if state.phase != phase {
        return Err(GameError::PhaseMismatch(reason));
    }
    Ok(())
}
