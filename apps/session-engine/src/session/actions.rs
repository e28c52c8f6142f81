//! Gameplay actions for the player holding the turn.
//!
//! Quantities follow the acting player's exposure in the matching habitat.
//! An action resolves on the spot only when a single legal outcome exists;
//! otherwise the player is prompted and answers through the matching
//! follow-up call.

use std::collections::BTreeMap;

use crate::domain::bird::{Bird, BirdId, Habitat};
use crate::domain::food::{FoodMap, FoodType};
use crate::domain::pending::{ActionInput, ActionOutcome, PendingAction, Resolution};
use crate::domain::player::{PlayOutcome, PlayerId};
use crate::domain::rules;
use crate::errors::GameError;
use crate::session::game::Game;
use crate::ws::protocol::Notification;
use crate::ws::socket::SocketId;

impl Game {
    /// Wetland action.
    pub fn draw_cards(&self, socket: SocketId) -> Result<Resolution, GameError> {
        let state = self.state.lock();
        let (pid, player) = self.validate_socket(&state, socket)?;
        let supply = self.supply();

        let resolution = {
            let mut player = player.lock();
            let qty = rules::cards_to_draw(player.board().exposed(Habitat::Wetland)?);
            let action = PendingAction::DrawCards { qty };
            if self.tray.is_empty() {
                let outcome = action.resume(&mut player, ActionInput::Cards(Vec::new()), &supply)?;
                Resolution::Resolved(outcome)
            } else {
                player.set_state(action, &supply)?;
                Resolution::Prompted
            }
        };
        if let Resolution::Resolved(outcome) = &resolution {
            self.announce(pid, outcome);
        }
        Ok(resolution)
    }

    /// Answers a draw prompt with tray picks; the rest comes from the deck.
    pub fn draw_from_tray(
        &self,
        socket: SocketId,
        birds: Vec<BirdId>,
    ) -> Result<ActionOutcome, GameError> {
        self.resume(socket, ActionInput::Cards(birds))
    }

    /// Draws entirely from the deck, answering a pending draw prompt if there is one.
    pub fn draw_from_deck(&self, socket: SocketId) -> Result<ActionOutcome, GameError> {
        let state = self.state.lock();
        let (pid, player) = self.validate_socket(&state, socket)?;
        let supply = self.supply();

        let outcome = {
            let mut player = player.lock();
            match player.pending() {
                Some(_) => player.process(ActionInput::Cards(Vec::new()), &supply)?,
                None => {
                    let qty = rules::cards_to_draw(player.board().exposed(Habitat::Wetland)?);
                    PendingAction::DrawCards { qty }.resume(
                        &mut player,
                        ActionInput::Cards(Vec::new()),
                        &supply,
                    )?
                }
            }
        };
        self.announce(pid, &outcome);
        Ok(outcome)
    }

    /// Forest action. An empty feeder is refilled first.
    pub fn gain_food(&self, socket: SocketId) -> Result<Resolution, GameError> {
        let state = self.state.lock();
        let (_, player) = self.validate_socket(&state, socket)?;
        let supply = self.supply();
        let mut player = player.lock();

        if self.feeder.is_empty() {
            self.feeder.refill();
        }
        let exposed = player.board().exposed(Habitat::Forest)?;
        let qty = rules::food_to_gain(exposed).min(self.feeder.len());
        let available = self.feeder.list();
        let total: u32 = available.values().sum();
        let action = PendingAction::ChooseFood { qty };

        if available.len() == 1 || total == qty {
            let choice: FoodMap = if available.len() == 1 {
                available.into_keys().map(|food| (food, qty)).collect()
            } else {
                available
            };
            let outcome = action.resume(&mut player, ActionInput::Food(choice), &supply)?;
            return Ok(Resolution::Resolved(outcome));
        }
        player.set_state(action, &supply)?;
        Ok(Resolution::Prompted)
    }

    /// Answers a food prompt.
    pub fn choose_food(&self, socket: SocketId, food: FoodMap) -> Result<ActionOutcome, GameError> {
        self.resume(socket, ActionInput::Food(food))
    }

    /// Grassland action.
    pub fn lay_eggs(&self, socket: SocketId) -> Result<Resolution, GameError> {
        let state = self.state.lock();
        let (_, player) = self.validate_socket(&state, socket)?;
        let supply = self.supply();
        let mut player = player.lock();

        let qty = rules::eggs_to_lay(player.board().exposed(Habitat::Grassland)?);
        let room = player.board().birds_with_room();
        let total_room: u32 = room.values().sum();
        let action = PendingAction::LayEggs { qty };

        if room.len() <= 1 || total_room <= qty {
            let mut left = qty;
            let mut plan = BTreeMap::new();
            for (id, free) in room {
                let n = free.min(left);
                left -= n;
                if n > 0 {
                    plan.insert(id, n);
                }
            }
            let outcome = action.resume(&mut player, ActionInput::Eggs(plan), &supply)?;
            return Ok(Resolution::Resolved(outcome));
        }
        player.set_state(action, &supply)?;
        Ok(Resolution::Prompted)
    }

    /// Answers an egg prompt.
    pub fn lay_eggs_on_birds(
        &self,
        socket: SocketId,
        eggs: BTreeMap<BirdId, u32>,
    ) -> Result<ActionOutcome, GameError> {
        self.resume(socket, ActionInput::Eggs(eggs))
    }

    pub fn play_bird(&self, socket: SocketId, bird: BirdId) -> Result<PlayOutcome, GameError> {
        let state = self.state.lock();
        let (pid, player) = self.validate_socket(&state, socket)?;
        let outcome = player.lock().play_bird(bird, &self.supply())?;
        if let PlayOutcome::Played(played) = &outcome {
            self.announce_played(pid, played);
        }
        Ok(outcome)
    }

    /// Answers a cost prompt.
    pub fn pay_bird_cost(
        &self,
        socket: SocketId,
        bird: BirdId,
        food: &[FoodType],
        eggs: &BTreeMap<BirdId, u32>,
    ) -> Result<Bird, GameError> {
        let state = self.state.lock();
        let (pid, player) = self.validate_socket(&state, socket)?;
        let played = player
            .lock()
            .pay_bird_cost(bird, food, eggs, &self.supply())?;
        self.announce_played(pid, &played);
        Ok(played)
    }

    pub fn activate_power(&self, socket: SocketId, bird: BirdId) -> Result<(), GameError> {
        let state = self.state.lock();
        let (_, player) = self.validate_socket(&state, socket)?;
        player.lock().activate_power(bird, &self.supply())?;
        Ok(())
    }

    fn resume(&self, socket: SocketId, input: ActionInput) -> Result<ActionOutcome, GameError> {
        let state = self.state.lock();
        let (pid, player) = self.validate_socket(&state, socket)?;
        let outcome = player.lock().process(input, &self.supply())?;
        self.announce(pid, &outcome);
        Ok(outcome)
    }

    fn announce(&self, pid: PlayerId, outcome: &ActionOutcome) {
        if let ActionOutcome::CardsDrawn(birds) = outcome {
            self.broadcast_except(
                pid,
                Notification::BirdsDrawnByOther {
                    player: pid,
                    count: birds.len(),
                },
            );
        }
    }

    fn announce_played(&self, pid: PlayerId, bird: &Bird) {
        self.broadcast_except(
            pid,
            Notification::BirdPlayed {
                player: pid,
                bird: bird.clone(),
            },
        );
    }
}
