//! A seated player: private food, hand, board and at most one pending action.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::bird::{Bird, BirdId, CostCondition, Trigger};
use crate::domain::board::Board;
use crate::domain::deck::Deck;
use crate::domain::food::{take_from, FoodMap, FoodType};
use crate::domain::pending::{ActionInput, ActionOutcome, PendingAction};
use crate::domain::power::Supply;
use crate::domain::rules;
use crate::errors::GameError;
use crate::ws::protocol::Notification;
use crate::ws::socket::{Socket, SocketId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of asking to play a bird.
#[derive(Debug, Clone)]
pub enum PlayOutcome {
    /// Cost paid and bird placed.
    Played(Bird),
    /// Several ways to pay; the player was prompted and the bird stays in hand.
    AwaitingPayment,
}

#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    socket: Option<Arc<dyn Socket>>,
    food: FoodMap,
    hand: BTreeMap<BirdId, Bird>,
    board: Board,
    pending: Option<PendingAction>,
    /// Bird whose cost prompt awaits `pay_bird_cost`.
    reserved: Option<BirdId>,
}

impl Player {
    pub fn new(id: PlayerId, columns: usize) -> Self {
        Self {
            id,
            socket: None,
            food: FoodMap::new(),
            hand: BTreeMap::new(),
            board: Board::new(columns),
            pending: None,
            reserved: None,
        }
    }

    pub fn with_socket(mut self, socket: Arc<dyn Socket>) -> Self {
        self.socket = Some(socket);
        self
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn socket_id(&self) -> Option<SocketId> {
        self.socket.as_ref().map(|s| s.id())
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    pub fn attach_socket(&mut self, socket: Arc<dyn Socket>) -> Option<Arc<dyn Socket>> {
        self.socket.replace(socket)
    }

    pub fn detach_socket(&mut self) -> Option<Arc<dyn Socket>> {
        self.socket.take()
    }

    /// Sends to the player's socket. Dropped while disconnected.
    pub fn notify(&self, msg: Notification) {
        let Some(socket) = &self.socket else {
            debug!(player_id = %self.id, "Player disconnected, notification dropped");
            return;
        };
        if let Err(err) = socket.send(msg) {
            warn!(player_id = %self.id, socket_id = %socket.id(), error = %err, "Failed to notify player");
        }
    }

    pub fn food(&self) -> &FoodMap {
        &self.food
    }

    pub fn food_of(&self, kind: FoodType) -> u32 {
        self.food.get(&kind).copied().unwrap_or(0)
    }

    pub fn food_total(&self) -> u32 {
        self.food.values().sum()
    }

    pub fn hand(&self) -> Vec<Bird> {
        self.hand.values().cloned().collect()
    }

    pub fn holds(&self, id: BirdId) -> bool {
        self.hand.contains_key(&id)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn reserved(&self) -> Option<BirdId> {
        self.reserved
    }

    pub fn draw(&mut self, deck: &Deck, qty: usize) -> Result<Vec<Bird>, GameError> {
        let drawn = deck.draw(qty)?;
        for bird in &drawn {
            self.gain_bird(bird.clone());
        }
        Ok(drawn)
    }

    pub fn gain_bird(&mut self, bird: Bird) {
        self.hand.insert(bird.id, bird);
    }

    pub fn gain_food(&mut self, kind: FoodType, qty: u32) {
        if qty > 0 {
            *self.food.entry(kind).or_insert(0) += qty;
        }
    }

    pub fn discard_food(&mut self, kind: FoodType, qty: u32) -> Result<(), GameError> {
        take_from(&mut self.food, kind, qty)
    }

    /// Discards a whole multiset, or nothing. Zero entries are ignored.
    pub fn discard_foods(&mut self, food: &FoodMap) -> Result<(), GameError> {
        let mut remaining = self.food.clone();
        for (&kind, &qty) in food.iter().filter(|(_, qty)| **qty > 0) {
            take_from(&mut remaining, kind, qty)?;
        }
        self.food = remaining;
        Ok(())
    }

    /// Keeps only the listed birds and returns the ones let go.
    pub fn keep_birds(&mut self, ids: &[BirdId]) -> Result<Vec<Bird>, GameError> {
        if let Some(missing) = ids.iter().find(|id| !self.hand.contains_key(id)) {
            return Err(GameError::CardNotFound(*missing));
        }
        let (kept, released): (BTreeMap<_, _>, BTreeMap<_, _>) = std::mem::take(&mut self.hand)
            .into_iter()
            .partition(|(id, _)| ids.contains(id));
        self.hand = kept;
        Ok(released.into_values().collect())
    }

    pub fn lay_egg(&mut self, id: BirdId, qty: u32) -> Result<(), GameError> {
        self.board.with_bird_mut(id, |bird| bird.lay_eggs(qty))?
    }

    pub fn total_score(&self) -> u32 {
        self.board.birds().iter().map(Bird::score).sum()
    }

    /// Plays a bird from hand, paying right away when the payment is unambiguous.
    pub fn play_bird(
        &mut self,
        id: BirdId,
        supply: &Supply<'_>,
    ) -> Result<PlayOutcome, GameError> {
        let bird = self.hand.get(&id).ok_or(GameError::CardNotFound(id))?;
        let habitat = bird.habitat;
        if self.board.is_row_full(habitat)? {
            return Err(GameError::RowFull(habitat));
        }

        let egg_cost = rules::egg_cost(self.board.exposed(habitat)?);
        let eggs = self.board.birds_with_eggs();
        let available: u32 = eggs.values().sum();
        if available < egg_cost {
            return Err(GameError::InsufficientEggs {
                required: egg_cost,
                available,
            });
        }

        let affordable: Vec<FoodType> = bird
            .food_cost
            .iter()
            .filter(|(kind, qty)| self.food_of(**kind) >= **qty)
            .map(|(kind, _)| *kind)
            .collect();
        let food_payment = match bird.cost_condition {
            CostCondition::All if affordable.len() < bird.food_cost.len() => {
                return Err(GameError::InsufficientFood);
            }
            CostCondition::All => Some(bird.food_cost.clone()),
            CostCondition::AnyOf if bird.food_cost.is_empty() => Some(FoodMap::new()),
            CostCondition::AnyOf => match affordable.as_slice() {
                [] => return Err(GameError::InsufficientFood),
                [kind] => Some(FoodMap::from([(*kind, bird.food_cost[kind])])),
                _ => None,
            },
        };

        let egg_payment = if egg_cost == 0 {
            Some(BTreeMap::new())
        } else if eggs.len() == 1 {
            eggs.keys().next().map(|source| BTreeMap::from([(*source, egg_cost)]))
        } else if available == egg_cost {
            Some(eggs.clone())
        } else {
            None
        };

        match (food_payment, egg_payment) {
            (Some(food), Some(eggs)) => {
                let played = self.settle(id, &food, &eggs, supply)?;
                self.reserved = None;
                Ok(PlayOutcome::Played(played))
            }
            (food, _) => {
                let options = match food {
                    Some(food) => food.into_keys().collect(),
                    None => affordable,
                };
                debug!(player_id = %self.id, bird_id = id, egg_cost, "Bird cost needs a choice");
                self.reserved = Some(id);
                self.notify(Notification::PayBirdCost {
                    bird_id: id,
                    egg_cost,
                    food: options,
                    eggs,
                });
                Ok(PlayOutcome::AwaitingPayment)
            }
        }
    }

    /// Pays for the reserved bird with an explicit choice of food types and egg sources.
    ///
    /// On failure the reservation stands so the client can retry.
    pub fn pay_bird_cost(
        &mut self,
        id: BirdId,
        food: &[FoodType],
        eggs: &BTreeMap<BirdId, u32>,
        supply: &Supply<'_>,
    ) -> Result<Bird, GameError> {
        match self.reserved {
            None => return Err(GameError::NoPendingAction),
            Some(reserved) if reserved != id => return Err(GameError::UnexpectedInput),
            Some(_) => {}
        }
        let bird = self.hand.get(&id).ok_or(GameError::CardNotFound(id))?;
        let habitat = bird.habitat;
        if self.board.is_row_full(habitat)? {
            return Err(GameError::RowFull(habitat));
        }

        let egg_cost = rules::egg_cost(self.board.exposed(habitat)?);
        let eggs: BTreeMap<BirdId, u32> = eggs
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(source, n)| (*source, *n))
            .collect();
        let offered: u32 = eggs.values().sum();
        if offered != egg_cost {
            return Err(GameError::InsufficientEggs {
                required: egg_cost,
                available: offered,
            });
        }
        for (&source, &n) in &eggs {
            let holder = self
                .board
                .bird(source)
                .ok_or(GameError::CardNotFound(source))?;
            if holder.egg_count < n {
                return Err(GameError::InsufficientEggs {
                    required: n,
                    available: holder.egg_count,
                });
            }
        }

        let payment = food_payment(bird, food)?;
        if payment
            .iter()
            .any(|(kind, qty)| self.food_of(*kind) < *qty)
        {
            return Err(GameError::InsufficientFood);
        }

        let played = self.settle(id, &payment, &eggs, supply)?;
        self.reserved = None;
        Ok(played)
    }

    /// Runs the activated power of a placed bird. Errors reach the caller.
    pub fn activate_power(&mut self, id: BirdId, supply: &Supply<'_>) -> Result<(), GameError> {
        let bird = self.board.bird(id).ok_or(GameError::CardNotFound(id))?;
        match bird.power(Trigger::WhenActivated) {
            Some(power) => power.execute(id, self, supply),
            None => Ok(()),
        }
    }

    /// Enters `action` and stores it until the player answers.
    pub fn set_state(
        &mut self,
        action: PendingAction,
        supply: &Supply<'_>,
    ) -> Result<(), GameError> {
        if let Some(active) = self.pending {
            error!(player_id = %self.id, ?active, requested = ?action, "Pending action already active");
            return Err(GameError::PendingActionActive);
        }
        action.enter(self, supply);
        self.pending = Some(action);
        Ok(())
    }

    /// Resumes the pending action. On failure it stays pending so the client can retry.
    pub fn process(
        &mut self,
        input: ActionInput,
        supply: &Supply<'_>,
    ) -> Result<ActionOutcome, GameError> {
        let action = self.pending.take().ok_or(GameError::NoPendingAction)?;
        match action.resume(self, input, supply) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.pending = Some(action);
                Err(err)
            }
        }
    }

    /// Drops the pending action and any payment reservation.
    pub fn clear_state(&mut self) -> Option<PendingAction> {
        self.reserved = None;
        self.pending.take()
    }

    /// Sends the pending prompt again, if any.
    pub fn reprompt(&self, supply: &Supply<'_>) {
        if let Some(action) = self.pending {
            action.enter(self, supply);
        }
    }

    // Payment was validated by the caller.
    fn settle(
        &mut self,
        id: BirdId,
        food: &FoodMap,
        eggs: &BTreeMap<BirdId, u32>,
        supply: &Supply<'_>,
    ) -> Result<Bird, GameError> {
        self.discard_foods(food)?;
        for (&source, &n) in eggs {
            self.board.with_bird_mut(source, |b| b.remove_eggs(n))??;
        }
        let bird = self.hand.remove(&id).ok_or(GameError::CardNotFound(id))?;

        if !food.is_empty() {
            self.notify(Notification::FoodUpdated {
                inventory: self.food.clone(),
            });
        }
        if !eggs.is_empty() {
            self.notify(Notification::BirdUpdated {
                eggs: eggs.iter().map(|(id, n)| (*id, -i64::from(*n))).collect(),
            });
        }
        self.place(bird, supply)
    }

    fn place(&mut self, bird: Bird, supply: &Supply<'_>) -> Result<Bird, GameError> {
        let habitat = bird.habitat;
        let played = bird.clone();
        self.board.play_bird(bird)?;
        debug!(player_id = %self.id, bird_id = played.id, ?habitat, "Bird placed");
        self.notify(Notification::BoardUpdated {
            habitat,
            bird: played.clone(),
        });

        if let Some(power) = played.power(Trigger::WhenPlayed) {
            if let Err(err) = power.execute(played.id, self, supply) {
                warn!(player_id = %self.id, bird_id = played.id, error = %err, "Play power skipped");
            }
        }
        for (bird_id, power) in self.board.activation_order(habitat)? {
            if let Err(err) = power.execute(bird_id, self, supply) {
                warn!(player_id = %self.id, bird_id, error = %err, "Activated power skipped");
            }
        }
        Ok(played)
    }
}

fn food_payment(bird: &Bird, chosen: &[FoodType]) -> Result<FoodMap, GameError> {
    let mut chosen = chosen.to_vec();
    chosen.sort_unstable();
    chosen.dedup();

    match bird.cost_condition {
        CostCondition::All => {
            if !chosen.iter().eq(bird.food_cost.keys()) {
                return Err(GameError::InsufficientFood);
            }
            Ok(bird.food_cost.clone())
        }
        CostCondition::AnyOf if bird.food_cost.is_empty() => Ok(FoodMap::new()),
        CostCondition::AnyOf => match chosen.as_slice() {
            [kind] => bird
                .food_cost
                .get(kind)
                .map(|qty| FoodMap::from([(*kind, *qty)]))
                .ok_or(GameError::InsufficientFood),
            _ => Err(GameError::InsufficientFood),
        },
    }
}
