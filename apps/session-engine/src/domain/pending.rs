//! Suspended multi-step actions.
//!
//! A [`PendingAction`] is entered (the client is prompted) and later resumed
//! with the client's [`ActionInput`]. Resuming is all-or-nothing: on error no
//! pool, inventory or board has changed.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::bird::{Bird, BirdId};
use crate::domain::food::FoodMap;
use crate::domain::player::Player;
use crate::domain::power::Supply;
use crate::errors::GameError;
use crate::ws::protocol::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Pick exactly `qty` food units from the feeder.
    ChooseFood { qty: u32 },
    /// Draw `qty` cards, any of them from the tray and the rest from the deck.
    DrawCards { qty: u32 },
    /// Lay up to `qty` eggs across placed birds.
    LayEggs { qty: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionInput {
    Food(FoodMap),
    Cards(Vec<BirdId>),
    Eggs(BTreeMap<BirdId, u32>),
}

#[derive(Debug, Clone)]
pub enum ActionOutcome {
    FoodGained(FoodMap),
    CardsDrawn(Vec<Bird>),
    EggsLaid(BTreeMap<BirdId, u32>),
}

/// How a gameplay action request ended.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Exactly one legal outcome existed and it was applied.
    Resolved(ActionOutcome),
    /// The player was prompted and the action is now pending.
    Prompted,
}

impl PendingAction {
    pub fn qty(&self) -> u32 {
        match self {
            PendingAction::ChooseFood { qty }
            | PendingAction::DrawCards { qty }
            | PendingAction::LayEggs { qty } => *qty,
        }
    }

    /// Prompt describing what the player must choose.
    pub fn prompt(&self, player: &Player, supply: &Supply<'_>) -> Notification {
        match *self {
            PendingAction::ChooseFood { qty } => Notification::ChooseFood {
                amount: qty,
                available: supply.feeder.list(),
            },
            PendingAction::DrawCards { qty } => Notification::DrawCards {
                amount: qty,
                tray: supply.tray.birds(),
            },
            PendingAction::LayEggs { qty } => Notification::LayEggs {
                amount: qty,
                birds: player.board().birds_with_room(),
            },
        }
    }

    pub fn enter(&self, player: &Player, supply: &Supply<'_>) {
        player.notify(self.prompt(player, supply));
    }

    pub fn resume(
        &self,
        player: &mut Player,
        input: ActionInput,
        supply: &Supply<'_>,
    ) -> Result<ActionOutcome, GameError> {
        match (*self, input) {
            (PendingAction::ChooseFood { qty }, ActionInput::Food(food)) => {
                choose_food(qty, player, food, supply)
            }
            (PendingAction::DrawCards { qty }, ActionInput::Cards(ids)) => {
                draw_cards(qty, player, &ids, supply)
            }
            (PendingAction::LayEggs { qty }, ActionInput::Eggs(eggs)) => {
                lay_eggs(qty, player, eggs)
            }
            _ => Err(GameError::UnexpectedInput),
        }
    }
}

fn choose_food(
    qty: u32,
    player: &mut Player,
    mut food: FoodMap,
    supply: &Supply<'_>,
) -> Result<ActionOutcome, GameError> {
    food.retain(|_, n| *n > 0);
    let total: u32 = food.values().sum();
    if total != qty {
        return Err(GameError::InvalidQuantity {
            allowed: qty,
            requested: total,
        });
    }
    supply.feeder.take_many(&food)?;
    for (&kind, &n) in &food {
        player.gain_food(kind, n);
    }
    debug!(player_id = %player.id(), total, "Food taken from feeder");
    player.notify(Notification::FoodGained { food: food.clone() });
    Ok(ActionOutcome::FoodGained(food))
}

fn draw_cards(
    qty: u32,
    player: &mut Player,
    ids: &[BirdId],
    supply: &Supply<'_>,
) -> Result<ActionOutcome, GameError> {
    let requested = ids.len() as u32;
    if requested > qty {
        return Err(GameError::InvalidQuantity {
            allowed: qty,
            requested,
        });
    }

    let from_deck = supply.deck.draw((qty - requested) as usize)?;
    let from_tray = match supply.tray.take_many(ids) {
        Ok(birds) => birds,
        Err(err) => {
            supply.deck.put_back(from_deck);
            return Err(err);
        }
    };

    let drawn: Vec<Bird> = from_tray.into_iter().chain(from_deck).collect();
    for bird in &drawn {
        player.gain_bird(bird.clone());
    }
    debug!(
        player_id = %player.id(),
        tray = requested,
        deck = qty - requested,
        "Cards drawn"
    );
    player.notify(Notification::BirdsDrawn {
        birds: drawn.clone(),
    });
    Ok(ActionOutcome::CardsDrawn(drawn))
}

fn lay_eggs(
    qty: u32,
    player: &mut Player,
    mut eggs: BTreeMap<BirdId, u32>,
) -> Result<ActionOutcome, GameError> {
    eggs.retain(|_, n| *n > 0);
    let total: u32 = eggs.values().sum();
    if total > qty {
        return Err(GameError::InvalidQuantity {
            allowed: qty,
            requested: total,
        });
    }

    for (&id, &n) in &eggs {
        let bird = player.board().bird(id).ok_or(GameError::CardNotFound(id))?;
        if bird.egg_room() < n {
            return Err(GameError::EggLimitReached(id));
        }
    }
    for (&id, &n) in &eggs {
        player.lay_egg(id, n)?;
    }

    debug!(player_id = %player.id(), total, "Eggs laid");
    player.notify(Notification::BirdUpdated {
        eggs: eggs.iter().map(|(id, n)| (*id, i64::from(*n))).collect(),
    });
    Ok(ActionOutcome::EggsLaid(eggs))
}
