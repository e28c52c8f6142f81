//! Effect contract invoked when a bird is played or activated.
//!
//! The engine only knows [`Power::execute`]. A host can plug any effect in
//! through [`crate::domain::bird::Bird::with_power`]; the effects below are the
//! ones the engine ships with.

use std::fmt;

use tracing::debug;

use crate::domain::bird::BirdId;
use crate::domain::deck::Deck;
use crate::domain::food::{Birdfeeder, FoodType};
use crate::domain::player::Player;
use crate::domain::tray::BirdTray;
use crate::errors::GameError;

/// Shared pools an effect may draw from.
#[derive(Clone, Copy)]
pub struct Supply<'a> {
    pub deck: &'a Deck,
    pub tray: &'a BirdTray,
    pub feeder: &'a Birdfeeder,
}

pub trait Power: fmt::Debug + Send + Sync {
    /// Runs the effect of `bird`, owned by `player`.
    fn execute(
        &self,
        bird: BirdId,
        player: &mut Player,
        supply: &Supply<'_>,
    ) -> Result<(), GameError>;
}

/// Where gained food comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodSource {
    Feeder,
    /// Unlimited general supply.
    Supply,
}

/// Gains food of one type. `qty: None` takes every unit of that type in the feeder.
#[derive(Debug, Clone)]
pub struct GainFoodPower {
    pub food: FoodType,
    pub qty: Option<u32>,
    pub source: FoodSource,
}

impl Power for GainFoodPower {
    fn execute(
        &self,
        bird: BirdId,
        player: &mut Player,
        supply: &Supply<'_>,
    ) -> Result<(), GameError> {
        let qty = match (self.source, self.qty) {
            (FoodSource::Feeder, None) => supply.feeder.get_all(self.food)?,
            (_, Some(qty)) => qty,
            (FoodSource::Supply, None) => 1,
        };
        if self.source == FoodSource::Feeder {
            supply.feeder.get_food(self.food, qty)?;
        }
        player.gain_food(self.food, qty);
        debug!(bird_id = bird, food = ?self.food, qty, "Gain food power");
        Ok(())
    }
}

/// Caches food on the bird itself.
#[derive(Debug, Clone)]
pub struct CacheFoodPower {
    pub food: FoodType,
    pub qty: u32,
    pub source: FoodSource,
}

impl Power for CacheFoodPower {
    fn execute(
        &self,
        bird: BirdId,
        player: &mut Player,
        supply: &Supply<'_>,
    ) -> Result<(), GameError> {
        player.board().with_bird_mut(bird, |_| ())?;
        if self.source == FoodSource::Feeder {
            supply.feeder.get_food(self.food, self.qty)?;
        }
        player
            .board()
            .with_bird_mut(bird, |b| b.cache_food(self.qty))
    }
}

#[derive(Debug, Clone)]
pub struct DrawFromDeckPower {
    pub qty: u32,
}

impl Power for DrawFromDeckPower {
    fn execute(
        &self,
        _bird: BirdId,
        player: &mut Player,
        supply: &Supply<'_>,
    ) -> Result<(), GameError> {
        player.draw(supply.deck, self.qty as usize)?;
        Ok(())
    }
}

/// Tucks cards from the top of the deck under the bird.
#[derive(Debug, Clone)]
pub struct TuckFromDeckPower {
    pub qty: u32,
}

impl Power for TuckFromDeckPower {
    fn execute(
        &self,
        bird: BirdId,
        player: &mut Player,
        supply: &Supply<'_>,
    ) -> Result<(), GameError> {
        player.board().with_bird_mut(bird, |_| ())?;
        let tucked = supply.deck.draw(self.qty as usize)?;
        supply.deck.discard(tucked);
        player
            .board()
            .with_bird_mut(bird, |b| b.tuck_cards(self.qty))
    }
}
