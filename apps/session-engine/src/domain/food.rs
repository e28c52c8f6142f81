//! Food types and the shared birdfeeder.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodType {
    Fruit,
    Seed,
    Invertebrate,
    Fish,
    Rodent,
}

impl FoodType {
    pub const ALL: [FoodType; 5] = [
        FoodType::Fruit,
        FoodType::Seed,
        FoodType::Invertebrate,
        FoodType::Fish,
        FoodType::Rodent,
    ];
}

/// Food counts keyed by type. Entries are never zero.
pub type FoodMap = BTreeMap<FoodType, u32>;

#[derive(Debug)]
struct FeederState {
    counts: FoodMap,
    rng: ChaCha8Rng,
}

impl FeederState {
    fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// Shared bag of food units, bounded by `size`.
#[derive(Debug)]
pub struct Birdfeeder {
    size: u32,
    state: Mutex<FeederState>,
}

impl Birdfeeder {
    /// Creates a feeder and fills it. `seed` fixes the refill sequence.
    pub fn new(size: u32, seed: Option<u64>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or_else(rand::random::<u64>));
        let feeder = Self {
            size,
            state: Mutex::new(FeederState {
                counts: FoodMap::new(),
                rng,
            }),
        };
        feeder.refill();
        feeder
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Tops up the empty capacity with random units; existing units stay.
    pub fn refill(&self) {
        let mut state = self.state.lock();
        let missing = self.size.saturating_sub(state.total());
        for _ in 0..missing {
            let idx = state.rng.random_range(0..FoodType::ALL.len());
            *state.counts.entry(FoodType::ALL[idx]).or_insert(0) += 1;
        }
        debug!(added = missing, total = state.total(), "Birdfeeder refilled");
    }

    /// Units of `food` currently available.
    pub fn get_all(&self, food: FoodType) -> Result<u32, GameError> {
        self.state
            .lock()
            .counts
            .get(&food)
            .copied()
            .ok_or(GameError::FoodNotFound(food))
    }

    pub fn get_food(&self, food: FoodType, qty: u32) -> Result<(), GameError> {
        let mut state = self.state.lock();
        take_from(&mut state.counts, food, qty)
    }

    /// Removes a whole multiset, or nothing.
    pub fn take_many(&self, wanted: &FoodMap) -> Result<(), GameError> {
        let mut state = self.state.lock();
        for (&food, &qty) in wanted.iter().filter(|(_, qty)| **qty > 0) {
            check_available(&state.counts, food, qty)?;
        }
        for (&food, &qty) in wanted.iter().filter(|(_, qty)| **qty > 0) {
            take_from(&mut state.counts, food, qty)?;
        }
        Ok(())
    }

    pub fn list(&self) -> FoodMap {
        self.state.lock().counts.clone()
    }

    pub fn len(&self) -> u32 {
        self.state.lock().total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_available(counts: &FoodMap, food: FoodType, qty: u32) -> Result<u32, GameError> {
    let available = counts
        .get(&food)
        .copied()
        .ok_or(GameError::FoodNotFound(food))?;
    if available < qty {
        return Err(GameError::InsufficientSupply {
            requested: qty as usize,
            available: available as usize,
        });
    }
    Ok(available)
}

/// Decrements one entry, dropping it at zero. Shared with player inventories.
pub(crate) fn take_from(counts: &mut FoodMap, food: FoodType, qty: u32) -> Result<(), GameError> {
    let available = check_available(counts, food, qty)?;
    if available == qty {
        counts.remove(&food);
    } else {
        counts.insert(food, available - qty);
    }
    Ok(())
}
