//! Bird cards and their metadata.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::food::FoodType;
use crate::domain::power::Power;
use crate::errors::GameError;

pub type BirdId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Habitat {
    Forest,
    Grassland,
    Wetland,
}

impl Habitat {
    pub const ALL: [Habitat; 3] = [Habitat::Forest, Habitat::Grassland, Habitat::Wetland];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestType {
    Platform,
    Bowl,
    Cavity,
    Ground,
}

/// Whether every listed food type is required, or any single one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCondition {
    All,
    AnyOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    WhenPlayed,
    WhenActivated,
}

/// A bird card. Cost and stat fields are fixed once drawn; eggs, cached food
/// and tucked cards change while it sits in a hand or on a board.
#[derive(Debug, Clone, Serialize)]
pub struct Bird {
    pub id: BirdId,
    pub name: String,
    pub points: u32,
    pub egg_limit: u32,
    pub egg_count: u32,
    pub cached_food: u32,
    pub tucked_cards: u32,
    pub wingspan: u32,
    pub hunting_power: u32,
    pub nest_type: NestType,
    pub habitat: Habitat,
    pub cost_condition: CostCondition,
    pub food_cost: BTreeMap<FoodType, u32>,
    #[serde(skip)]
    powers: HashMap<Trigger, Arc<dyn Power>>,
}

impl Bird {
    /// Blank forest bird with no cost, no points and room for two eggs.
    pub fn new(id: BirdId) -> Self {
        Self {
            id,
            name: format!("bird-{id}"),
            points: 0,
            egg_limit: 2,
            egg_count: 0,
            cached_food: 0,
            tucked_cards: 0,
            wingspan: 0,
            hunting_power: 0,
            nest_type: NestType::Bowl,
            habitat: Habitat::Forest,
            cost_condition: CostCondition::All,
            food_cost: BTreeMap::new(),
            powers: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_habitat(mut self, habitat: Habitat) -> Self {
        self.habitat = habitat;
        self
    }

    pub fn with_egg_limit(mut self, limit: u32) -> Self {
        self.egg_limit = limit;
        self
    }

    pub fn with_nest(mut self, nest: NestType) -> Self {
        self.nest_type = nest;
        self
    }

    pub fn with_stats(mut self, wingspan: u32, hunting_power: u32) -> Self {
        self.wingspan = wingspan;
        self.hunting_power = hunting_power;
        self
    }

    pub fn with_cost(
        mut self,
        condition: CostCondition,
        cost: impl IntoIterator<Item = (FoodType, u32)>,
    ) -> Self {
        self.cost_condition = condition;
        self.food_cost = cost.into_iter().filter(|(_, qty)| *qty > 0).collect();
        self
    }

    pub fn with_power(mut self, trigger: Trigger, power: Arc<dyn Power>) -> Self {
        self.powers.insert(trigger, power);
        self
    }

    pub fn power(&self, trigger: Trigger) -> Option<Arc<dyn Power>> {
        self.powers.get(&trigger).cloned()
    }

    pub fn egg_room(&self) -> u32 {
        self.egg_limit.saturating_sub(self.egg_count)
    }

    pub fn lay_eggs(&mut self, qty: u32) -> Result<(), GameError> {
        if qty > self.egg_room() {
            return Err(GameError::EggLimitReached(self.id));
        }
        self.egg_count += qty;
        Ok(())
    }

    pub fn remove_eggs(&mut self, qty: u32) -> Result<(), GameError> {
        if qty > self.egg_count {
            return Err(GameError::InsufficientEggs {
                required: qty,
                available: self.egg_count,
            });
        }
        self.egg_count -= qty;
        Ok(())
    }

    pub fn cache_food(&mut self, qty: u32) {
        self.cached_food += qty;
    }

    pub fn tuck_cards(&mut self, qty: u32) {
        self.tucked_cards += qty;
    }

    /// One point for being placed, plus printed points, eggs, cached food and tucked cards.
    pub fn score(&self) -> u32 {
        1 + self.points + self.egg_count + self.cached_food + self.tucked_cards
    }
}
