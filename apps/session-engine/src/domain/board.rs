//! Per-player play area: one row of placed birds per habitat.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::bird::{Bird, BirdId, Habitat, Trigger};
use crate::domain::power::Power;
use crate::domain::ring_buffer::RingBuffer;
use crate::errors::GameError;

/// Birds in placement order, bounded by the column count.
#[derive(Debug)]
pub struct Row {
    birds: RingBuffer<Bird>,
}

impl Row {
    pub fn new(columns: usize) -> Self {
        Self {
            birds: RingBuffer::new(columns),
        }
    }

    /// A zero-column row is always full.
    pub fn is_full(&self) -> bool {
        self.birds.len() == self.birds.capacity()
    }

    /// Birds placed so far. Only grows.
    pub fn exposed(&self) -> usize {
        self.birds.len()
    }

    pub fn birds(&self) -> Vec<Bird> {
        self.birds.values()
    }
}

#[derive(Debug)]
pub struct Board {
    rows: HashMap<Habitat, Row>,
}

impl Board {
    pub fn new(columns: usize) -> Self {
        Self::with_habitats(Habitat::ALL, columns)
    }

    pub fn with_habitats(habitats: impl IntoIterator<Item = Habitat>, columns: usize) -> Self {
        Self {
            rows: habitats
                .into_iter()
                .map(|habitat| (habitat, Row::new(columns)))
                .collect(),
        }
    }

    fn row(&self, habitat: Habitat) -> Result<&Row, GameError> {
        self.rows
            .get(&habitat)
            .ok_or(GameError::HabitatNotFound(habitat))
    }

    /// Places the bird at the end of its habitat's row.
    pub fn play_bird(&self, bird: Bird) -> Result<(), GameError> {
        let row = self.row(bird.habitat)?;
        if row.is_full() {
            return Err(GameError::RowFull(bird.habitat));
        }
        row.birds.push(bird);
        Ok(())
    }

    pub fn is_row_full(&self, habitat: Habitat) -> Result<bool, GameError> {
        Ok(self.row(habitat)?.is_full())
    }

    pub fn exposed(&self, habitat: Habitat) -> Result<usize, GameError> {
        Ok(self.row(habitat)?.exposed())
    }

    pub fn bird(&self, id: BirdId) -> Option<Bird> {
        self.rows
            .values()
            .find_map(|row| row.birds().into_iter().find(|b| b.id == id))
    }

    /// Runs `f` on the placed bird with `id`.
    pub fn with_bird_mut<R>(
        &self,
        id: BirdId,
        f: impl FnOnce(&mut Bird) -> R,
    ) -> Result<R, GameError> {
        let mut f = Some(f);
        for row in self.rows.values() {
            let found = row.birds.find_map_mut(|bird| {
                if bird.id != id {
                    return None;
                }
                f.take().map(|f| f(bird))
            });
            if let Some(result) = found {
                return Ok(result);
            }
        }
        Err(GameError::CardNotFound(id))
    }

    /// Every placed bird, habitat by habitat in placement order.
    pub fn birds(&self) -> Vec<Bird> {
        Habitat::ALL
            .into_iter()
            .filter_map(|habitat| self.rows.get(&habitat))
            .flat_map(Row::birds)
            .collect()
    }

    pub fn rows(&self) -> BTreeMap<Habitat, Vec<Bird>> {
        self.rows
            .iter()
            .map(|(habitat, row)| (*habitat, row.birds()))
            .collect()
    }

    pub fn total_eggs(&self) -> u32 {
        let mut total = 0;
        for row in self.rows.values() {
            row.birds.for_each(|b| total += b.egg_count);
        }
        total
    }

    /// Egg count per placed bird that has at least one egg.
    pub fn birds_with_eggs(&self) -> BTreeMap<BirdId, u32> {
        let mut out = BTreeMap::new();
        for row in self.rows.values() {
            row.birds.for_each(|b| {
                if b.egg_count > 0 {
                    out.insert(b.id, b.egg_count);
                }
            });
        }
        out
    }

    /// Free egg slots per placed bird that still has room.
    pub fn birds_with_room(&self) -> BTreeMap<BirdId, u32> {
        let mut out = BTreeMap::new();
        for row in self.rows.values() {
            row.birds.for_each(|b| {
                if b.egg_room() > 0 {
                    out.insert(b.id, b.egg_room());
                }
            });
        }
        out
    }

    /// Activated powers of a row, excluding the newest bird, newest first.
    pub fn activation_order(
        &self,
        habitat: Habitat,
    ) -> Result<Vec<(BirdId, Arc<dyn Power>)>, GameError> {
        let mut birds = self.row(habitat)?.birds();
        birds.pop();
        Ok(birds
            .iter()
            .rev()
            .filter_map(|b| b.power(Trigger::WhenActivated).map(|p| (b.id, p)))
            .collect())
    }
}
