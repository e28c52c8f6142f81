//! Face-up display of birds drawn from the deck.

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::bird::{Bird, BirdId};
use crate::domain::deck::Deck;
use crate::errors::GameError;

#[derive(Debug)]
pub struct BirdTray {
    size: usize,
    birds: Mutex<Vec<Bird>>,
}

impl BirdTray {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            birds: Mutex::new(Vec::with_capacity(size)),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Tops up empty slots from `deck`. Occupants stay where they are.
    pub fn refill(&self, deck: &Deck) -> Result<(), GameError> {
        let mut birds = self.birds.lock();
        let missing = self.size.saturating_sub(birds.len());
        if missing == 0 {
            return Ok(());
        }
        let drawn = deck.draw(missing)?;
        birds.extend(drawn);
        debug!(added = missing, "Bird tray refilled");
        Ok(())
    }

    /// Discards every occupant and refills completely. On a deck shortage the tray is unchanged.
    pub fn reset(&self, deck: &Deck) -> Result<(), GameError> {
        let mut birds = self.birds.lock();
        let drawn = deck.draw(self.size)?;
        let old = std::mem::replace(&mut *birds, drawn);
        deck.discard(old);
        Ok(())
    }

    /// Removes and returns the named bird.
    pub fn get(&self, id: BirdId) -> Result<Bird, GameError> {
        let mut birds = self.birds.lock();
        let pos = birds
            .iter()
            .position(|b| b.id == id)
            .ok_or(GameError::CardNotFound(id))?;
        Ok(birds.remove(pos))
    }

    /// Removes every named bird, or none of them.
    pub fn take_many(&self, ids: &[BirdId]) -> Result<Vec<Bird>, GameError> {
        let mut birds = self.birds.lock();
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) || !birds.iter().any(|b| b.id == *id) {
                return Err(GameError::CardNotFound(*id));
            }
        }
        let mut taken = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(pos) = birds.iter().position(|b| b.id == *id) {
                taken.push(birds.remove(pos));
            }
        }
        Ok(taken)
    }

    pub fn birds(&self) -> Vec<Bird> {
        self.birds.lock().clone()
    }

    pub fn ids(&self) -> Vec<BirdId> {
        self.birds.lock().iter().map(|b| b.id).collect()
    }

    pub fn len(&self) -> usize {
        self.birds.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
