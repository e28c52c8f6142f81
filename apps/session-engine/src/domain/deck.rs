//! Hidden draw pile and its discard pile.

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::bird::{Bird, BirdId};
use crate::errors::GameError;

/// Draws come off the top (the end of the vector).
#[derive(Debug, Default)]
pub struct Deck {
    cards: Mutex<Vec<Bird>>,
    discarded: Mutex<Vec<Bird>>,
}

impl Deck {
    /// `n` blank birds with ids `0..n`; the highest id is on top.
    pub fn numbered(n: u32) -> Self {
        Self::from_cards((0..n).map(Bird::new).collect())
    }

    /// Cards in the given order, last one on top.
    pub fn from_cards(cards: Vec<Bird>) -> Self {
        Self {
            cards: Mutex::new(cards),
            discarded: Mutex::new(Vec::new()),
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(mut cards: Vec<Bird>, rng: &mut R) -> Self {
        cards.shuffle(rng);
        Self::from_cards(cards)
    }

    pub fn len(&self) -> usize {
        self.cards.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes exactly `qty` cards from the top, or nothing at all.
    pub fn draw(&self, qty: usize) -> Result<Vec<Bird>, GameError> {
        let mut cards = self.cards.lock();
        if cards.len() < qty {
            return Err(GameError::InsufficientSupply {
                requested: qty,
                available: cards.len(),
            });
        }
        let split = cards.len() - qty;
        let mut drawn = cards.split_off(split);
        drawn.reverse();
        Ok(drawn)
    }

    /// Returns cards to the top so the first one is drawn first again.
    pub fn put_back(&self, mut returned: Vec<Bird>) {
        returned.reverse();
        self.cards.lock().extend(returned);
    }

    pub fn discard(&self, cards: impl IntoIterator<Item = Bird>) {
        self.discarded.lock().extend(cards);
    }

    pub fn discarded_len(&self) -> usize {
        self.discarded.lock().len()
    }

    pub fn contains(&self, id: BirdId) -> bool {
        self.cards.lock().iter().any(|b| b.id == id)
    }
}
