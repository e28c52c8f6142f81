//! Domain layer: cards, shared pools, boards and players.

pub mod bird;
pub mod board;
pub mod deck;
pub mod food;
pub mod pending;
pub mod player;
pub mod power;
pub mod ring_buffer;
pub mod rules;
pub mod scoring;
pub mod tray;

// Re-exports for ergonomics
pub use bird::{Bird, BirdId, CostCondition, Habitat, NestType, Trigger};
pub use board::Board;
pub use deck::Deck;
pub use food::{Birdfeeder, FoodMap, FoodType};
pub use pending::{ActionInput, ActionOutcome, PendingAction, Resolution};
pub use player::{PlayOutcome, Player, PlayerId};
pub use power::{Power, Supply};
pub use ring_buffer::RingBuffer;
pub use scoring::{GameResult, PlayerScore};
pub use tray::BirdTray;
