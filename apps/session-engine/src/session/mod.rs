//! Per-match session engine: roster, turn ring, rounds and timers.

mod actions;
mod game;
mod timer;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::scoring::GameResult;

pub use game::Game;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Constructed, `start` not called yet.
    Forming,
    /// Players keep birds and discard food.
    AwaitingStartingChoices,
    TurnActive,
    GameOver,
    Cancelled,
}

impl Phase {
    pub fn is_closed(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Cancelled)
    }
}

/// Expected result of ending a turn. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Continued,
    RoundEnded,
    GameOver(GameResult),
}
