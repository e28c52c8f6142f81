use serde::Serialize;

use crate::domain::player::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerScore {
    pub player: PlayerId,
    pub score: u32,
    /// Food still held; breaks score ties.
    pub food: u32,
}

/// Final standings, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: PlayerId,
    pub losers: Vec<PlayerId>,
    pub ranking: Vec<PlayerScore>,
}

impl GameResult {
    /// Ranks by score, then food. Equal entries keep their seating order.
    pub fn from_scores(mut scores: Vec<PlayerScore>) -> Option<Self> {
        scores.sort_by(|a, b| b.score.cmp(&a.score).then(b.food.cmp(&a.food)));
        let winner = scores.first()?.player;
        Some(Self {
            winner,
            losers: scores.iter().skip(1).map(|s| s.player).collect(),
            ranking: scores,
        })
    }

    pub fn is_winner(&self, player: PlayerId) -> bool {
        self.winner == player
    }
}
