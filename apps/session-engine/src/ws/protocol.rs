use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::bird::{Bird, BirdId, Habitat};
use crate::domain::food::{FoodMap, FoodType};
use crate::domain::player::PlayerId;
use crate::domain::scoring::GameResult;
use crate::errors::ErrorCode;
use crate::session::MatchId;

/// Messages the engine pushes to a client.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    StartingHand {
        birds: Vec<Bird>,
        food: FoodMap,
    },
    DiscardFood {
        amount: u32,
        food: FoodMap,
    },
    MatchCancelled {
        reason: String,
    },

    StartTurn {
        round: u32,
        turn: u32,
        duration_ms: u64,
    },
    WaitTurn {
        round: u32,
        turn: u32,
        current: PlayerId,
        duration_ms: u64,
    },
    RoundStarted {
        round: u32,
        first_player: PlayerId,
    },

    ChooseFood {
        amount: u32,
        available: FoodMap,
    },
    FoodGained {
        food: FoodMap,
    },
    FoodUpdated {
        inventory: FoodMap,
    },
    DrawCards {
        amount: u32,
        tray: Vec<Bird>,
    },
    BirdsDrawn {
        birds: Vec<Bird>,
    },
    BirdsDrawnByOther {
        player: PlayerId,
        count: usize,
    },
    LayEggs {
        amount: u32,
        /// Free egg slots per eligible bird.
        birds: BTreeMap<BirdId, u32>,
    },
    /// Egg changes per bird; negative when eggs were spent.
    BirdUpdated {
        eggs: BTreeMap<BirdId, i64>,
    },
    BoardUpdated {
        habitat: Habitat,
        bird: Bird,
    },
    PayBirdCost {
        bird_id: BirdId,
        egg_cost: u32,
        food: Vec<FoodType>,
        eggs: BTreeMap<BirdId, u32>,
    },
    BirdPlayed {
        player: PlayerId,
        bird: Bird,
    },

    GameOver {
        won: bool,
        result: GameResult,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

/// Synchronous answer to a routed request. Prompts and broadcasts travel as notifications.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionReply {
    Ok,
    Prompted,
    FoodGained { food: FoodMap },
    CardsDrawn { birds: Vec<Bird> },
    EggsLaid { eggs: BTreeMap<BirdId, u32> },
    Played { bird: Bird },
    AwaitingPayment,
    TurnEnded,
    RoundEnded,
    GameOver { result: GameResult },
}

/// Named remote call addressed to one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub match_id: MatchId,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChooseBirdsParams {
    pub birds: Vec<BirdId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscardFoodParams {
    #[serde(default)]
    pub food: FoodMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChooseFoodParams {
    pub food: FoodMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawFromTrayParams {
    pub birds: Vec<BirdId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayEggsParams {
    pub eggs: BTreeMap<BirdId, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirdParams {
    pub bird: BirdId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayBirdCostParams {
    pub bird: BirdId,
    #[serde(default)]
    pub food: Vec<FoodType>,
    #[serde(default)]
    pub eggs: BTreeMap<BirdId, u32>,
}
