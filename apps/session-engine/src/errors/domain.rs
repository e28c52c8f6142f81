//! Engine-level error type returned by every fallible session operation.
//!
//! This type is transport-agnostic. The dispatch boundary wraps it in
//! [`crate::error::DispatchError`] and reports it to the originating socket
//! through [`GameError::code`].

use thiserror::Error;

use crate::domain::bird::{BirdId, Habitat};
use crate::domain::food::FoodType;
use crate::errors::ErrorCode;

/// Coarse classification used for logging and for deciding who hears about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Session could not be created at all.
    Construction,
    /// Caller may not act right now; nothing was mutated.
    TurnValidity,
    /// Not enough of something, or a bad reference; the action was rolled back.
    ResourceShortage,
    /// Misuse of the engine's own state machine.
    Logic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cannot create a session without players")]
    NoPlayers,
    #[error("invalid session config: {0}")]
    InvalidConfig(&'static str),

    #[error("player not found in this session")]
    PlayerNotFound,
    #[error("no player is ready to take a turn")]
    NoPlayerReady,
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("session is closed")]
    SessionClosed,
    #[error("action not allowed: {0}")]
    PhaseMismatch(&'static str),
    #[error("player already responded")]
    AlreadyResponded,

    #[error("not enough supply: requested {requested}, available {available}")]
    InsufficientSupply { requested: usize, available: usize },
    #[error("not enough food to pay the cost")]
    InsufficientFood,
    #[error("not enough eggs: required {required}, available {available}")]
    InsufficientEggs { required: u32, available: u32 },
    #[error("egg limit reached on bird {0}")]
    EggLimitReached(BirdId),
    #[error("food {0:?} not found")]
    FoodNotFound(FoodType),
    #[error("bird {0} not found")]
    CardNotFound(BirdId),
    #[error("{0:?} row is full")]
    RowFull(Habitat),
    #[error("habitat {0:?} not found")]
    HabitatNotFound(Habitat),
    #[error("invalid quantity: allowed {allowed}, requested {requested}")]
    InvalidQuantity { allowed: u32, requested: u32 },

    #[error("another action is already pending for this player")]
    PendingActionActive,
    #[error("no pending action to resume")]
    NoPendingAction,
    #[error("input does not match the pending action")]
    UnexpectedInput,
    #[error("no async runtime available to arm timers")]
    NoRuntime,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NoPlayers | GameError::InvalidConfig(_) => ErrorKind::Construction,
            GameError::PlayerNotFound
            | GameError::NoPlayerReady
            | GameError::NotYourTurn
            | GameError::SessionClosed
            | GameError::PhaseMismatch(_)
            | GameError::AlreadyResponded => ErrorKind::TurnValidity,
            GameError::InsufficientSupply { .. }
            | GameError::InsufficientFood
            | GameError::InsufficientEggs { .. }
            | GameError::EggLimitReached(_)
            | GameError::FoodNotFound(_)
            | GameError::CardNotFound(_)
            | GameError::RowFull(_)
            | GameError::HabitatNotFound(_)
            | GameError::InvalidQuantity { .. } => ErrorKind::ResourceShortage,
            GameError::PendingActionActive
            | GameError::NoPendingAction
            | GameError::UnexpectedInput
            | GameError::NoRuntime => ErrorKind::Logic,
        }
    }

    /// Client-facing code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::NoPlayers => ErrorCode::NoPlayers,
            GameError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            GameError::PlayerNotFound => ErrorCode::PlayerNotFound,
            GameError::NoPlayerReady => ErrorCode::NoPlayerReady,
            GameError::NotYourTurn => ErrorCode::NotYourTurn,
            GameError::SessionClosed => ErrorCode::SessionClosed,
            GameError::PhaseMismatch(_) => ErrorCode::PhaseMismatch,
            GameError::AlreadyResponded => ErrorCode::AlreadyResponded,
            GameError::InsufficientSupply { .. } => ErrorCode::InsufficientSupply,
            GameError::InsufficientFood => ErrorCode::InsufficientFood,
            GameError::InsufficientEggs { .. } => ErrorCode::InsufficientEggs,
            GameError::EggLimitReached(_) => ErrorCode::EggLimitReached,
            GameError::FoodNotFound(_) => ErrorCode::FoodNotFound,
            GameError::CardNotFound(_) => ErrorCode::CardNotFound,
            GameError::RowFull(_) => ErrorCode::RowFull,
            GameError::HabitatNotFound(_) => ErrorCode::HabitatNotFound,
            GameError::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
            GameError::PendingActionActive => ErrorCode::PendingActionActive,
            GameError::NoPendingAction => ErrorCode::NoPendingAction,
            GameError::UnexpectedInput => ErrorCode::UnexpectedInput,
            GameError::NoRuntime => ErrorCode::Internal,
        }
    }
}
