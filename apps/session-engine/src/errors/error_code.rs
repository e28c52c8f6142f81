//! Error codes reported to clients.
//!
//! Add new codes here; never pass ad-hoc strings as error codes. Every code
//! is SCREAMING_SNAKE_CASE and maps 1:1 to the string placed in the
//! outbound `error` notification.

use core::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Construction
    NoPlayers,
    InvalidConfig,

    // Turn validity
    PlayerNotFound,
    NoPlayerReady,
    NotYourTurn,
    SessionClosed,
    PhaseMismatch,
    AlreadyResponded,

    // Resources
    InsufficientSupply,
    InsufficientFood,
    InsufficientEggs,
    EggLimitReached,
    FoodNotFound,
    CardNotFound,
    RowFull,
    HabitatNotFound,
    InvalidQuantity,

    // Pending actions
    PendingActionActive,
    NoPendingAction,
    UnexpectedInput,

    // Dispatch boundary
    UnknownAction,
    SessionNotFound,
    BadParams,

    /// Engine failure the client cannot fix.
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoPlayers => "NO_PLAYERS",
            Self::InvalidConfig => "INVALID_CONFIG",

            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NoPlayerReady => "NO_PLAYER_READY",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::SessionClosed => "SESSION_CLOSED",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::AlreadyResponded => "ALREADY_RESPONDED",

            Self::InsufficientSupply => "INSUFFICIENT_SUPPLY",
            Self::InsufficientFood => "INSUFFICIENT_FOOD",
            Self::InsufficientEggs => "INSUFFICIENT_EGGS",
            Self::EggLimitReached => "EGG_LIMIT_REACHED",
            Self::FoodNotFound => "FOOD_NOT_FOUND",
            Self::CardNotFound => "CARD_NOT_FOUND",
            Self::RowFull => "ROW_FULL",
            Self::HabitatNotFound => "HABITAT_NOT_FOUND",
            Self::InvalidQuantity => "INVALID_QUANTITY",

            Self::PendingActionActive => "PENDING_ACTION_ACTIVE",
            Self::NoPendingAction => "NO_PENDING_ACTION",
            Self::UnexpectedInput => "UNEXPECTED_INPUT",

            Self::UnknownAction => "UNKNOWN_ACTION",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::BadParams => "BAD_PARAMS",

            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
