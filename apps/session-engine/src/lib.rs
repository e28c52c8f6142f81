#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod session;
pub mod ws;

// Re-exports for public API
pub use config::GameConfig;
pub use domain::{Bird, BirdId, FoodType, Habitat, PlayerId};
pub use error::{ConfigError, DispatchError};
pub use errors::{ErrorCode, ErrorKind, GameError};
pub use session::{Game, MatchId, Phase, TurnOutcome};
pub use ws::{
    ActionReply, ActionRouter, ChannelSocket, Notification, Request, SessionRegistry, Socket,
    SocketId,
};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    engine_test_support::logging::init();
}
