//! Error handling for the session engine.

pub mod domain;
pub mod error_code;

pub use domain::{ErrorKind, GameError};
pub use error_code::ErrorCode;
