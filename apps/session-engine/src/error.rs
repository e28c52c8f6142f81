use thiserror::Error;

use crate::errors::{ErrorCode, GameError};

/// Errors raised at the dispatch boundary, before or around a session call.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown action: {method}")]
    UnknownAction { method: String },
    #[error("Session not found: {detail}")]
    SessionNotFound { detail: String },
    #[error("Bad params: {detail}")]
    BadParams { detail: String },
    #[error(transparent)]
    Game(#[from] GameError),
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::UnknownAction { .. } => ErrorCode::UnknownAction,
            DispatchError::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            DispatchError::BadParams { .. } => ErrorCode::BadParams,
            DispatchError::Game(err) => err.code(),
        }
    }

    pub fn unknown_action(method: impl Into<String>) -> Self {
        Self::UnknownAction {
            method: method.into(),
        }
    }

    pub fn session_not_found(detail: String) -> Self {
        Self::SessionNotFound { detail }
    }

    pub fn bad_params(detail: String) -> Self {
        Self::BadParams { detail }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(e: serde_json::Error) -> Self {
        DispatchError::bad_params(format!("params error: {e}"))
    }
}

/// Invalid engine configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration error: {var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ConfigError {
    pub fn invalid(var: &'static str, expected: &'static str, value: String) -> Self {
        Self::Invalid {
            var,
            expected,
            value,
        }
    }
}
