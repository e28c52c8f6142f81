//! Engine configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Per-match tunables shared by every session created with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub turn_duration: Duration,
    pub starting_timeout: Duration,
    pub max_rounds: u32,
    /// Turns per player in the first round; each later round has one fewer.
    pub max_turns: u32,
    pub initial_birds: u32,
    pub initial_food_per_type: u32,
    pub tray_size: usize,
    pub feeder_size: u32,
    pub deck_size: u32,
    pub row_columns: usize,
    /// Fixes deck order and feeder refills.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_duration: Duration::from_secs(60),
            starting_timeout: Duration::from_secs(120),
            max_rounds: 4,
            max_turns: 8,
            initial_birds: 5,
            initial_food_per_type: 1,
            tray_size: 3,
            feeder_size: 5,
            deck_size: 170,
            row_columns: 5,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by any `SESSION_*` variable that is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let turn_secs = positive("SESSION_TURN_SECS", defaults.turn_duration.as_secs())?;
        let start_secs = positive(
            "SESSION_START_TIMEOUT_SECS",
            defaults.starting_timeout.as_secs(),
        )?;

        Ok(Self {
            turn_duration: Duration::from_secs(turn_secs),
            starting_timeout: Duration::from_secs(start_secs),
            max_rounds: positive("SESSION_MAX_ROUNDS", defaults.max_rounds)?,
            max_turns: positive("SESSION_MAX_TURNS", defaults.max_turns)?,
            initial_birds: parsed("SESSION_INITIAL_BIRDS", defaults.initial_birds)?,
            initial_food_per_type: defaults.initial_food_per_type,
            tray_size: positive("SESSION_TRAY_SIZE", defaults.tray_size)?,
            feeder_size: positive("SESSION_FEEDER_SIZE", defaults.feeder_size)?,
            deck_size: parsed("SESSION_DECK_SIZE", defaults.deck_size)?,
            row_columns: positive("SESSION_ROW_COLUMNS", defaults.row_columns)?,
            seed: match env::var("SESSION_SEED") {
                Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                    ConfigError::invalid("SESSION_SEED", "an unsigned integer", raw)
                })?),
                Err(_) => defaults.seed,
            },
        })
    }

    pub fn with_turn_duration(mut self, duration: Duration) -> Self {
        self.turn_duration = duration;
        self
    }

    pub fn with_starting_timeout(mut self, timeout: Duration) -> Self {
        self.starting_timeout = timeout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn parsed<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::invalid(var, "an unsigned integer", raw)),
        Err(_) => Ok(default),
    }
}

fn positive<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let value = parsed(var, default)?;
    if value == T::default() {
        return Err(ConfigError::invalid(var, "greater than zero", "0".to_string()));
    }
    Ok(value)
}
