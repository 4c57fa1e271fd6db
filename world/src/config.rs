//! Balance knobs read once when a world is created.

use std::time::Duration;

use serde::Deserialize;

/// Errors raised while loading a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside the range the simulation accepts.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Tunable constants of a run.
///
/// Every field has a default, so a TOML document only needs to name the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Gold at the start of a run.
    pub starting_gold: u32,
    /// Lives at the start of a run.
    pub starting_lives: u32,
    /// Gold ceiling while no map change is pending.
    pub gold_cap: u32,
    /// Gold ceiling while a map change is pending.
    pub pending_map_gold_cap: u32,
    /// Maximum number of non-building structures.
    pub max_towers: usize,
    /// Maximum number of buildings.
    pub max_buildings: usize,
    /// Probability that a surprise-mode wave draws a roulette event.
    pub roulette_chance: f64,
    /// Number of highlight steps the wheel spins through.
    pub roulette_spins: u32,
    /// Milliseconds between two highlight steps.
    pub roulette_spin_interval_ms: u32,
    /// Milliseconds the chosen event stays revealed before spawning begins.
    pub roulette_reveal_ms: u32,
    /// Upper bound on the simulated duration of a single tick.
    pub max_tick_ms: u64,
    /// Map seed of the first run.
    pub map_seed: u64,
    /// Seed of the gameplay random stream.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_gold: 250,
            starting_lives: 20,
            gold_cap: 8000,
            pending_map_gold_cap: 15_000,
            max_towers: 25,
            max_buildings: 8,
            roulette_chance: 0.4,
            roulette_spins: 20,
            roulette_spin_interval_ms: 100,
            roulette_reveal_ms: 2500,
            max_tick_ms: 50,
            map_seed: 42,
            rng_seed: 0x7a3c_51e9,
        }
    }
}

impl Config {
    /// Parses a TOML document and validates the result.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the ranges the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.roulette_chance) {
            return Err(ConfigError::Invalid {
                field: "roulette_chance",
                reason: "must lie between 0 and 1",
            });
        }
        if self.max_tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tick_ms",
                reason: "must be positive",
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::Invalid {
                field: "starting_lives",
                reason: "must be positive",
            });
        }
        if self.pending_map_gold_cap < self.gold_cap {
            return Err(ConfigError::Invalid {
                field: "pending_map_gold_cap",
                reason: "must not be below gold_cap",
            });
        }
        Ok(())
    }

    /// Longest duration a single tick simulates.
    #[must_use]
    pub fn max_tick(&self) -> Duration {
        Duration::from_millis(self.max_tick_ms)
    }
}
