//! Shareable build codes describing which towers stood where on a map.
//!
//! A code reads `siege:v1:<map seed>:<payload>`, where the payload is the
//! unpadded base64 form of a JSON tower list.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_siege_core::{CellCoord, TowerKind, TowerSnapshot};

const CODE_DOMAIN: &str = "siege";
const CODE_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Towers built on the map generated from `map_seed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BuildCode {
    pub(crate) map_seed: u64,
    pub(crate) towers: Vec<PlannedTower>,
}

/// One structure of a build code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PlannedTower {
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
    pub(crate) level: u8,
}

impl BuildCode {
    /// Captures the structures currently standing on a map.
    pub(crate) fn capture(map_seed: u64, towers: &[TowerSnapshot]) -> Self {
        Self {
            map_seed,
            towers: towers
                .iter()
                .map(|tower| PlannedTower {
                    kind: tower.kind,
                    cell: tower.cell,
                    level: tower.level,
                })
                .collect(),
        }
    }

    /// Encodes the build into a single line.
    pub(crate) fn encode(&self) -> Result<String, BuildCodeError> {
        let json = serde_json::to_vec(&self.towers).map_err(BuildCodeError::Serialize)?;
        let payload = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{CODE_DOMAIN}{FIELD_DELIMITER}{CODE_VERSION}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{payload}",
            self.map_seed
        ))
    }

    /// Parses a code produced by [`BuildCode::encode`].
    pub(crate) fn decode(value: &str) -> Result<Self, BuildCodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BuildCodeError::Empty);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(BuildCodeError::MissingField("prefix"))?;
        let version = parts.next().ok_or(BuildCodeError::MissingField("version"))?;
        let seed = parts.next().ok_or(BuildCodeError::MissingField("map seed"))?;
        let payload = parts.next().ok_or(BuildCodeError::MissingField("payload"))?;

        if domain != CODE_DOMAIN {
            return Err(BuildCodeError::InvalidPrefix(domain.to_owned()));
        }
        if version != CODE_VERSION {
            return Err(BuildCodeError::UnsupportedVersion(version.to_owned()));
        }
        let map_seed = seed
            .parse::<u64>()
            .map_err(|_| BuildCodeError::InvalidSeed(seed.to_owned()))?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(BuildCodeError::InvalidEncoding)?;
        let towers = serde_json::from_slice(&bytes).map_err(BuildCodeError::InvalidPayload)?;

        Ok(Self { map_seed, towers })
    }
}

/// Reasons a build code cannot be produced or read.
#[derive(Debug, Error)]
pub(crate) enum BuildCodeError {
    #[error("build code was empty")]
    Empty,
    #[error("build code is missing the {0}")]
    MissingField(&'static str),
    #[error("build code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    #[error("build code version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("could not parse map seed '{0}'")]
    InvalidSeed(String),
    #[error("could not decode build payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    #[error("could not parse build payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("could not serialise build payload: {0}")]
    Serialize(#[source] serde_json::Error),
}
