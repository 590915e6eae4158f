//! Simulator configuration
//!
//! Values come from the environment (a `.env` file is honoured) and fall back
//! to the protocol defaults in [`crate::constants`]. Anything unparsable is a
//! startup error.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use crate::consensus::DifficultyRule;
use crate::constants::{BASE_DIFFICULTY, DIFFICULTY_STEP, MAX_TXS_PER_BLOCK, WIN_THRESHOLD};
use crate::crypto::{Blake3Oracle, Sha256Oracle, SharedOracle};

pub const ENV_DIGEST: &str = "SIM_DIGEST";
pub const ENV_MAX_TXS_PER_BLOCK: &str = "SIM_MAX_TXS_PER_BLOCK";
pub const ENV_BASE_DIFFICULTY: &str = "SIM_BASE_DIFFICULTY";
pub const ENV_DIFFICULTY_STEP: &str = "SIM_DIFFICULTY_STEP";
pub const ENV_WIN_THRESHOLD: &str = "SIM_WIN_THRESHOLD";
pub const ENV_USERS: &str = "SIM_USERS";
pub const ENV_TRANSACTIONS: &str = "SIM_TRANSACTIONS";
pub const ENV_SIMULATED_BLOCKS: &str = "SIM_SIMULATED_BLOCKS";
pub const ENV_EXPORT_DIR: &str = "SIM_EXPORT_DIR";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown digest algorithm {0:?} (expected blake3 or sha256)")]
    UnknownDigest(String),
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Digest algorithm behind the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl FromStr for DigestAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake3" => Ok(DigestAlgorithm::Blake3),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(ConfigError::UnknownDigest(s.to_string())),
        }
    }
}

impl DigestAlgorithm {
    /// Build the oracle. Done once at startup.
    pub fn oracle(self) -> SharedOracle {
        match self {
            DigestAlgorithm::Blake3 => Arc::new(Blake3Oracle),
            DigestAlgorithm::Sha256 => Arc::new(Sha256Oracle),
        }
    }
}

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub digest: DigestAlgorithm,
    pub max_transactions_per_block: usize,
    pub base_difficulty: u32,
    pub difficulty_step: usize,
    pub win_threshold: usize,
    pub users: usize,
    pub transactions: usize,
    pub simulated_blocks: usize,
    pub export_dir: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::default(),
            max_transactions_per_block: MAX_TXS_PER_BLOCK,
            base_difficulty: BASE_DIFFICULTY,
            difficulty_step: DIFFICULTY_STEP,
            win_threshold: WIN_THRESHOLD,
            users: 1_000,
            transactions: 10_000,
            simulated_blocks: 100,
            export_dir: PathBuf::from("export"),
        }
    }
}

impl SimConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DIGEST) {
            config.digest = value.parse()?;
        }
        override_number(&lookup, ENV_MAX_TXS_PER_BLOCK, &mut config.max_transactions_per_block)?;
        override_number(&lookup, ENV_BASE_DIFFICULTY, &mut config.base_difficulty)?;
        override_number(&lookup, ENV_DIFFICULTY_STEP, &mut config.difficulty_step)?;
        override_number(&lookup, ENV_WIN_THRESHOLD, &mut config.win_threshold)?;
        override_number(&lookup, ENV_USERS, &mut config.users)?;
        override_number(&lookup, ENV_TRANSACTIONS, &mut config.transactions)?;
        override_number(&lookup, ENV_SIMULATED_BLOCKS, &mut config.simulated_blocks)?;
        if let Some(value) = lookup(ENV_EXPORT_DIR) {
            config.export_dir = PathBuf::from(value);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_transactions_per_block == 0 {
            return Err(ConfigError::Zero(ENV_MAX_TXS_PER_BLOCK));
        }
        if self.difficulty_step == 0 {
            return Err(ConfigError::Zero(ENV_DIFFICULTY_STEP));
        }
        if self.win_threshold == 0 {
            return Err(ConfigError::Zero(ENV_WIN_THRESHOLD));
        }
        Ok(())
    }

    /// Difficulty schedule
    pub fn rule(&self) -> DifficultyRule {
        DifficultyRule {
            base: self.base_difficulty,
            step: self.difficulty_step,
        }
    }

    /// Digest oracle
    pub fn oracle(&self) -> SharedOracle {
        self.digest.oracle()
    }
}

fn override_number<F, T>(lookup: &F, key: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(key) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value })?;
    }
    Ok(())
}
