//! TOML configuration for accrual rules and policy overrides.
//!
//! # Invariants
//! - Every field has a default; an empty document is a valid config.
//! - `rollback_step` must be finite and positive.

use crate::accrual::AccrualRules;
use crate::model::event::PointValue;
use crate::policy::PointPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration load/validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidRule(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidRule(message) => write!(f, "invalid accrual rule: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidRule(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Policy section: overrides layered over the standard table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Start from an empty table instead of the standard one.
    pub replace_standard: bool,
    /// Label -> number or `"unweighted"`.
    pub points: BTreeMap<String, PointValue>,
}

/// Top-level ledger configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub accrual: AccrualRules,
    pub policy: PolicyConfig,
}

impl LedgerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.accrual.has_valid_step() {
            return Err(ConfigError::InvalidRule(format!(
                "rollback_step must be a positive number, got {}",
                self.accrual.rollback_step
            )));
        }
        Ok(())
    }

    /// Builds the effective policy table.
    pub fn point_policy(&self) -> PointPolicy {
        let mut policy = if self.policy.replace_standard {
            PointPolicy::new()
        } else {
            PointPolicy::standard()
        };
        for (label, value) in &self.policy.points {
            policy.insert(label.as_str(), *value);
        }
        policy
    }
}
