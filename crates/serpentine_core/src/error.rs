//! Error types for the simulation engine.
//!
//! Only session setup can fail. Once a session runs, every failure inside a
//! tick is absorbed by a fallback (rule-based policy, dropped sample, default
//! numeric value) and never crosses the tick boundary.

use thiserror::Error;

/// Configuration rejected at session start.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value is outside its allowed range.
    #[error("invalid configuration value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    #[must_use]
    pub fn invalid<S: Into<String>>(field: &'static str, reason: S) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure of a learned policy to produce an action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("feature {index} is not finite")]
    NonFiniteFeature { index: usize },

    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("model could not be decoded: {0}")]
    Decode(String),

    #[error("classifier declined to predict: {0}")]
    Unavailable(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
