//! Engine configuration.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Damping applied to the risk composite in the score formula.
pub const DEFAULT_LAMBDA: f64 = 0.8;

pub const LAMBDA_ENV: &str = "SAVE_LAMBDA";
pub const ARCHETYPES_PATH_ENV: &str = "SAVE_ARCHETYPES_PATH";

/// Numeric knobs of the diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// λ in `save_score = flow_magnitude - λ * V`.
    pub lambda: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
        }
    }
}

impl EngineConfig {
    pub fn with_lambda(lambda: f64) -> Self {
        Self { lambda }
    }

    /// Read `SAVE_LAMBDA`, falling back to the default when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(LAMBDA_ENV) {
            Ok(raw) => Self::from_lambda_str(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_lambda_str(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        match trimmed.parse::<f64>() {
            Ok(lambda) if lambda.is_finite() => Ok(Self { lambda }),
            _ => Err(ConfigError::InvalidNumber {
                var: LAMBDA_ENV,
                value: raw.to_string(),
            }),
        }
    }
}

/// Archetype rule file named by `SAVE_ARCHETYPES_PATH`, if any.
pub fn archetypes_path_from_env() -> Option<PathBuf> {
    std::env::var(ARCHETYPES_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_parsing() {
        assert_eq!(EngineConfig::from_lambda_str("0.5").unwrap().lambda, 0.5);
        assert_eq!(EngineConfig::from_lambda_str(" ").unwrap().lambda, DEFAULT_LAMBDA);
        assert!(EngineConfig::from_lambda_str("abc").is_err());
        assert!(EngineConfig::from_lambda_str("inf").is_err());
    }
}
