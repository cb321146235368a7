//! Error types surfaced to callers.
//!
//! Per-answer problems never show up here: unparseable responses are dropped
//! during normalization. Only caller and configuration errors are reported.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from turning a request document into a diagnosis.
#[derive(Debug, Error)]
pub enum DiagnoseError {
    /// The request carried no `responses` map at all.
    #[error("request is missing the `responses` map")]
    MissingResponses,

    /// The request document is not shaped like a diagnosis request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for DiagnoseError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Errors from loading or installing archetype reference data.
#[derive(Debug, Error)]
pub enum ArchetypeError {
    #[error("failed to read archetype file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse archetype rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid archetype rules: {0}")]
    Invalid(String),

    #[error("archetype registry already initialized")]
    AlreadyInitialized,
}

impl ArchetypeError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Short code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "archetype_io",
            Self::Parse(_) => "archetype_parse",
            Self::Invalid(_) => "archetype_invalid",
            Self::AlreadyInitialized => "archetype_already_initialized",
        }
    }
}

/// Errors from reading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a finite number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}
