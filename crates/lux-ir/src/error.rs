//! Error types for stylesheet parsing and show loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while parsing DSS text.
///
/// Every variant carries the offending literal. A single error aborts the
/// whole parse: there is no partially usable stylesheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected a color, got '{0}'")]
    InvalidColor(String),

    #[error("expected a ratio between 0 and 1, got '{0}'")]
    InvalidRatio(String),

    #[error("expected a duration in s or ms, got '{0}'")]
    InvalidTime(String),

    #[error("expected a timing function, got '{0}'")]
    InvalidTimingFunction(String),

    #[error("expected a direction, got '{0}'")]
    InvalidDirection(String),

    #[error("expected a positive number or 'infinite' for iteration count, got '{0}'")]
    InvalidIterationCount(String),

    #[error("expected pulse as `direction speed`, got '{0}'")]
    InvalidPulse(String),

    #[error("expected auto as `name [speed]`, got '{0}'")]
    InvalidAuto(String),

    #[error("expected rotation as `float` or `auto float`, got '{0}'")]
    InvalidRotation(String),

    #[error("invalid animation '{value}': {reason}")]
    InvalidAnimation { value: String, reason: String },

    #[error("invalid transition '{value}': {reason}")]
    InvalidTransition { value: String, reason: String },

    #[error("'{0}' selector type is not implemented")]
    UnsupportedSelector(String),

    #[error("unsupported property '{0}'")]
    UnsupportedProperty(String),

    #[error("invalid @keyframes '{name}': {reason}")]
    InvalidKeyframes { name: String, reason: String },

    #[error("syntax error: {0}")]
    Syntax(String),
}

/// Errors raised while loading show files from disk or memory.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid XML in {origin}: {message}")]
    Xml { origin: String, message: String },

    #[error("{label} failed schema validation:\n{message}")]
    Schema { label: String, message: String },

    #[error("invalid tree in {origin}: {reason}")]
    InvalidTree { origin: String, reason: String },

    #[error("address {address} of '{node}' conflicts with '{other}'")]
    DuplicateAddress {
        address: u16,
        node: String,
        other: String,
    },

    #[error("failed to parse stylesheet {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
