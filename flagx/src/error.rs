//! Error types for flag registration, parsing and configuration.

use flagx_core::{TokenError, ValidationError, ValueError};
use thiserror::Error;

/// Errors produced by a [`Parser`](crate::Parser) or a
/// [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Error)]
pub enum FlagxError {
    /// A flag occurrence could not be consumed and the error policy did not
    /// suppress it.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Required flags that never appeared on the command line.
    #[error("flag is required: {}", .0.iter().map(|n| format!("-{n}")).collect::<Vec<_>>().join(", "))]
    MissingRequired(Vec<String>),

    /// The help flag was given; usage has been rendered.
    #[error("help requested")]
    HelpRequested,

    /// A flag with this name is already registered.
    #[error("flag redefined: {0}")]
    DuplicateFlag(String),

    /// The name can never appear on a command line.
    #[error("invalid flag name: {0}")]
    InvalidName(#[from] ValidationError),

    /// A declared default does not parse as the declared type.
    #[error("invalid default {value:?} for flag -{name}: {source}")]
    InvalidDefault {
        name: String,
        value: String,
        source: ValueError,
    },

    /// File or output-sink I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlagxError {
    /// Whether this is the help request rather than a failure.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::HelpRequested)
    }

    /// Whether this error comes out of a parse pass (as opposed to
    /// registration or configuration).
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Token(_) | Self::MissingRequired(_))
    }
}

/// Convenience alias for results with [`FlagxError`].
pub type Result<T> = std::result::Result<T, FlagxError>;
