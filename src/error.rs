//! Error types for skillmatch.

use thiserror::Error;

/// Which external store a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Dictionary,
    SkillVectors,
    Popularity,
    WordVectors,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Dictionary => "dictionary",
            Self::SkillVectors => "skill vector",
            Self::Popularity => "popularity",
            Self::WordVectors => "word vector",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SmError {
    #[error("{store} store unavailable: {message}")]
    CollaboratorUnavailable { store: StoreKind, message: String },

    #[error("ranking cancelled")]
    Cancelled,

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SmError {
    /// Wrap a store-level failure.
    pub fn store(store: StoreKind, err: impl std::fmt::Display) -> Self {
        Self::CollaboratorUnavailable {
            store,
            message: err.to_string(),
        }
    }

    /// Short machine-readable code used in robot output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CollaboratorUnavailable { .. } => "collaborator_unavailable",
            Self::Cancelled => "cancelled",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::Config(_) | Self::MissingConfig(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for SmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SmError>;
