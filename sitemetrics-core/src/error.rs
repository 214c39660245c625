//! Error types for stats operations

use thiserror::Error;

/// Store backend errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Codec failure: {reason}")]
    Codec { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Backend failure: {reason}")]
    Backend { reason: String },
}

/// Master error type for the stats subsystem.
///
/// Remote failures are surfaced verbatim: `Network` when the call could not
/// complete, `Api` when the endpoint responded with a structured error. The
/// cache is guaranteed untouched in both cases, so callers can fall back to
/// the last cached value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("Network failure: {message}")]
    Network { message: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl StatsError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// True for failures of the remote collaborator (as opposed to local
    /// store faults).
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Api { .. })
    }
}

/// Result type alias for stats operations.
pub type StatsResult<T> = Result<T, StatsError>;
