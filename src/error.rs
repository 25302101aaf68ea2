//! Error types for session, selection and configuration operations
//!
//! Expected gameplay outcomes (a dropped spawn, an overspend on the ledger) are
//! not errors; they come back as `bool`/`Option`/outcome values. These enums cover
//! rejected operations that a caller may want to surface.

use thiserror::Error;

use crate::sim::{Currency, SessionState, Upgrade};

/// Rejected orchestrator operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Operation not valid in the current session state
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },
    /// Continue requested but no offer is open for this game-over episode
    #[error("no continue offer is available")]
    ContinueUnavailable,
    /// Balance too low for the requested spend
    #[error("not enough {currency}: need {required}, have {available}")]
    InsufficientFunds {
        currency: Currency,
        required: u32,
        available: u32,
    },
    /// Player-dependent operation with no live player
    #[error("no player is spawned")]
    NoPlayer,
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Rejected terrain/player catalog operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("index {index} out of range (catalog has {len} entries)")]
    InvalidIndex { index: usize, len: usize },
    #[error("catalog is empty")]
    EmptyCatalog,
    #[error("entry {0} is locked")]
    Locked(usize),
    #[error("entry {0} is already unlocked")]
    AlreadyUnlocked(usize),
    #[error("requires unlock level {required}, current level is {current}")]
    LevelTooLow { required: u32, current: u32 },
    #[error("not enough {currency}: need {required}, have {available}")]
    InsufficientFunds {
        currency: Currency,
        required: u32,
        available: u32,
    },
    #[error("{0} upgrade is already at its cap")]
    UpgradeMaxed(Upgrade),
}

/// Configuration loading/validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
