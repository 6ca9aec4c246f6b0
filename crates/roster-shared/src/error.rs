use thiserror::Error;

use crate::types::ResourceId;

/// Every failure the sidebar engine knows about.
///
/// None of these reach the user: callers recover locally with an empty
/// order or a no-op and log the error.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Malformed persisted order: {0}")]
    MalformedPersistedOrder(#[from] serde_json::Error),

    #[error("Cycle target not found: {0}")]
    UnresolvedCycleTarget(String),

    #[error("Missing channel config for {0}")]
    MissingChannelConfig(ResourceId),

    #[error("Duplicate identifier in group order: {0}")]
    DuplicateIdentifier(ResourceId),

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, RosterError>;
