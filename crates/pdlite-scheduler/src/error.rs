//! Scheduler error types.

use pdlite_core::KeyError;
use pdlite_state::StateError;
use thiserror::Error;

/// Errors that can occur while creating, configuring or persisting schedulers.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler config: {0}")]
    Config(String),

    #[error("invalid key argument: {0}")]
    Key(#[from] KeyError),

    #[error("failed to encode scheduler config: {0}")]
    Encode(String),

    #[error("failed to decode scheduler config: {0}")]
    Decode(String),

    #[error("unknown scheduler type: {0}")]
    UnknownType(String),

    #[error("scheduler already exists: {0}")]
    AlreadyExists(String),

    #[error("scheduler not found: {0}")]
    NotFound(String),

    #[error("state store error: {0}")]
    State(#[from] StateError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
