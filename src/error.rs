//! Error types shared across the crate
//!
//! Invalid configuration and invalid-state control calls are not errors; they
//! are silent no-ops on the timer itself. What remains here are lookups that
//! miss, settings I/O, and completion actions that could not be delivered.

use std::{io, path::PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the timer collection
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("timer {0} not found")]
    NotFound(Uuid),
}

/// Errors reading or writing the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings path {0} has no parent directory")]
    NoParent(PathBuf),
    #[error("unknown sound: {0}")]
    UnknownSound(String),
}

/// Errors from a single completion side effect
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not available on this system")]
    Unavailable(String),
}

/// Errors surfaced by the shared application state
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to lock {0}")]
    LockPoisoned(&'static str),
}
