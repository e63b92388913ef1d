//! Error types for the gym_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gym_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted data exists but cannot be parsed
    #[error("Stored data under '{key}' is corrupted: {source}")]
    DataCorruption {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Workout draft has no exercises at all
    #[error("Please add at least one exercise")]
    EmptyWorkout,

    /// An exercise in the workout draft has a blank name
    #[error("Please fill in all exercise names (exercise #{position} is blank)")]
    InvalidExerciseName { position: usize },

    /// Every set in the workout draft was invalid
    #[error("Please add at least one set with a positive rep count")]
    NoValidSets,

    /// Routine draft has a blank name
    #[error("Please enter a routine name")]
    MissingRoutineName,

    /// Routine draft has no exercises
    #[error("Please add at least one exercise to the routine")]
    EmptyRoutine,

    /// Password does not meet the minimum length
    #[error("Password must be at least {min_len} characters")]
    WeakPassword { min_len: usize },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for user-input errors that leave stored data untouched and can be
    /// fixed and retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyWorkout
                | Error::InvalidExerciseName { .. }
                | Error::NoValidSets
                | Error::MissingRoutineName
                | Error::EmptyRoutine
                | Error::WeakPassword { .. }
        )
    }
}
