#![forbid(unsafe_code)]

//! Core domain model and business logic for gymlog, a personal workout log.
//!
//! This crate provides:
//! - Domain types (sets, exercises, workouts, routines)
//! - Key-value persistence and the workout store
//! - Draft validation and routine expansion
//! - Statistics, progress and history views
//! - The password gate guarding the store

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod kv;
pub mod draft;
pub mod routine;
pub mod stats;
pub mod progress;
pub mod store;
pub mod auth;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use draft::{DraftExercise, DraftSet, WorkoutDraft};
pub use stats::{ExerciseCount, Stats};
pub use progress::ProgressEntry;
pub use store::Store;
pub use auth::{Access, CredentialGate};
