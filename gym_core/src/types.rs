//! Core domain types for the workout tracker.
//!
//! This module defines the persisted data model:
//! - Sets, exercises and workouts as they were performed
//! - Routine templates (legacy name-only entries and structured entries)
//! - The aggregate root that is stored as a single JSON document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Logged Workout Types
// ============================================================================

/// One performed set: a rep count at a given weight
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSet {
    pub reps: u32,
    /// Zero means bodyweight
    #[serde(default)]
    pub weight: f64,
}

impl WorkoutSet {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }

    pub fn is_bodyweight(&self) -> bool {
        self.weight == 0.0
    }
}

impl fmt::Display for WorkoutSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bodyweight() {
            write!(f, "{} reps @ bodyweight", self.reps)
        } else {
            write!(f, "{} reps @ {}", self.reps, self.weight)
        }
    }
}

/// An exercise as logged within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub sets: Vec<WorkoutSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Exercise {
    /// Whether this exercise was logged under `name`, ignoring case and
    /// surrounding whitespace
    pub fn matches(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}

/// Comparison key for exercise names
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A saved workout session
///
/// Workouts are created once from a validated draft and never mutated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Comma-separated exercise names, in logged order
    pub fn summary(&self) -> String {
        self.exercises
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// Routine Types
// ============================================================================

/// Sets prescribed by a structured routine entry when none are given
pub const DEFAULT_ROUTINE_SETS: u32 = 3;

/// Structured routine entry with optional pre-filled values
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoutineTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl RoutineTemplate {
    /// Number of sets to pre-fill; absent or zero falls back to the default
    pub fn set_count(&self) -> u32 {
        match self.sets {
            Some(n) if n > 0 => n,
            _ => DEFAULT_ROUTINE_SETS,
        }
    }
}

/// One line of a routine
///
/// Older data stores routine entries as bare exercise names; newer data
/// stores objects. Both shapes must keep loading.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RoutineEntry {
    Legacy(String),
    Structured(RoutineTemplate),
}

impl RoutineEntry {
    pub fn name(&self) -> &str {
        match self {
            RoutineEntry::Legacy(name) => name,
            RoutineEntry::Structured(template) => &template.name,
        }
    }
}

impl fmt::Display for RoutineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutineEntry::Legacy(name) => write!(f, "{}", name),
            RoutineEntry::Structured(t) => {
                write!(f, "{}: {} sets", t.name, t.set_count())?;
                if let Some(reps) = t.reps {
                    write!(f, " x {} reps", reps)?;
                }
                if let Some(weight) = t.weight {
                    write!(f, " @ {}", weight)?;
                }
                Ok(())
            }
        }
    }
}

/// An ordered, reusable list of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Routine {
    pub entries: Vec<RoutineEntry>,
}

impl Routine {
    pub fn new(entries: Vec<RoutineEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Everything the tracker persists, stored as one document
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Aggregate {
    /// Append-only, in creation order (not necessarily date order)
    #[serde(default)]
    pub workouts: Vec<Workout>,
    #[serde(default)]
    pub routines: BTreeMap<String, Routine>,
}

/// Workout dates are written as RFC 3339. Older data may carry timestamps
/// without an offset; those are read as UTC.
mod iso_date {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(date) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(date.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| de::Error::custom(format!("invalid workout date '{}': {}", raw, e)))
    }
}
