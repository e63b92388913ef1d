//! The workout store: owner of the persisted aggregate.
//!
//! The whole aggregate is one JSON document under [`DATA_KEY`]. Every
//! mutation persists the full document before the in-memory copy is
//! replaced, so a failed write leaves both sides at the previous state.

use crate::auth::Access;
use crate::draft::WorkoutDraft;
use crate::kv::KeyValueStore;
use crate::progress::{self, ProgressEntry};
use crate::stats::Stats;
use crate::{routine, Aggregate, Error, Result, Routine, RoutineEntry, Workout};
use chrono::{DateTime, Utc};

pub const DATA_KEY: &str = "gymTrackerData";

/// Read the aggregate stored in `kv`.
///
/// Missing data yields an empty aggregate. Data that exists but cannot be
/// parsed is reported as [`Error::DataCorruption`] and left untouched.
pub fn load_aggregate<K: KeyValueStore>(kv: &K) -> Result<Aggregate> {
    let raw = match kv.get(DATA_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::info!("No stored workout data, starting empty");
            return Ok(Aggregate::default());
        }
        // Bytes that are not UTF-8 are as unreadable as malformed JSON
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::error!("Stored workout data is not valid text: {}", e);
            return Err(Error::DataCorruption {
                key: DATA_KEY.to_string(),
                source: serde_json::Error::io(e),
            });
        }
        Err(e) => return Err(e),
    };

    match serde_json::from_str::<Aggregate>(&raw) {
        Ok(aggregate) => {
            tracing::debug!(
                "Loaded {} workouts and {} routines",
                aggregate.workouts.len(),
                aggregate.routines.len()
            );
            Ok(aggregate)
        }
        Err(source) => {
            tracing::error!("Stored workout data is corrupted: {}", source);
            Err(Error::DataCorruption {
                key: DATA_KEY.to_string(),
                source,
            })
        }
    }
}

/// Serialize and write the full aggregate, replacing what was stored
pub fn save_aggregate<K: KeyValueStore>(kv: &K, aggregate: &Aggregate) -> Result<()> {
    let contents = serde_json::to_string(aggregate)?;
    kv.set(DATA_KEY, &contents)?;
    tracing::debug!("Saved {} workouts", aggregate.workouts.len());
    Ok(())
}

/// Owns the aggregate and its storage backend
pub struct Store<K: KeyValueStore> {
    kv: K,
    data: Aggregate,
}

impl<K: KeyValueStore> Store<K> {
    /// Load the stored aggregate; requires access granted by the gate
    pub fn open(kv: K, _access: &Access) -> Result<Self> {
        let data = load_aggregate(&kv)?;
        Ok(Self { kv, data })
    }

    /// Release the store and hand back its backend
    pub fn close(self) -> K {
        self.kv
    }

    /// Current in-memory snapshot
    pub fn data(&self) -> &Aggregate {
        &self.data
    }

    /// Read the aggregate as currently persisted
    pub fn load(&self) -> Result<Aggregate> {
        load_aggregate(&self.kv)
    }

    /// Discard the in-memory snapshot and re-read storage
    pub fn reload(&mut self) -> Result<()> {
        self.data = self.load()?;
        Ok(())
    }

    /// Persist `aggregate` as the new full state
    pub fn save(&mut self, aggregate: Aggregate) -> Result<()> {
        save_aggregate(&self.kv, &aggregate)?;
        self.data = aggregate;
        Ok(())
    }

    /// Apply `f` to a copy of the aggregate, persist it, then adopt it
    fn update<T>(&mut self, f: impl FnOnce(&mut Aggregate) -> T) -> Result<T> {
        let mut next = self.data.clone();
        let out = f(&mut next);
        self.save(next)?;
        Ok(out)
    }

    pub fn append_workout(&mut self, workout: Workout) -> Result<()> {
        self.update(|data| data.workouts.push(workout))
    }

    /// Validate `draft` and append the resulting workout dated `now`.
    ///
    /// On a validation error nothing is written and the draft is untouched.
    pub fn save_workout(&mut self, draft: &WorkoutDraft, now: DateTime<Utc>) -> Result<&Workout> {
        let workout = draft.finalize(now)?;
        tracing::info!(
            "Saving workout with {} exercises, {} sets",
            workout.exercises.len(),
            workout.set_count()
        );
        self.append_workout(workout)?;
        self.data
            .workouts
            .last()
            .ok_or_else(|| Error::Other("workout missing after save".into()))
    }

    /// Insert or replace the routine stored under `name`
    pub fn upsert_routine(&mut self, name: &str, routine: Routine) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::MissingRoutineName);
        }
        if routine.is_empty() {
            return Err(Error::EmptyRoutine);
        }

        let replaced = self.update(|data| data.routines.insert(name.to_string(), routine))?;
        if replaced.is_some() {
            tracing::info!("Replaced routine '{}'", name);
        } else {
            tracing::info!("Created routine '{}'", name);
        }
        Ok(())
    }

    /// Normalize a routine draft and store it; returns the stored name
    pub fn save_routine(&mut self, name: &str, entries: Vec<RoutineEntry>) -> Result<String> {
        let (name, routine) = routine::normalize(name, entries)?;
        self.upsert_routine(&name, routine)?;
        Ok(name)
    }

    /// Remove the routine under `name`, reporting whether it existed
    pub fn delete_routine(&mut self, name: &str) -> Result<bool> {
        let removed = self.update(|data| data.routines.remove(name).is_some())?;
        tracing::info!("Delete routine '{}': existed={}", name, removed);
        Ok(removed)
    }

    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.data.routines.get(name)
    }

    /// Routines in name order
    pub fn routines(&self) -> impl Iterator<Item = (&String, &Routine)> {
        self.data.routines.iter()
    }

    /// A fresh draft pre-filled from the named routine
    pub fn draft_from_routine(&self, name: &str) -> Option<WorkoutDraft> {
        self.routine(name).map(routine::expand)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_aggregate(&self.data)
    }

    pub fn progress(&self, exercise_name: &str) -> Vec<ProgressEntry> {
        progress::query(&self.data, exercise_name)
    }
}
