//! In-progress workout drafts and save-time validation.
//!
//! A draft holds raw user text. Turning it into a [`Workout`] follows a
//! two-tier policy: structural problems (no exercises, a blank name, nothing
//! valid at all) are errors, while individual bad sets and exercises left
//! without valid sets are dropped quietly.

use crate::types::name_key;
use crate::{Error, Exercise, Result, Routine, Workout, WorkoutSet};
use chrono::{DateTime, Utc};

/// One set row as typed by the user; blank fields are unset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftSet {
    pub reps: String,
    pub weight: String,
}

impl DraftSet {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn new(reps: impl Into<String>, weight: impl Into<String>) -> Self {
        Self {
            reps: reps.into(),
            weight: weight.into(),
        }
    }

    /// Pre-fill from routine values; zero values stay blank
    pub fn prefilled(reps: Option<u32>, weight: Option<f64>) -> Self {
        Self {
            reps: reps.filter(|&r| r > 0).map(|r| r.to_string()).unwrap_or_default(),
            weight: weight
                .filter(|&w| w > 0.0)
                .map(|w| w.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.reps.trim().is_empty() && self.weight.trim().is_empty()
    }

    /// The recorded set, or `None` when reps are missing or not positive
    pub fn parse(&self) -> Option<WorkoutSet> {
        let reps = parse_reps(&self.reps)?;
        Some(WorkoutSet::new(reps, parse_weight(&self.weight)))
    }
}

fn parse_reps(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|&r| r > 0)
}

fn parse_weight(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(w) if w.is_finite() && w >= 0.0 => w,
        _ => 0.0,
    }
}

/// One exercise card in the draft
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftExercise {
    pub name: String,
    pub sets: Vec<DraftSet>,
    pub notes: String,
}

impl DraftExercise {
    /// New exercise with a single blank set, ready for input
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: vec![DraftSet::blank()],
            notes: String::new(),
        }
    }

    pub fn with_sets(name: impl Into<String>, sets: Vec<DraftSet>) -> Self {
        Self {
            name: name.into(),
            sets,
            notes: String::new(),
        }
    }

    pub fn add_set(&mut self, set: DraftSet) {
        self.sets.push(set);
    }

    /// Remove the set at `index`; later sets shift down
    pub fn remove_set(&mut self, index: usize) -> Option<DraftSet> {
        (index < self.sets.len()).then(|| self.sets.remove(index))
    }
}

/// The workout currently being composed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutDraft {
    pub exercises: Vec<DraftExercise>,
}

impl WorkoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Append an exercise card and return it for further editing
    pub fn add_exercise(&mut self, exercise: DraftExercise) -> &mut DraftExercise {
        self.exercises.push(exercise);
        let last = self.exercises.len() - 1;
        &mut self.exercises[last]
    }

    /// Put the sets of `exercise` into the first card with the same name
    /// that has nothing typed yet, or append it as a new card
    pub fn fill_exercise(&mut self, exercise: DraftExercise) -> &mut DraftExercise {
        let key = name_key(&exercise.name);
        let open = self
            .exercises
            .iter()
            .position(|e| name_key(&e.name) == key && e.sets.iter().all(DraftSet::is_blank));

        match open {
            Some(index) => {
                let card = &mut self.exercises[index];
                card.sets = exercise.sets;
                if !exercise.notes.trim().is_empty() {
                    card.notes = exercise.notes;
                }
                card
            }
            None => self.add_exercise(exercise),
        }
    }

    pub fn remove_exercise(&mut self, index: usize) -> Option<DraftExercise> {
        (index < self.exercises.len()).then(|| self.exercises.remove(index))
    }

    pub fn clear(&mut self) {
        self.exercises.clear();
    }

    /// Replace the draft contents with the expansion of `routine`
    pub fn load_routine(&mut self, routine: &Routine) {
        *self = crate::routine::expand(routine);
    }

    /// Validate the draft and build the workout it describes.
    ///
    /// The draft itself is left untouched so a failed save can be corrected
    /// and retried.
    pub fn finalize(&self, now: DateTime<Utc>) -> Result<Workout> {
        if self.exercises.is_empty() {
            return Err(Error::EmptyWorkout);
        }

        // Every name is checked before anything is built: all or nothing
        if let Some(position) = self
            .exercises
            .iter()
            .position(|e| e.name.trim().is_empty())
        {
            return Err(Error::InvalidExerciseName {
                position: position + 1,
            });
        }

        let mut exercises = Vec::with_capacity(self.exercises.len());
        for draft in &self.exercises {
            let sets: Vec<WorkoutSet> = draft.sets.iter().filter_map(DraftSet::parse).collect();
            if sets.is_empty() {
                tracing::debug!("Dropping '{}': no valid sets", draft.name.trim());
                continue;
            }

            let notes = draft.notes.trim();
            exercises.push(Exercise {
                name: draft.name.trim().to_string(),
                sets,
                notes: (!notes.is_empty()).then(|| notes.to_string()),
            });
        }

        if exercises.is_empty() {
            return Err(Error::NoValidSets);
        }

        Ok(Workout {
            date: now,
            exercises,
        })
    }
}
