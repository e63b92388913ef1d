//! Aggregate statistics over logged workouts.
//!
//! All functions are pure reads of an [`Aggregate`] snapshot.

use crate::types::name_key;
use crate::{Aggregate, Workout};
use std::collections::HashMap;

/// How many entries the dashboard lists by default
pub const DEFAULT_TOP_FREQUENT: usize = 5;
pub const DEFAULT_RECENT_ACTIVITY: usize = 5;

/// Number of workouts an exercise appeared in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExerciseCount {
    /// First spelling seen in the log
    pub name: String,
    pub count: usize,
}

/// Dashboard totals
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    pub total_workouts: usize,
    pub total_exercises: usize,
    pub total_sets: usize,
    pub total_routines: usize,
    pub exercise_frequency: Vec<ExerciseCount>,
}

impl Stats {
    pub fn from_aggregate(aggregate: &Aggregate) -> Self {
        Self {
            total_workouts: total_workouts(aggregate),
            total_exercises: total_exercises(aggregate),
            total_sets: total_sets(aggregate),
            total_routines: total_routines(aggregate),
            exercise_frequency: exercise_frequency(aggregate),
        }
    }
}

pub fn total_workouts(aggregate: &Aggregate) -> usize {
    aggregate.workouts.len()
}

pub fn total_exercises(aggregate: &Aggregate) -> usize {
    aggregate.workouts.iter().map(|w| w.exercises.len()).sum()
}

pub fn total_sets(aggregate: &Aggregate) -> usize {
    aggregate.workouts.iter().map(Workout::set_count).sum()
}

pub fn total_routines(aggregate: &Aggregate) -> usize {
    aggregate.routines.len()
}

/// Count exercise entries by name, once per logged exercise (not per set).
///
/// Names are compared ignoring case and surrounding whitespace. Results are
/// in first-seen order.
pub fn exercise_frequency(aggregate: &Aggregate) -> Vec<ExerciseCount> {
    let mut counts: Vec<ExerciseCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for exercise in aggregate.workouts.iter().flat_map(|w| &w.exercises) {
        let key = name_key(&exercise.name);
        match index.get(&key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key, counts.len());
                counts.push(ExerciseCount {
                    name: exercise.name.trim().to_string(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// The `n` most frequent exercises, by count descending then name ascending
pub fn top_frequent(aggregate: &Aggregate, n: usize) -> Vec<ExerciseCount> {
    let mut counts = exercise_frequency(aggregate);
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| name_key(&a.name).cmp(&name_key(&b.name)))
            .then_with(|| a.name.cmp(&b.name))
    });
    counts.truncate(n);
    counts
}

/// The `n` latest workouts by date, newest first; equal dates keep log order
pub fn recent_activity(aggregate: &Aggregate, n: usize) -> Vec<&Workout> {
    let mut workouts: Vec<&Workout> = aggregate.workouts.iter().collect();
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
    workouts.truncate(n);
    workouts
}
