//! Per-exercise progress and workout history views.

use crate::types::name_key;
use crate::{Aggregate, Workout, WorkoutSet};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Workouts listed by the history view when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// The sets logged for one exercise in one workout
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEntry {
    pub date: DateTime<Utc>,
    pub sets: Vec<WorkoutSet>,
}

impl ProgressEntry {
    /// Heaviest weight lifted in this entry (zero for bodyweight-only)
    pub fn top_weight(&self) -> f64 {
        self.sets.iter().map(|s| s.weight).fold(0.0, f64::max)
    }

    pub fn total_reps(&self) -> u64 {
        self.sets.iter().map(|s| u64::from(s.reps)).sum()
    }
}

/// Every logged occurrence of `exercise_name`, oldest first.
///
/// Names match ignoring case. An exercise that was never logged yields an
/// empty series.
pub fn query(aggregate: &Aggregate, exercise_name: &str) -> Vec<ProgressEntry> {
    let mut entries: Vec<ProgressEntry> = aggregate
        .workouts
        .iter()
        .flat_map(|workout| {
            workout
                .exercises
                .iter()
                .filter(move |e| e.matches(exercise_name))
                .map(move |e| ProgressEntry {
                    date: workout.date,
                    sets: e.sets.clone(),
                })
        })
        .collect();

    // Stable: same-date entries keep log order
    entries.sort_by(|a, b| a.date.cmp(&b.date));
    entries
}

/// Workouts newest first, truncated to `limit` when given
pub fn history(aggregate: &Aggregate, limit: Option<usize>) -> Vec<&Workout> {
    let mut workouts: Vec<&Workout> = aggregate.workouts.iter().collect();
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        workouts.truncate(limit);
    }
    workouts
}

/// Distinct exercise names in first-logged order, for suggestions
pub fn exercise_names(aggregate: &Aggregate) -> Vec<String> {
    let mut seen = HashSet::new();
    aggregate
        .workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .filter(|e| seen.insert(name_key(&e.name)))
        .map(|e| e.name.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exercise;
    use chrono::{Duration, TimeZone};

    fn workout(day: i64, name: &str, reps: u32, weight: f64) -> Workout {
        Workout {
            date: Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap() + Duration::days(day),
            exercises: vec![Exercise {
                name: name.into(),
                sets: vec![WorkoutSet::new(reps, weight)],
                notes: None,
            }],
        }
    }

    fn sample() -> Aggregate {
        let mut aggregate = Aggregate::default();
        // Insertion order is not date order
        aggregate.workouts.push(workout(7, "Bench Press", 5, 145.0));
        aggregate.workouts.push(workout(0, "Bench Press", 8, 135.0));
        aggregate.workouts.push(workout(3, "Squat", 5, 225.0));
        aggregate.workouts.push(workout(3, "BENCH PRESS", 6, 140.0));
        aggregate
    }

    #[test]
    fn test_query_is_case_insensitive_and_date_ordered() {
        let aggregate = sample();
        let series = query(&aggregate, "bench press");

        assert_eq!(series.len(), 3);
        let weights: Vec<_> = series.iter().map(|e| e.top_weight()).collect();
        assert_eq!(weights, vec![135.0, 140.0, 145.0]);
        assert!(series.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_query_unknown_exercise_is_empty() {
        assert!(query(&sample(), "Overhead Press").is_empty());
        assert!(query(&Aggregate::default(), "Bench Press").is_empty());
    }

    #[test]
    fn test_progress_entry_summaries() {
        let entry = ProgressEntry {
            date: Utc::now(),
            sets: vec![WorkoutSet::new(10, 0.0), WorkoutSet::new(8, 25.0)],
        };
        assert_eq!(entry.top_weight(), 25.0);
        assert_eq!(entry.total_reps(), 18);

        let huge = ProgressEntry {
            date: Utc::now(),
            sets: vec![WorkoutSet::new(u32::MAX, 0.0), WorkoutSet::new(u32::MAX, 0.0)],
        };
        assert_eq!(huge.total_reps(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_history_newest_first_with_limit() {
        let aggregate = sample();

        let all = history(&aggregate, None);
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].date >= w[1].date));

        let limited = history(&aggregate, Some(2));
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].exercises[0].sets[0].weight, 145.0);
    }

    #[test]
    fn test_exercise_names_are_distinct() {
        let names = exercise_names(&sample());
        assert_eq!(names, vec!["Bench Press".to_string(), "Squat".to_string()]);
    }
}
