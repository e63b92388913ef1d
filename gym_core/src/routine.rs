//! Routine expansion and authoring.
//!
//! Expansion turns a saved routine into a fresh [`WorkoutDraft`]:
//! - Legacy entries become one exercise with a single blank set
//! - Structured entries become one exercise with `sets` identical rows,
//!   pre-filled with the template's reps and weight when present

use crate::draft::{DraftExercise, DraftSet, WorkoutDraft};
use crate::{Error, Result, Routine, RoutineEntry, RoutineTemplate};

/// Build a draft workout from a routine, one exercise per entry in order
pub fn expand(routine: &Routine) -> WorkoutDraft {
    let exercises = routine
        .entries
        .iter()
        .map(|entry| match entry {
            RoutineEntry::Legacy(name) => DraftExercise::new(name.clone()),
            RoutineEntry::Structured(template) => {
                let set = DraftSet::prefilled(template.reps, template.weight);
                let count = template.set_count() as usize;
                DraftExercise::with_sets(template.name.clone(), vec![set; count])
            }
        })
        .collect();

    WorkoutDraft { exercises }
}

/// Validate and normalize a routine being saved.
///
/// Names are trimmed, blank entries are skipped, and the routine must keep
/// at least one entry.
pub fn normalize(name: &str, entries: Vec<RoutineEntry>) -> Result<(String, Routine)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::MissingRoutineName);
    }

    let entries: Vec<RoutineEntry> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            RoutineEntry::Legacy(n) => {
                let n = n.trim();
                (!n.is_empty()).then(|| RoutineEntry::Legacy(n.to_string()))
            }
            RoutineEntry::Structured(mut t) => {
                t.name = t.name.trim().to_string();
                (!t.name.is_empty()).then_some(RoutineEntry::Structured(t))
            }
        })
        .collect();

    if entries.is_empty() {
        return Err(Error::EmptyRoutine);
    }

    Ok((name.to_string(), Routine::new(entries)))
}

/// Parse a routine entry from text.
///
/// `Name` gives a legacy entry; `Name:SETS`, `Name:SETSxREPS` and
/// `Name:SETSxREPS@WEIGHT` give structured entries.
pub fn parse_entry(text: &str) -> Result<RoutineEntry> {
    let Some((name, spec)) = text.rsplit_once(':') else {
        return Ok(RoutineEntry::Legacy(text.trim().to_string()));
    };

    let invalid = || Error::Other(format!("Invalid routine entry '{}'", text));

    let (counts, weight) = match spec.split_once('@') {
        Some((counts, weight)) => {
            let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid());
            }
            (counts, Some(weight))
        }
        None => (spec, None),
    };

    let (sets, reps) = match counts.split_once(['x', 'X']) {
        Some((sets, reps)) => (sets, Some(reps)),
        None => (counts, None),
    };

    let sets: u32 = sets.trim().parse().map_err(|_| invalid())?;
    let reps = reps
        .map(|r| r.trim().parse::<u32>())
        .transpose()
        .map_err(|_| invalid())?;
    if sets == 0 || reps == Some(0) {
        return Err(invalid());
    }

    Ok(RoutineEntry::Structured(RoutineTemplate {
        name: name.trim().to_string(),
        sets: Some(sets),
        reps,
        weight,
    }))
}
