//! CSV export of the workout log.
//!
//! One row per set, in log order, so the file can be opened directly in a
//! spreadsheet.

use crate::{Aggregate, Result};
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    exercise: &'a str,
    set: usize,
    reps: u32,
    weight: f64,
    notes: &'a str,
}

/// Write every logged set to `writer`; returns the number of rows written
pub fn write_csv<W: Write>(aggregate: &Aggregate, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for workout in &aggregate.workouts {
        let date = workout.date.to_rfc3339();
        for exercise in &workout.exercises {
            for (i, set) in exercise.sets.iter().enumerate() {
                csv_writer.serialize(CsvRow {
                    date: date.clone(),
                    exercise: &exercise.name,
                    set: i + 1,
                    reps: set.reps,
                    weight: set.weight,
                    notes: exercise.notes.as_deref().unwrap_or(""),
                })?;
                rows += 1;
            }
        }
    }

    csv_writer.flush()?;
    Ok(rows)
}

/// Export to a file, creating parent directories as needed
pub fn export_csv(aggregate: &Aggregate, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(path)?;
    let rows = write_csv(aggregate, std::io::BufWriter::new(file))?;
    tracing::info!("Exported {} sets to {:?}", rows, path);
    Ok(rows)
}
