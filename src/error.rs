//! Crate-level error type.

use chrono::NaiveDate;
use thiserror::Error;

use crate::scheduler::GenerationFailure;
use crate::validation::ValidationError;

/// Errors surfaced by timetable operations.
///
/// Messages are meant to be shown to the end user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimetableError {
    /// Input was rejected before any computation started.
    #[error("invalid input: {}", summarize(.0))]
    Validation(Vec<ValidationError>),
    /// The constraints could not all be satisfied.
    #[error(transparent)]
    Generation(#[from] GenerationFailure),
    /// The date falls on a weekend (Friday or Saturday).
    #[error("{date} is not a school day (day index {day_index})")]
    NotASchoolDay { date: NaiveDate, day_index: usize },
    /// A timetable cell has no matching slot in the time grid.
    #[error("no session time for day {day_index} session {session}")]
    MissingSlot { day_index: usize, session: usize },
}

impl From<Vec<ValidationError>> for TimetableError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
