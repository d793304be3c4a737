//! Input validation for timetable generation.
//!
//! Checks constraint rows and grid configuration before any placement
//! work starts. Detects:
//! - Rows missing a subject or teacher
//! - Non-positive weekly counts and duplicate subject rows
//! - Weekly totals that do not exactly fill the grid
//! - Break windows that collide, overflow, or point outside the day
//! - Manual session times that end before they start
//!
//! All problems are collected and returned together, so one round trip
//! is enough to fix a bad request.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::models::{SubjectAllocation, SCHOOL_DAYS};
use crate::timegrid::{GridConfig, MAX_BREAKS};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    /// An allocation row has no subject.
    MissingSubject,
    /// An allocation row has no teacher.
    MissingTeacher,
    /// An allocation row asks for zero or fewer sessions.
    NonPositiveWeeklyCount,
    /// Weekly counts do not add up to the number of grid cells.
    TotalMismatch,
    /// Two allocation rows name the same subject.
    DuplicateSubject,
    /// Two breaks are placed after the same session.
    DuplicateBreakPosition,
    /// A break is placed after session 0 or after the last session.
    InvalidBreakPosition,
    /// A break has zero length.
    InvalidBreakLength,
    /// More than two breaks were configured.
    TooManyBreaks,
    /// A manual session ends before it starts.
    InvalidSessionTime,
    /// Sessions per day is zero.
    InvalidSessionsPerDay,
    /// Session length is zero.
    InvalidSessionLength,
    /// The computed day runs past midnight.
    DayOverflow,
    /// Maximum consecutive sessions is zero.
    InvalidConsecutiveLimit,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates allocation rows against the grid size.
///
/// Checks:
/// 1. `sessions_per_day` and `max_consecutive` are at least 1
/// 2. Every row names a subject and a teacher
/// 3. Every row has a positive weekly count
/// 4. No subject appears in two rows
/// 5. Weekly counts sum to exactly `sessions_per_day * 5`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_allocations(
    allocations: &[SubjectAllocation],
    sessions_per_day: usize,
    max_consecutive: usize,
) -> ValidationResult {
    let mut errors = Vec::new();

    if sessions_per_day == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSessionsPerDay,
            "Sessions per day must be at least 1",
        ));
    }
    if max_consecutive == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConsecutiveLimit,
            "Maximum consecutive sessions must be at least 1",
        ));
    }

    let mut subjects = HashSet::new();
    for (i, row) in allocations.iter().enumerate() {
        let row_no = i + 1;
        if row.subject_id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingSubject,
                format!("Row {row_no} has no subject"),
            ));
        } else if !subjects.insert(row.subject_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSubject,
                format!("Subject '{}' appears in more than one row", row.subject_id),
            ));
        }
        if row.teacher_id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingTeacher,
                format!("Row {row_no} has no teacher"),
            ));
        }
        if row.weekly_count <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveWeeklyCount,
                format!(
                    "Row {row_no} has weekly count {}, expected at least 1",
                    row.weekly_count
                ),
            ));
        }
    }

    let total: i64 = allocations.iter().map(|a| i64::from(a.weekly_count)).sum();
    let expected = (sessions_per_day * SCHOOL_DAYS) as i64;
    if total != expected {
        errors.push(ValidationError::new(
            ValidationErrorKind::TotalMismatch,
            format!(
                "Weekly counts add up to {total}, but the week has {expected} sessions \
                 ({sessions_per_day} per day x {SCHOOL_DAYS} days)"
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a grid configuration.
///
/// Computed timing: at most two breaks, each after a session in
/// `1..sessions_per_day`, no two at the same position, positive lengths,
/// and a day that ends before midnight. Manual times, when they are in
/// use, must each end after they start. Manual times of the wrong length
/// are not an error; the grid falls back to computed times.
pub fn validate_grid_config(config: &GridConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let n = config.sessions_per_day;

    if n == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSessionsPerDay,
            "Sessions per day must be at least 1",
        ));
    }

    if config.session_length_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSessionLength,
            "Session length must be at least 1 minute",
        ));
    }
    if config.breaks.len() > MAX_BREAKS {
        errors.push(ValidationError::new(
            ValidationErrorKind::TooManyBreaks,
            format!("{} breaks configured, at most {MAX_BREAKS} allowed", config.breaks.len()),
        ));
    }

    let mut positions = HashSet::new();
    for b in &config.breaks {
        if b.after_session == 0 || b.after_session >= n {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBreakPosition,
                format!(
                    "Break after session {} is outside sessions 1..{}",
                    b.after_session,
                    n.saturating_sub(1)
                ),
            ));
        }
        if !positions.insert(b.after_session) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateBreakPosition,
                format!("Two breaks are placed after session {}", b.after_session),
            ));
        }
        if b.length_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBreakLength,
                format!("Break after session {} has zero length", b.after_session),
            ));
        }
    }

    let day_minutes = n as i64 * i64::from(config.session_length_minutes)
        + config.breaks.iter().map(|b| i64::from(b.length_minutes)).sum::<i64>();
    if runs_past_midnight(config.day_start, day_minutes) {
        errors.push(ValidationError::new(
            ValidationErrorKind::DayOverflow,
            format!(
                "A {day_minutes}-minute day starting at {} runs past midnight",
                config.day_start
            ),
        ));
    }

    if let Some(times) = config.manual_override() {
        for (i, t) in times.iter().enumerate() {
            if t.end <= t.start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSessionTime,
                    format!("Session {} ends at {} before it starts at {}", i + 1, t.end, t.start),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn runs_past_midnight(start: NaiveTime, minutes: i64) -> bool {
    let (_, wrapped_secs) = start.overflowing_add_signed(Duration::minutes(minutes));
    wrapped_secs != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timegrid::{BreakWindow, SessionTime};

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn rows(counts: &[(&str, &str, i32)]) -> Vec<SubjectAllocation> {
        counts
            .iter()
            .map(|(s, t, n)| SubjectAllocation::new(*s, *t, *n))
            .collect()
    }

    #[test]
    fn test_valid_allocations() {
        let allocs = rows(&[("MATH", "T1", 15), ("SCI", "T2", 15)]);
        assert!(validate_allocations(&allocs, 6, 3).is_ok());
    }

    #[test]
    fn test_total_mismatch() {
        let allocs = rows(&[("MATH", "T1", 15), ("SCI", "T2", 14)]);
        let errors = validate_allocations(&allocs, 6, 3).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::TotalMismatch);
        assert!(errors[0].message.contains("29"));
        assert!(errors[0].message.contains("30"));
    }

    #[test]
    fn test_missing_subject_and_teacher() {
        let allocs = rows(&[("", "T1", 15), ("SCI", " ", 15)]);
        let errors = validate_allocations(&allocs, 6, 3).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingSubject));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingTeacher));
    }

    #[test]
    fn test_non_positive_weekly_count() {
        let allocs = rows(&[("MATH", "T1", 30), ("SCI", "T2", 0), ("ART", "T3", -1)]);
        let errors = validate_allocations(&allocs, 6, 3).unwrap_err();
        let count = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::NonPositiveWeeklyCount)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_duplicate_subject() {
        let allocs = rows(&[("MATH", "T1", 15), ("MATH", "T2", 15)]);
        let errors = validate_allocations(&allocs, 6, 3).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateSubject));
    }

    #[test]
    fn test_zero_limits() {
        let errors = validate_allocations(&[], 0, 0).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidSessionsPerDay));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidConsecutiveLimit));
    }

    #[test]
    fn test_duplicate_break_position() {
        let config = GridConfig::auto(6, at(7, 30), 45)
            .with_break(BreakWindow::new(2, 15))
            .with_break(BreakWindow::new(2, 20));
        let errors = validate_grid_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateBreakPosition));
    }

    #[test]
    fn test_break_position_out_of_range() {
        let config = GridConfig::auto(6, at(7, 30), 45)
            .with_break(BreakWindow::new(0, 15))
            .with_break(BreakWindow::new(6, 15));
        let errors = validate_grid_config(&config).unwrap_err();
        let count = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidBreakPosition)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_too_many_breaks() {
        let config = GridConfig::auto(7, at(7, 30), 45)
            .with_break(BreakWindow::new(2, 15))
            .with_break(BreakWindow::new(4, 15))
            .with_break(BreakWindow::new(5, 15));
        let errors = validate_grid_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::TooManyBreaks));
    }

    #[test]
    fn test_day_overflow() {
        let config = GridConfig::auto(6, at(22, 0), 60);
        let errors = validate_grid_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DayOverflow));
    }

    #[test]
    fn test_unused_manual_times_not_checked() {
        // one reversed entry for three sessions: ignored, so still valid
        let config = GridConfig::auto(3, at(8, 0), 45)
            .with_manual_times(vec![SessionTime::new(at(9, 0), at(8, 0))]);
        assert!(validate_grid_config(&config).is_ok());
    }

    #[test]
    fn test_manual_time_reversed() {
        let config = GridConfig::auto(1, at(8, 0), 45)
            .with_manual_times(vec![SessionTime::new(at(9, 0), at(8, 0))]);
        let errors = validate_grid_config(&config).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidSessionTime);
    }

    #[test]
    fn test_kind_serializes_screaming_case() {
        let json = serde_json::to_string(&ValidationErrorKind::DuplicateBreakPosition).unwrap();
        assert_eq!(json, "\"DUPLICATE_BREAK_POSITION\"");
    }
}
