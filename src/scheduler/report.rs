//! Timetable quality report.
//!
//! Audits a grid against its constraint model and the busy index.
//!
//! # Checks
//!
//! | Check | Hard | Definition |
//! |-------|------|-----------|
//! | EmptyCell | yes | Every (day, session) holds a placement |
//! | QuotaMismatch | yes | Each subject appears exactly `weekly_count` times |
//! | TeacherConflict | yes | No placement collides with the busy index |
//! | ConsecutiveLimitExceeded | yes | No teacher run is longer than the cap |
//! | DuplicateInDay | no | Non-exempt subjects appear at most once a day |
//! | ImmediateRepeat | no | Adjacent sessions hold different subjects |
//!
//! The generator may relax the soft checks to complete a grid, so a
//! generated timetable is always feasible but not necessarily clean.

use std::collections::HashMap;

use crate::models::{BusyIndex, ConstraintModel, Timetable, Violation, ViolationType};

/// Audit result for one timetable.
#[derive(Debug, Clone)]
pub struct TimetableReport {
    /// Filled cells.
    pub filled_cells: usize,
    /// Cells in the grid.
    pub total_cells: usize,
    /// Placements per subject.
    pub subject_counts: HashMap<String, usize>,
    /// Longest back-to-back run per teacher on any day.
    pub longest_run_by_teacher: HashMap<String, usize>,
    /// Every broken rule.
    pub violations: Vec<Violation>,
}

impl TimetableReport {
    /// Audits a timetable.
    pub fn calculate(timetable: &Timetable, model: &ConstraintModel, busy: &BusyIndex) -> Self {
        let mut violations = Vec::new();
        let mut subject_counts: HashMap<String, usize> = HashMap::new();
        let mut longest_run_by_teacher: HashMap<String, usize> = HashMap::new();
        let max_run = model.max_consecutive();

        for day in 0..crate::models::SCHOOL_DAYS {
            let row = timetable.day(day);
            let mut run_teacher: Option<&str> = None;
            let mut run = 0;
            let mut seen: Vec<&str> = Vec::new();

            for (i, cell) in row.iter().enumerate() {
                let session = i + 1;
                let Some(p) = cell else {
                    violations.push(Violation::at_cell(
                        ViolationType::EmptyCell,
                        day,
                        session,
                        "",
                        format!("Day {day} session {session} is empty"),
                    ));
                    run_teacher = None;
                    run = 0;
                    continue;
                };

                *subject_counts.entry(p.subject_id.clone()).or_insert(0) += 1;

                if busy.is_busy(day, session, &p.teacher_id) {
                    violations.push(Violation::at_cell(
                        ViolationType::TeacherConflict,
                        day,
                        session,
                        p.teacher_id.clone(),
                        format!(
                            "Teacher '{}' is already teaching another class on day {day} session {session}",
                            p.teacher_id
                        ),
                    ));
                }

                // Consecutive run
                if run_teacher == Some(p.teacher_id.as_str()) {
                    run += 1;
                } else {
                    run_teacher = Some(p.teacher_id.as_str());
                    run = 1;
                }
                let longest = longest_run_by_teacher
                    .entry(p.teacher_id.clone())
                    .or_insert(0);
                *longest = (*longest).max(run);
                if run == max_run + 1 {
                    violations.push(Violation::at_cell(
                        ViolationType::ConsecutiveLimitExceeded,
                        day,
                        session,
                        p.teacher_id.clone(),
                        format!(
                            "Teacher '{}' exceeds {max_run} consecutive sessions on day {day}",
                            p.teacher_id
                        ),
                    ));
                }

                // Same-day duplicate
                if seen.contains(&p.subject_id.as_str())
                    && !model.allows_multiple_per_day(&p.subject_id)
                {
                    violations.push(Violation::at_cell(
                        ViolationType::DuplicateInDay,
                        day,
                        session,
                        p.subject_id.clone(),
                        format!("Subject '{}' appears more than once on day {day}", p.subject_id),
                    ));
                }
                seen.push(p.subject_id.as_str());

                // Adjacent repeat
                let repeats = i > 0
                    && row[i - 1]
                        .as_ref()
                        .is_some_and(|prev| prev.subject_id == p.subject_id);
                if repeats {
                    violations.push(Violation::at_cell(
                        ViolationType::ImmediateRepeat,
                        day,
                        session,
                        p.subject_id.clone(),
                        format!(
                            "Subject '{}' is taught back to back at sessions {i} and {session} on day {day}",
                            p.subject_id
                        ),
                    ));
                }
            }
        }

        // Quotas
        for alloc in model.allocations() {
            let placed = subject_counts.get(&alloc.subject_id).copied().unwrap_or(0);
            let expected = alloc.weekly_count.max(0) as usize;
            if placed != expected {
                violations.push(Violation::general(
                    ViolationType::QuotaMismatch,
                    alloc.subject_id.clone(),
                    format!(
                        "Subject '{}' is placed {placed} times, expected {expected}",
                        alloc.subject_id
                    ),
                ));
            }
        }
        let mut unexpected: Vec<(&String, &usize)> = subject_counts
            .iter()
            .filter(|(s, _)| model.allocation(s).is_none())
            .collect();
        unexpected.sort();
        for (subject, placed) in unexpected {
            violations.push(Violation::general(
                ViolationType::QuotaMismatch,
                subject.clone(),
                format!("Subject '{subject}' is placed {placed} times but has no allocation"),
            ));
        }

        Self {
            filled_cells: timetable.filled_count(),
            total_cells: timetable.total_cells(),
            subject_counts,
            longest_run_by_teacher,
            violations,
        }
    }

    /// Whether no hard rule is broken.
    pub fn is_feasible(&self) -> bool {
        self.hard_violations().next().is_none()
    }

    /// Whether no rule at all is broken.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations that make the timetable unusable.
    pub fn hard_violations(&self) -> impl Iterator<Item = &Violation> + '_ {
        self.violations
            .iter()
            .filter(|v| v.violation_type.is_hard())
    }

    /// Number of violations of one type.
    pub fn count(&self, violation_type: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == violation_type)
            .count()
    }
}
