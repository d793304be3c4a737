//! Allocation requirements for one class's week.
//!
//! A [`ConstraintModel`] is built fresh for every generation run from the
//! rows the user selected (subject, teacher, weekly count) plus the grid
//! size and the consecutive-session cap. It is validated up front and
//! never mutated afterwards; the generator works on a [`QuotaTracker`]
//! copy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Subject, SCHOOL_DAYS};
use crate::validation::{validate_allocations, ValidationError};

/// One subject's weekly requirement for a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAllocation {
    /// Subject to place.
    pub subject_id: String,
    /// Teacher who teaches it to this class.
    pub teacher_id: String,
    /// Sessions per week. Must be positive.
    pub weekly_count: i32,
    /// Whether the subject may appear more than once per day.
    #[serde(default)]
    pub allows_multiple_per_day: bool,
}

impl SubjectAllocation {
    /// Creates an allocation limited to one session per day.
    pub fn new(subject_id: impl Into<String>, teacher_id: impl Into<String>, weekly_count: i32) -> Self {
        Self {
            subject_id: subject_id.into(),
            teacher_id: teacher_id.into(),
            weekly_count,
            allows_multiple_per_day: false,
        }
    }

    /// Creates an allocation carrying the subject's repeat flag.
    pub fn for_subject(subject: &Subject, teacher_id: impl Into<String>, weekly_count: i32) -> Self {
        Self {
            subject_id: subject.id.clone(),
            teacher_id: teacher_id.into(),
            weekly_count,
            allows_multiple_per_day: subject.allows_multiple_per_day,
        }
    }

    /// Allows several sessions on the same day.
    pub fn allowing_multiple_per_day(mut self) -> Self {
        self.allows_multiple_per_day = true;
        self
    }
}

/// Validated allocation requirements for one generation run.
///
/// # Example
/// ```
/// use u_timetable::models::{ConstraintModel, SubjectAllocation};
///
/// let model = ConstraintModel::new(
///     vec![
///         SubjectAllocation::new("MATH", "T1", 15),
///         SubjectAllocation::new("SCI", "T2", 15),
///     ],
///     6,
///     3,
/// )
/// .unwrap();
///
/// assert_eq!(model.total_sessions(), 30);
/// assert_eq!(model.quotas().remaining("MATH").unwrap().left, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintModel {
    allocations: Vec<SubjectAllocation>,
    sessions_per_day: usize,
    max_consecutive: usize,
}

impl ConstraintModel {
    /// Validates and builds a model.
    ///
    /// Fails with every detected problem if any row is incomplete, any
    /// count is non-positive, a subject repeats, or the counts do not sum
    /// to exactly `sessions_per_day * 5`.
    pub fn new(
        allocations: Vec<SubjectAllocation>,
        sessions_per_day: usize,
        max_consecutive: usize,
    ) -> Result<Self, Vec<ValidationError>> {
        validate_allocations(&allocations, sessions_per_day, max_consecutive)?;
        Ok(Self {
            allocations,
            sessions_per_day,
            max_consecutive,
        })
    }

    /// Allocation rows in input order.
    pub fn allocations(&self) -> &[SubjectAllocation] {
        &self.allocations
    }

    /// Sessions per day.
    pub fn sessions_per_day(&self) -> usize {
        self.sessions_per_day
    }

    /// Longest run of back-to-back sessions one teacher may teach.
    pub fn max_consecutive(&self) -> usize {
        self.max_consecutive
    }

    /// Number of cells in the weekly grid.
    pub fn total_sessions(&self) -> usize {
        self.sessions_per_day * SCHOOL_DAYS
    }

    /// Finds the allocation for a subject.
    pub fn allocation(&self, subject_id: &str) -> Option<&SubjectAllocation> {
        self.allocations.iter().find(|a| a.subject_id == subject_id)
    }

    /// Whether a subject may be placed more than once on the same day.
    ///
    /// Unknown subjects are not exempt.
    pub fn allows_multiple_per_day(&self, subject_id: &str) -> bool {
        self.allocation(subject_id)
            .is_some_and(|a| a.allows_multiple_per_day)
    }

    /// A fresh bookkeeping copy of every subject's weekly quota.
    pub fn quotas(&self) -> QuotaTracker {
        QuotaTracker {
            left: self
                .allocations
                .iter()
                .map(|a| {
                    (
                        a.subject_id.clone(),
                        Remaining {
                            left: a.weekly_count.max(0) as usize,
                            teacher_id: a.teacher_id.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Sessions still to place for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remaining {
    /// Sessions not yet placed.
    pub left: usize,
    /// Teacher assigned to the subject.
    pub teacher_id: String,
}

/// Per-subject countdown of unplaced sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaTracker {
    left: HashMap<String, Remaining>,
}

impl QuotaTracker {
    /// Remaining quota for a subject.
    pub fn remaining(&self, subject_id: &str) -> Option<&Remaining> {
        self.left.get(subject_id)
    }

    /// Sessions left for a subject (0 if unknown).
    pub fn left(&self, subject_id: &str) -> usize {
        self.left.get(subject_id).map_or(0, |r| r.left)
    }

    /// Consumes one session. Returns `false` if nothing was left.
    pub fn take(&mut self, subject_id: &str) -> bool {
        match self.left.get_mut(subject_id) {
            Some(r) if r.left > 0 => {
                r.left -= 1;
                true
            }
            _ => false,
        }
    }

    /// Total sessions left across all subjects.
    pub fn total_left(&self) -> usize {
        self.left.values().map(|r| r.left).sum()
    }
}
