//! Cross-class teacher commitments.
//!
//! The busy index is a read-side view derived from persisted schedules:
//! for every (day, session) it lists the teachers already teaching
//! somewhere. It is rebuilt from the store whenever a schedule is saved
//! and passed to a generation run as an immutable snapshot.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::{SavedSchedule, Timetable};

/// (day, session) → teachers committed at that time.
///
/// # Example
/// ```
/// use u_timetable::models::BusyIndex;
///
/// let mut index = BusyIndex::new();
/// index.insert(1, 3, "T1");
/// assert!(index.is_busy(1, 3, "T1"));
/// assert!(!index.is_busy(1, 4, "T1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyIndex {
    slots: HashMap<(usize, usize), HashSet<String>>,
}

impl BusyIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every cell of every schedule.
    pub fn from_schedules(schedules: &[SavedSchedule]) -> Self {
        Self::build(schedules.iter())
    }

    /// Indexes every schedule except those of `class_id`.
    ///
    /// Used when regenerating a class, so its own previous timetable does
    /// not block it.
    pub fn from_schedules_excluding(schedules: &[SavedSchedule], class_id: &str) -> Self {
        Self::build(schedules.iter().filter(|s| s.class_id != class_id))
    }

    fn build<'a>(schedules: impl Iterator<Item = &'a SavedSchedule>) -> Self {
        let mut index = Self::new();
        for schedule in schedules {
            for item in &schedule.items {
                index.insert(item.day_index, item.session, item.teacher.id.clone());
            }
        }
        index
    }

    /// Marks a teacher busy at (day, session).
    pub fn insert(&mut self, day_index: usize, session: usize, teacher_id: impl Into<String>) {
        self.slots
            .entry((day_index, session))
            .or_default()
            .insert(teacher_id.into());
    }

    /// Returns a copy with every placement of `timetable` added.
    ///
    /// Call only after the timetable's save has been confirmed.
    pub fn with_timetable(mut self, timetable: &Timetable) -> Self {
        for (day, session, p) in timetable.placements() {
            self.insert(day, session, p.teacher_id.clone());
        }
        self
    }

    /// Whether a teacher is committed at (day, session).
    pub fn is_busy(&self, day_index: usize, session: usize, teacher_id: &str) -> bool {
        self.slots
            .get(&(day_index, session))
            .is_some_and(|teachers| teachers.contains(teacher_id))
    }

    /// Teachers committed at (day, session), sorted.
    pub fn teachers_at(&self, day_index: usize, session: usize) -> Vec<&str> {
        let mut teachers: Vec<&str> = self
            .slots
            .get(&(day_index, session))
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        teachers.sort_unstable();
        teachers
    }

    /// Number of (day, session) pairs with at least one busy teacher.
    pub fn len(&self) -> usize {
        self.slots.values().filter(|s| !s.is_empty()).count()
    }

    /// Whether no teacher is busy anywhere.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Weekly teaching load per teacher: the number of persisted cells
/// they teach across all classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeacherLoads {
    loads: HashMap<String, usize>,
}

impl TeacherLoads {
    /// Counts cells per teacher.
    pub fn from_schedules(schedules: &[SavedSchedule]) -> Self {
        let mut loads = HashMap::new();
        for item in schedules.iter().flat_map(|s| &s.items) {
            *loads.entry(item.teacher.id.clone()).or_insert(0) += 1;
        }
        Self { loads }
    }

    /// Load of a teacher (0 if they teach nothing).
    pub fn get(&self, teacher_id: &str) -> usize {
        self.loads.get(teacher_id).copied().unwrap_or(0)
    }
}
