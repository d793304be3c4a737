//! Timetable (solution) model and persisted schedule records.
//!
//! A [`Timetable`] is one class's weekly grid: five days of
//! `sessions_per_day` cells, each empty or holding a subject/teacher
//! [`Placement`]. It is what the generator produces and what manual edits
//! modify. Saving flattens it into [`ScheduleItem`]s; reading back yields
//! [`SavedSchedule`]s carrying names as well as IDs.
//!
//! Session numbers in the public API start at 1.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{NamedRef, SCHOOL_DAYS};
use crate::error::TimetableError;
use crate::timegrid::{slot_at, SessionSlot};

/// A subject taught by a teacher in one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Placed subject.
    pub subject_id: String,
    /// Teacher teaching it.
    pub teacher_id: String,
}

impl Placement {
    /// Creates a placement.
    pub fn new(subject_id: impl Into<String>, teacher_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            teacher_id: teacher_id.into(),
        }
    }
}

/// One class's weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    days: Vec<Vec<Option<Placement>>>,
}

impl Timetable {
    /// Creates an empty grid.
    pub fn new(sessions_per_day: usize) -> Self {
        Self {
            days: vec![vec![None; sessions_per_day]; SCHOOL_DAYS],
        }
    }

    pub(crate) fn from_days(days: Vec<Vec<Option<Placement>>>) -> Self {
        Self { days }
    }

    /// Sessions per day.
    pub fn sessions_per_day(&self) -> usize {
        self.days.first().map_or(0, Vec::len)
    }

    /// Number of cells in the grid.
    pub fn total_cells(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    /// The placement at (day, session), if any.
    pub fn get(&self, day_index: usize, session: usize) -> Option<&Placement> {
        let offset = session.checked_sub(1)?;
        self.days.get(day_index)?.get(offset)?.as_ref()
    }

    /// Overwrites a cell (manual edit).
    ///
    /// Returns `false` and changes nothing if the cell is outside the grid.
    pub fn set(&mut self, day_index: usize, session: usize, cell: Option<Placement>) -> bool {
        let Some(offset) = session.checked_sub(1) else {
            return false;
        };
        match self.days.get_mut(day_index).and_then(|d| d.get_mut(offset)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Cells of one day, indexed from session 1 at position 0.
    pub fn day(&self, day_index: usize) -> &[Option<Placement>] {
        self.days.get(day_index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All filled cells as `(day, session, placement)`.
    pub fn placements(&self) -> impl Iterator<Item = (usize, usize, &Placement)> + '_ {
        self.days.iter().enumerate().flat_map(|(day, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(i, cell)| cell.as_ref().map(|p| (day, i + 1, p)))
        })
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.placements().count()
    }

    /// Whether every cell is filled.
    pub fn is_complete(&self) -> bool {
        self.filled_count() == self.total_cells()
    }

    /// Number of placements of a subject across the week.
    pub fn subject_count(&self, subject_id: &str) -> usize {
        self.placements()
            .filter(|(_, _, p)| p.subject_id == subject_id)
            .count()
    }

    /// Flattens the grid into save records, taking times from `slots`.
    ///
    /// Fails with the first (day, session) that has no matching slot,
    /// so a grid built for a different day length never saves partially.
    pub fn to_items(&self, slots: &[SessionSlot]) -> Result<Vec<ScheduleItem>, TimetableError> {
        self.placements()
            .map(|(day, session, p)| {
                let slot = slot_at(slots, day, session).ok_or(TimetableError::MissingSlot {
                    day_index: day,
                    session,
                })?;
                Ok(ScheduleItem {
                    day_index: day,
                    session,
                    start: slot.start,
                    end: slot.end,
                    subject_id: p.subject_id.clone(),
                    teacher_id: p.teacher_id.clone(),
                })
            })
            .collect()
    }

    /// Builds the save payload for this grid.
    pub fn to_draft(
        &self,
        class_id: impl Into<String>,
        name: impl Into<String>,
        slots: &[SessionSlot],
    ) -> Result<ScheduleDraft, TimetableError> {
        Ok(ScheduleDraft {
            class_id: class_id.into(),
            name: name.into(),
            items: self.to_items(slots)?,
        })
    }

    /// Rebuilds a grid from a persisted schedule (for editing).
    pub fn from_saved(schedule: &SavedSchedule, sessions_per_day: usize) -> Self {
        let mut grid = Self::new(sessions_per_day);
        for item in &schedule.items {
            grid.set(
                item.day_index,
                item.session,
                Some(Placement::new(item.subject.id.clone(), item.teacher.id.clone())),
            );
        }
        grid
    }
}

/// One flattened cell in a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    /// Day of the school week (0..5).
    pub day_index: usize,
    /// Session number (1-based).
    pub session: usize,
    /// Session start.
    pub start: NaiveTime,
    /// Session end.
    pub end: NaiveTime,
    /// Placed subject.
    pub subject_id: String,
    /// Teaching teacher.
    pub teacher_id: String,
}

/// Save request for one class's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    /// Class the schedule belongs to.
    pub class_id: String,
    /// Schedule name.
    pub name: String,
    /// Flattened cells.
    pub items: Vec<ScheduleItem>,
}

/// One cell of a persisted schedule, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    /// Day of the school week (0..5).
    pub day_index: usize,
    /// Session number (1-based).
    pub session: usize,
    /// Session start.
    pub start: NaiveTime,
    /// Session end.
    pub end: NaiveTime,
    /// Placed subject.
    pub subject: NamedRef,
    /// Teaching teacher.
    pub teacher: NamedRef,
}

/// A persisted schedule for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSchedule {
    /// Schedule identifier.
    pub id: String,
    /// Owning class.
    pub class_id: String,
    /// Persisted cells.
    pub items: Vec<SavedItem>,
}

impl SavedSchedule {
    /// Creates an empty schedule.
    pub fn new(id: impl Into<String>, class_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class_id: class_id.into(),
            items: Vec::new(),
        }
    }

    /// Adds a cell.
    pub fn with_item(mut self, item: SavedItem) -> Self {
        self.items.push(item);
        self
    }

    /// Cells taught by a teacher on a given day, ordered by session.
    pub fn items_for_teacher_on(&self, teacher_id: &str, day_index: usize) -> Vec<&SavedItem> {
        let mut items: Vec<&SavedItem> = self
            .items
            .iter()
            .filter(|i| i.day_index == day_index && i.teacher.id == teacher_id)
            .collect();
        items.sort_by_key(|i| i.session);
        items
    }
}

/// A rule broken by a timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Day of the offending cell, if cell-specific.
    pub day_index: Option<usize>,
    /// Session of the offending cell, if cell-specific.
    pub session: Option<usize>,
    /// Related entity ID (subject or teacher).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of timetable violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// A cell has no placement.
    EmptyCell,
    /// A subject is placed more or fewer times than its weekly count.
    QuotaMismatch,
    /// A teacher is busy in another class at the same time.
    TeacherConflict,
    /// A teacher teaches more back-to-back sessions than allowed.
    ConsecutiveLimitExceeded,
    /// A subject without the repeat flag appears twice in a day.
    DuplicateInDay,
    /// The same subject occupies two adjacent sessions.
    ImmediateRepeat,
}

impl ViolationType {
    /// Hard violations make a timetable unusable. The rest are
    /// preferences the generator may relax.
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            Self::EmptyCell
                | Self::QuotaMismatch
                | Self::TeacherConflict
                | Self::ConsecutiveLimitExceeded
        )
    }
}

impl Violation {
    /// Creates a violation tied to one cell.
    pub fn at_cell(
        violation_type: ViolationType,
        day_index: usize,
        session: usize,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            day_index: Some(day_index),
            session: Some(session),
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }

    /// Creates a violation not tied to a cell.
    pub fn general(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            day_index: None,
            session: None,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timegrid::{build_grid, GridConfig};

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn saved_item(day: usize, session: usize, subject: &str, teacher: &str) -> SavedItem {
        SavedItem {
            day_index: day,
            session,
            start: at(8, 0),
            end: at(8, 45),
            subject: NamedRef::new(subject, subject),
            teacher: NamedRef::new(teacher, teacher),
        }
    }

    #[test]
    fn test_empty_timetable() {
        let t = Timetable::new(6);
        assert_eq!(t.sessions_per_day(), 6);
        assert_eq!(t.total_cells(), 30);
        assert_eq!(t.filled_count(), 0);
        assert!(!t.is_complete());
    }

    #[test]
    fn test_set_and_get() {
        let mut t = Timetable::new(3);
        assert!(t.set(2, 1, Some(Placement::new("MATH", "T1"))));
        assert_eq!(t.get(2, 1).unwrap().teacher_id, "T1");
        assert!(t.get(2, 2).is_none());
        assert!(t.get(2, 0).is_none());

        // out of range
        assert!(!t.set(5, 1, Some(Placement::new("MATH", "T1"))));
        assert!(!t.set(0, 4, Some(Placement::new("MATH", "T1"))));
        assert!(!t.set(0, 0, Some(Placement::new("MATH", "T1"))));

        assert!(t.set(2, 1, None));
        assert_eq!(t.filled_count(), 0);
    }

    #[test]
    fn test_placements_are_one_based() {
        let mut t = Timetable::new(2);
        t.set(4, 2, Some(Placement::new("ART", "T9")));
        let all: Vec<_> = t.placements().collect();
        assert_eq!(all.len(), 1);
        assert_eq!((all[0].0, all[0].1), (4, 2));
        assert_eq!(t.day(4)[1].as_ref().unwrap().subject_id, "ART");
        assert!(t.day(7).is_empty());
    }

    #[test]
    fn test_to_draft_uses_slot_times() {
        let slots = build_grid(&GridConfig::auto(2, at(8, 0), 45)).unwrap();
        let mut t = Timetable::new(2);
        t.set(1, 2, Some(Placement::new("MATH", "T1")));
        t.set(0, 1, Some(Placement::new("SCI", "T2")));

        let draft = t.to_draft("C1", "Week A", &slots).unwrap();
        assert_eq!(draft.class_id, "C1");
        assert_eq!(draft.items.len(), 2);
        let math = draft.items.iter().find(|i| i.subject_id == "MATH").unwrap();
        assert_eq!(math.day_index, 1);
        assert_eq!(math.session, 2);
        assert_eq!(math.start, at(8, 45));
        assert_eq!(math.end, at(9, 30));
    }

    #[test]
    fn test_to_draft_rejects_grid_longer_than_slots() {
        let slots = build_grid(&GridConfig::auto(2, at(8, 0), 45)).unwrap();
        let mut t = Timetable::new(3);
        t.set(0, 1, Some(Placement::new("SCI", "T2")));
        t.set(0, 3, Some(Placement::new("MATH", "T1")));

        let err = t.to_draft("C1", "Week A", &slots).unwrap_err();
        assert_eq!(
            err,
            TimetableError::MissingSlot {
                day_index: 0,
                session: 3
            }
        );
        assert_eq!(err.to_string(), "no session time for day 0 session 3");
    }

    #[test]
    fn test_from_saved_round_trip() {
        let saved = SavedSchedule::new("S1", "C1")
            .with_item(saved_item(0, 1, "MATH", "T1"))
            .with_item(saved_item(3, 2, "SCI", "T2"));
        let t = Timetable::from_saved(&saved, 2);
        assert_eq!(t.filled_count(), 2);
        assert_eq!(t.get(3, 2).unwrap().subject_id, "SCI");
        assert_eq!(t.subject_count("MATH"), 1);
    }

    #[test]
    fn test_items_for_teacher_on() {
        let saved = SavedSchedule::new("S1", "C1")
            .with_item(saved_item(2, 4, "MATH", "T1"))
            .with_item(saved_item(2, 1, "MATH", "T1"))
            .with_item(saved_item(2, 2, "SCI", "T2"))
            .with_item(saved_item(3, 1, "MATH", "T1"));
        let items = saved.items_for_teacher_on("T1", 2);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].session, 1);
        assert_eq!(items[1].session, 4);
    }

    #[test]
    fn test_saved_schedule_json_contract() {
        let json = r#"{
            "id": "S1",
            "classId": "C1",
            "items": [{
                "dayIndex": 1, "session": 3, "start": "09:30:00", "end": "10:15:00",
                "subject": {"id": "MATH", "name": "Math"},
                "teacher": {"id": "T1", "name": "Huda"}
            }]
        }"#;
        let saved: SavedSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(saved.items[0].teacher.name, "Huda");
        assert_eq!(saved.items[0].start, at(9, 30));
    }

    #[test]
    fn test_violation_severity_split() {
        assert!(ViolationType::TeacherConflict.is_hard());
        assert!(ViolationType::EmptyCell.is_hard());
        assert!(!ViolationType::DuplicateInDay.is_hard());
        assert!(!ViolationType::ImmediateRepeat.is_hard());

        let v = Violation::at_cell(ViolationType::ImmediateRepeat, 1, 2, "MATH", "repeat");
        assert_eq!(v.day_index, Some(1));
        let g = Violation::general(ViolationType::QuotaMismatch, "MATH", "short");
        assert!(g.session.is_none());
    }
}
