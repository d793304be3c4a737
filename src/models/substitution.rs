//! Substitution records.
//!
//! A substitution hands one session of an absent teacher to a replacement
//! for a single date. Records are persisted separately from schedules;
//! the per-week counts used for ranking are always recomputed from them.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::week_start;

/// A persisted substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    /// Date of the absence.
    pub date: NaiveDate,
    /// Day of the school week (0..5).
    pub day_index: usize,
    /// Session number (1-based).
    pub session: usize,
    /// Session start.
    pub start: NaiveTime,
    /// Session end.
    pub end: NaiveTime,
    /// Class being covered.
    pub class_id: String,
    /// Subject normally taught in the session.
    pub subject_id: Option<String>,
    /// Teacher who is absent.
    pub absent_teacher_id: String,
    /// Teacher covering the session.
    pub replacement_teacher_id: String,
}

/// One row of a substitution-save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionRow {
    /// Day of the school week (0..5).
    pub day_index: usize,
    /// Session number (1-based).
    pub session: usize,
    /// Session start.
    pub start: NaiveTime,
    /// Session end.
    pub end: NaiveTime,
    /// Class being covered.
    pub class_id: String,
    /// Subject normally taught in the session.
    pub subject_id: Option<String>,
    /// Teacher who is absent.
    pub absent_teacher_id: String,
    /// Chosen replacement.
    pub replacement_id: String,
}

impl SubstitutionRow {
    /// The record this row becomes once saved for `date`.
    pub fn into_substitution(self, date: NaiveDate) -> Substitution {
        Substitution {
            date,
            day_index: self.day_index,
            session: self.session,
            start: self.start,
            end: self.end,
            class_id: self.class_id,
            subject_id: self.subject_id,
            absent_teacher_id: self.absent_teacher_id,
            replacement_teacher_id: self.replacement_id,
        }
    }
}

/// Substitution-save request for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionDraft {
    /// Date of the absence.
    pub date: NaiveDate,
    /// Chosen substitutions.
    pub rows: Vec<SubstitutionRow>,
}

/// Substitutions of one school week, aggregated per replacement teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionLedger {
    counts: HashMap<String, usize>,
    booked: HashSet<(NaiveDate, usize, String)>,
}

impl SubstitutionLedger {
    /// Aggregates the records that fall in the week (Sunday to Saturday)
    /// containing `date`. Records from other weeks are ignored.
    pub fn for_week_of(records: &[Substitution], date: NaiveDate) -> Self {
        let from = week_start(date);
        let to = from + Duration::days(7);

        let mut ledger = Self::default();
        for r in records.iter().filter(|r| r.date >= from && r.date < to) {
            *ledger
                .counts
                .entry(r.replacement_teacher_id.clone())
                .or_insert(0) += 1;
            ledger
                .booked
                .insert((r.date, r.session, r.replacement_teacher_id.clone()));
        }
        ledger
    }

    /// Substitutions a teacher has covered this week.
    pub fn count(&self, teacher_id: &str) -> usize {
        self.counts.get(teacher_id).copied().unwrap_or(0)
    }

    /// Whether a teacher is already covering another session at (date, session).
    pub fn is_booked(&self, date: NaiveDate, session: usize, teacher_id: &str) -> bool {
        self.booked.contains(&(date, session, teacher_id.to_string()))
    }
}
