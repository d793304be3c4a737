//! Candidate filtering and ranking for one absence.

use chrono::{NaiveDate, NaiveTime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::TimetableError;
use crate::models::{
    day_index_for, is_school_day, BusyIndex, SavedItem, SavedSchedule, Substitution,
    SubstitutionDraft, SubstitutionLedger, SubstitutionRow, Teacher, TeacherLoads,
};
use crate::ranking::RuleEngine;

/// Weekly sessions at which a teacher stops being offered as a substitute.
pub const DEFAULT_MAX_WEEKLY_LOAD: usize = 24;

/// A teacher who could cover a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Teacher ID.
    pub teacher_id: String,
    /// Display name.
    pub name: String,
    /// Sessions scheduled this week across all classes.
    pub weekly_load: usize,
    /// Substitutions already covered this week.
    pub substitutions: usize,
    /// Whether the teacher teaches the session's subject.
    #[serde(default)]
    pub teaches_subject: bool,
    /// Whether the teacher is attached to the session's class.
    #[serde(default)]
    pub knows_class: bool,
}

impl Candidate {
    /// Creates a candidate.
    pub fn new(
        teacher_id: impl Into<String>,
        name: impl Into<String>,
        weekly_load: usize,
        substitutions: usize,
    ) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            name: name.into(),
            weekly_load,
            substitutions,
            teaches_subject: false,
            knows_class: false,
        }
    }

    /// Marks how familiar the teacher is with the session.
    pub fn with_familiarity(mut self, teaches_subject: bool, knows_class: bool) -> Self {
        self.teaches_subject = teaches_subject;
        self.knows_class = knows_class;
        self
    }
}

/// One session of the absent teacher with its ranked substitutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubRow {
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
    /// Subject normally taught.
    pub subject_id: Option<String>,
    /// Teacher who is absent.
    pub absent_teacher_id: String,
    /// Eligible substitutes, preferred first.
    pub candidates: Vec<Candidate>,
    /// Chosen substitute. Defaults to the top candidate.
    pub selected: Option<String>,
}

impl SubRow {
    /// Overrides the pick. Only listed candidates can be chosen.
    pub fn choose(&mut self, teacher_id: &str) -> bool {
        if self.candidates.iter().any(|c| c.teacher_id == teacher_id) {
            self.selected = Some(teacher_id.to_string());
            true
        } else {
            false
        }
    }

    /// The save row for the current pick, if there is one.
    pub fn to_row(&self) -> Option<SubstitutionRow> {
        let replacement_id = self.selected.clone()?;
        Some(SubstitutionRow {
            day_index: self.day_index,
            session: self.session,
            start: self.start,
            end: self.end,
            class_id: self.class_id.clone(),
            subject_id: self.subject_id.clone(),
            absent_teacher_id: self.absent_teacher_id.clone(),
            replacement_id,
        })
    }
}

/// Outcome kind of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationStatus {
    /// At least one session needs cover.
    Ready,
    /// The teacher teaches nothing that day.
    NoScheduledSessions,
}

/// Ranked substitutes for every session of one absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Date of the absence.
    pub date: NaiveDate,
    /// School-day index of the date.
    pub day_index: usize,
    /// Teacher who is absent.
    pub absent_teacher_id: String,
    /// One row per session, by session then class.
    pub rows: Vec<SubRow>,
    /// Outcome kind.
    pub status: RecommendationStatus,
}

impl Recommendation {
    /// Whether there was nothing to cover.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows for which nobody is eligible.
    pub fn uncovered(&self) -> impl Iterator<Item = &SubRow> + '_ {
        self.rows.iter().filter(|r| r.selected.is_none())
    }

    /// Substitution-save request. Rows without a pick are skipped.
    pub fn to_draft(&self) -> SubstitutionDraft {
        SubstitutionDraft {
            date: self.date,
            rows: self.rows.iter().filter_map(SubRow::to_row).collect(),
        }
    }
}

/// Recommender settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendConfig {
    /// Teachers at or above this weekly load are never offered.
    pub max_weekly_load: usize,
    /// Offer only teachers who teach the session's subject.
    #[serde(default)]
    pub same_subject_only: bool,
}

impl RecommendConfig {
    /// Restricts candidates to teachers of the session's subject.
    pub fn with_same_subject_only(mut self) -> Self {
        self.same_subject_only = true;
        self
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_weekly_load: DEFAULT_MAX_WEEKLY_LOAD,
            same_subject_only: false,
        }
    }
}

/// Recommends substitutes for an absent teacher.
///
/// # Example
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_timetable::models::{NamedRef, SavedItem, SavedSchedule, Teacher};
/// use u_timetable::substitution::SubstitutionRecommender;
///
/// let t = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
/// let schedule = SavedSchedule::new("S1", "C1").with_item(SavedItem {
///     day_index: 2,
///     session: 1,
///     start: t,
///     end: t + chrono::Duration::minutes(45),
///     subject: NamedRef::new("MATH", "Math"),
///     teacher: NamedRef::new("T1", "Huda"),
/// });
/// let teachers = vec![Teacher::new("T1", "Huda"), Teacher::new("T2", "Amal")];
///
/// // 2024-09-03 is a Tuesday (day 2)
/// let date = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
/// let rec = SubstitutionRecommender::new()
///     .recommend("T1", date, &[schedule], &teachers, &[])
///     .unwrap();
///
/// assert_eq!(rec.rows.len(), 1);
/// assert_eq!(rec.rows[0].selected.as_deref(), Some("T2"));
/// ```
#[derive(Debug, Clone)]
pub struct SubstitutionRecommender {
    config: RecommendConfig,
    engine: RuleEngine,
}

impl SubstitutionRecommender {
    /// Creates a recommender with the default load ceiling and ordering.
    pub fn new() -> Self {
        Self {
            config: RecommendConfig::default(),
            engine: RuleEngine::load_balancing(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: RecommendConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the candidate ordering.
    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Recommends substitutes for every session `absent_teacher_id` teaches
    /// on the weekday of `date`.
    ///
    /// `schedules` are all persisted schedules across classes, `teachers`
    /// the staff list, `substitutions` the persisted substitution records
    /// (only those in the week of `date` count).
    ///
    /// # Errors
    /// [`TimetableError::NotASchoolDay`] for Friday and Saturday dates.
    pub fn recommend(
        &self,
        absent_teacher_id: &str,
        date: NaiveDate,
        schedules: &[SavedSchedule],
        teachers: &[Teacher],
        substitutions: &[Substitution],
    ) -> Result<Recommendation, TimetableError> {
        let day_index = day_index_for(date);
        if !is_school_day(day_index) {
            return Err(TimetableError::NotASchoolDay { date, day_index });
        }

        let mut due: Vec<(&str, &SavedItem)> = schedules
            .iter()
            .flat_map(|s| {
                s.items_for_teacher_on(absent_teacher_id, day_index)
                    .into_iter()
                    .map(move |item| (s.class_id.as_str(), item))
            })
            .collect();
        due.sort_by(|a, b| a.1.session.cmp(&b.1.session).then_with(|| a.0.cmp(b.0)));

        if due.is_empty() {
            info!("Teacher '{absent_teacher_id}' has no sessions on {date} (day {day_index})");
            return Ok(Recommendation {
                date,
                day_index,
                absent_teacher_id: absent_teacher_id.to_string(),
                rows: Vec::new(),
                status: RecommendationStatus::NoScheduledSessions,
            });
        }

        let busy = BusyIndex::from_schedules(schedules);
        let loads = TeacherLoads::from_schedules(schedules);
        let ledger = SubstitutionLedger::for_week_of(substitutions, date);

        let rows: Vec<SubRow> = due
            .into_iter()
            .map(|(class_id, item)| {
                let candidates: Vec<Candidate> = teachers
                    .iter()
                    .filter(|t| t.id != absent_teacher_id)
                    .filter(|t| !busy.is_busy(day_index, item.session, &t.id))
                    .filter(|t| !ledger.is_booked(date, item.session, &t.id))
                    .filter(|t| !self.config.same_subject_only || t.teaches(&item.subject.id))
                    .map(|t| {
                        Candidate::new(&t.id, &t.name, loads.get(&t.id), ledger.count(&t.id))
                            .with_familiarity(t.teaches(&item.subject.id), t.knows_class(class_id))
                    })
                    .filter(|c| c.weekly_load < self.config.max_weekly_load)
                    .collect();
                let candidates = self.engine.sort(candidates);

                if candidates.is_empty() {
                    warn!(
                        "No substitute available for class '{class_id}' session {} on {date}",
                        item.session
                    );
                } else {
                    debug!(
                        "Class '{class_id}' session {}: {} candidates, best '{}'",
                        item.session,
                        candidates.len(),
                        candidates[0].teacher_id
                    );
                }

                SubRow {
                    day_index,
                    session: item.session,
                    start: item.start,
                    end: item.end,
                    class_id: class_id.to_string(),
                    subject_id: Some(item.subject.id.clone()),
                    absent_teacher_id: absent_teacher_id.to_string(),
                    selected: candidates.first().map(|c| c.teacher_id.clone()),
                    candidates,
                }
            })
            .collect();

        info!(
            "Recommended cover for {} sessions of '{absent_teacher_id}' on {date}",
            rows.len()
        );

        Ok(Recommendation {
            date,
            day_index,
            absent_teacher_id: absent_teacher_id.to_string(),
            rows,
            status: RecommendationStatus::Ready,
        })
    }
}

impl Default for SubstitutionRecommender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamedRef;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-09-01 is a Sunday; 09-03 is day 2.
    fn tuesday() -> NaiveDate {
        date(2024, 9, 3)
    }

    fn item(day: usize, session: usize, subject: &str, teacher: &str) -> SavedItem {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap() + Duration::minutes(45 * (session as i64 - 1));
        SavedItem {
            day_index: day,
            session,
            start,
            end: start + Duration::minutes(45),
            subject: NamedRef::new(subject, subject),
            teacher: NamedRef::new(teacher, teacher),
        }
    }

    fn teachers() -> Vec<Teacher> {
        vec![
            Teacher::new("T1", "Absent"),
            Teacher::new("T2", "Badr"),
            Teacher::new("T3", "Dana"),
            Teacher::new("T4", "Cyrus"),
        ]
    }

    /// T1 teaches C1 at day 2 sessions 1 and 4. T2 is busy at session 1,
    /// T3 at session 4. Loads: T1 3, T2 2, T3 1, T4 3.
    fn schedules() -> Vec<SavedSchedule> {
        vec![
            SavedSchedule::new("S1", "C1")
                .with_item(item(2, 4, "MATH", "T1"))
                .with_item(item(2, 1, "MATH", "T1"))
                .with_item(item(2, 2, "SCI", "T2"))
                .with_item(item(3, 1, "MATH", "T1")),
            SavedSchedule::new("S2", "C2")
                .with_item(item(2, 1, "ENG", "T2"))
                .with_item(item(2, 4, "ART", "T3"))
                .with_item(item(0, 1, "PE", "T4"))
                .with_item(item(0, 2, "PE", "T4"))
                .with_item(item(1, 1, "PE", "T4")),
        ]
    }

    fn candidate_ids(row: &SubRow) -> Vec<&str> {
        row.candidates.iter().map(|c| c.teacher_id.as_str()).collect()
    }

    #[test]
    fn test_two_sessions_ranked() {
        let rec = SubstitutionRecommender::new()
            .recommend("T1", tuesday(), &schedules(), &teachers(), &[])
            .unwrap();

        assert_eq!(rec.status, RecommendationStatus::Ready);
        assert_eq!(rec.day_index, 2);
        assert_eq!(rec.rows.len(), 2);

        let first = &rec.rows[0];
        assert_eq!(first.session, 1);
        assert_eq!(first.class_id, "C1");
        assert_eq!(first.subject_id.as_deref(), Some("MATH"));
        assert_eq!(candidate_ids(first), ["T3", "T4"]);
        assert_eq!(first.selected.as_deref(), Some("T3"));

        let second = &rec.rows[1];
        assert_eq!(second.session, 4);
        assert_eq!(candidate_ids(second), ["T2", "T4"]);
        assert_eq!(second.candidates[0].weekly_load, 2);
    }

    #[test]
    fn test_substitution_count_breaks_load_tie() {
        // T3 busy at 1 via a second schedule, leaving T4 (3) and a new T5 (3)
        let mut all = schedules();
        all.push(
            SavedSchedule::new("S3", "C3")
                .with_item(item(2, 1, "ART", "T3"))
                .with_item(item(0, 1, "PE", "T5"))
                .with_item(item(0, 2, "PE", "T5"))
                .with_item(item(0, 3, "PE", "T5")),
        );
        let mut staff = teachers();
        staff.push(Teacher::new("T5", "Aziz"));
        let subs = vec![Substitution {
            date: date(2024, 9, 2),
            day_index: 1,
            session: 3,
            start: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
            class_id: "C9".into(),
            subject_id: None,
            absent_teacher_id: "T9".into(),
            replacement_teacher_id: "T5".into(),
        }];

        let rec = SubstitutionRecommender::new()
            .recommend("T1", tuesday(), &all, &staff, &subs)
            .unwrap();
        let first = &rec.rows[0];
        // equal load 3; T5 has one substitution this week, so T4 goes first
        assert_eq!(candidate_ids(first), ["T4", "T5"]);
        assert_eq!(first.candidates[1].substitutions, 1);
    }

    #[test]
    fn test_name_breaks_full_tie() {
        let staff = vec![
            Teacher::new("T1", "Absent"),
            Teacher::new("T7", "Zaid"),
            Teacher::new("T8", "Amal"),
        ];
        let rec = SubstitutionRecommender::new()
            .recommend("T1", tuesday(), &schedules(), &staff, &[])
            .unwrap();
        assert_eq!(candidate_ids(&rec.rows[0]), ["T8", "T7"]);
    }

    #[test]
    fn test_load_ceiling_is_strict() {
        let rec = SubstitutionRecommender::new()
            .with_config(RecommendConfig {
                max_weekly_load: 3,
                ..RecommendConfig::default()
            })
            .recommend("T1", tuesday(), &schedules(), &teachers(), &[])
            .unwrap();
        // T4 has exactly 3 sessions and is dropped
        assert_eq!(candidate_ids(&rec.rows[0]), ["T3"]);
        assert_eq!(candidate_ids(&rec.rows[1]), ["T2"]);
    }

    #[test]
    fn test_booked_replacement_excluded() {
        let subs = vec![Substitution {
            date: tuesday(),
            day_index: 2,
            session: 1,
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
            class_id: "C5".into(),
            subject_id: Some("ART".into()),
            absent_teacher_id: "T6".into(),
            replacement_teacher_id: "T3".into(),
        }];
        let rec = SubstitutionRecommender::new()
            .recommend("T1", tuesday(), &schedules(), &teachers(), &subs)
            .unwrap();
        assert_eq!(candidate_ids(&rec.rows[0]), ["T4"]);
        // T3 is busy at session 4 anyway
        assert_eq!(candidate_ids(&rec.rows[1]), ["T2", "T4"]);
    }

    #[test]
    fn test_no_sessions_that_day() {
        // Monday: T1 teaches nothing
        let rec = SubstitutionRecommender::new()
            .recommend("T1", date(2024, 9, 2), &schedules(), &teachers(), &[])
            .unwrap();
        assert_eq!(rec.status, RecommendationStatus::NoScheduledSessions);
        assert!(rec.is_empty());
        assert!(rec.to_draft().rows.is_empty());
    }

    #[test]
    fn test_weekend_rejected() {
        let err = SubstitutionRecommender::new()
            .recommend("T1", date(2024, 9, 6), &schedules(), &teachers(), &[])
            .unwrap_err();
        assert_eq!(
            err,
            TimetableError::NotASchoolDay {
                date: date(2024, 9, 6),
                day_index: 5
            }
        );
    }

    #[test]
    fn test_override_and_draft() {
        let mut rec = SubstitutionRecommender::new()
            .recommend("T1", tuesday(), &schedules(), &teachers(), &[])
            .unwrap();

        assert!(rec.rows[0].choose("T4"));
        assert!(!rec.rows[0].choose("T2")); // busy, not a candidate
        assert_eq!(rec.rows[0].selected.as_deref(), Some("T4"));

        let draft = rec.to_draft();
        assert_eq!(draft.date, tuesday());
        assert_eq!(draft.rows.len(), 2);
        assert_eq!(draft.rows[0].replacement_id, "T4");
        assert_eq!(draft.rows[1].replacement_id, "T2");
        assert_eq!(draft.rows[1].absent_teacher_id, "T1");
    }

    #[test]
    fn test_uncovered_rows_skipped_in_draft() {
        let staff = vec![Teacher::new("T1", "Absent"), Teacher::new("T3", "Dana")];
        let rec = SubstitutionRecommender::new()
            .recommend("T1", tuesday(), &schedules(), &staff, &[])
            .unwrap();
        // T3 is busy at session 4
        assert_eq!(rec.uncovered().count(), 1);
        let draft = rec.to_draft();
        assert_eq!(draft.rows.len(), 1);
        assert_eq!(draft.rows[0].session, 1);
    }

    #[test]
    fn test_custom_engine() {
        use crate::ranking::{rules, TieBreaker};

        // ignore load: only substitutions, then name
        let engine = RuleEngine::new()
            .with_rule(rules::FewestSubstitutions)
            .with_final_tie_breaker(TieBreaker::ByName);
        let rec = SubstitutionRecommender::new()
            .with_engine(engine)
            .recommend("T1", tuesday(), &schedules(), &teachers(), &[])
            .unwrap();
        assert_eq!(candidate_ids(&rec.rows[0]), ["T4", "T3"]);
    }

    #[test]
    fn test_familiarity_flags_and_same_subject_filter() {
        let staff = vec![
            Teacher::new("T1", "Absent"),
            Teacher::new("T3", "Dana").with_subject("MATH").with_class("C1"),
            Teacher::new("T4", "Cyrus").with_subject("PE"),
        ];

        let rec = SubstitutionRecommender::new()
            .recommend("T1", tuesday(), &schedules(), &staff, &[])
            .unwrap();
        let first = &rec.rows[0];
        assert_eq!(candidate_ids(first), ["T3", "T4"]);
        assert!(first.candidates[0].teaches_subject);
        assert!(first.candidates[0].knows_class);
        assert!(!first.candidates[1].teaches_subject);

        let rec = SubstitutionRecommender::new()
            .with_config(RecommendConfig::default().with_same_subject_only())
            .recommend("T1", tuesday(), &schedules(), &staff, &[])
            .unwrap();
        assert_eq!(candidate_ids(&rec.rows[0]), ["T3"]);
        // the only MATH teacher is busy at session 4
        assert!(rec.rows[1].candidates.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let r = SubstitutionRecommender::new();
        let a = r.recommend("T1", tuesday(), &schedules(), &teachers(), &[]).unwrap();
        let b = r.recommend("T1", tuesday(), &schedules(), &teachers(), &[]).unwrap();
        assert_eq!(a, b);
    }
}
