//! Two-pass greedy timetable generator.
//!
//! # Algorithm
//!
//! 1. **Presence pass.** For each day, for each subject with quota left
//!    (in allocation order), place one session in the first cell that
//!    passes every rule. Spreads each subject across the week before any
//!    subject doubles up.
//! 2. **Bag fill.** Every unplaced session goes into a bag of
//!    (subject, teacher) pairs, shuffled with Fisher-Yates. Empty cells are
//!    visited day by day, session by session; for each, the bag is searched
//!    in order under progressively relaxed rule sets:
//!    strict → allow a second session the same day → also allow the same
//!    subject in adjacent cells.
//!
//! Teacher availability (busy index) and the consecutive-session cap are
//! never relaxed. If the bag is not empty after the fill, generation
//! fails; a partial grid is never returned.
//!
//! A single class grid holds one placement per cell, so a teacher can
//! never be double-booked within the class itself; only the cross-class
//! busy index needs checking.
//!
//! # Complexity
//! O(d * n * b) per pass where d = days, n = sessions per day, b = bag size.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{BusyIndex, ConstraintModel, Placement, QuotaTracker, Timetable, SCHOOL_DAYS};

/// Hint reported when generation fails.
pub const FAILURE_REASON: &str =
    "teacher conflicts, consecutive-session limits, or duplicate prevention";

/// Soft rules active during one placement stage.
///
/// Hard rules (empty cell, teacher availability, consecutive cap) are
/// always checked and have no switch here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRules {
    /// Reject a second session of a non-exempt subject on the same day.
    pub no_duplicate_in_day: bool,
    /// Reject the same subject in an adjacent cell.
    pub no_immediate_repeat: bool,
}

impl PlacementRules {
    /// Every rule enforced.
    pub const STRICT: Self = Self {
        no_duplicate_in_day: true,
        no_immediate_repeat: true,
    };

    /// Same-day duplicates allowed.
    pub const ALLOW_DUPLICATE: Self = Self {
        no_duplicate_in_day: false,
        no_immediate_repeat: true,
    };

    /// Same-day duplicates and adjacent repeats allowed.
    pub const ALLOW_DUPLICATE_AND_REPEAT: Self = Self {
        no_duplicate_in_day: false,
        no_immediate_repeat: false,
    };
}

/// Bag-fill stages, most to least strict.
const BAG_STAGES: [PlacementRules; 3] = [
    PlacementRules::STRICT,
    PlacementRules::ALLOW_DUPLICATE,
    PlacementRules::ALLOW_DUPLICATE_AND_REPEAT,
];

/// Sessions of one subject left unplaced by a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedSessions {
    /// Subject.
    pub subject_id: String,
    /// Its teacher.
    pub teacher_id: String,
    /// Sessions that found no cell.
    pub count: usize,
}

/// The constraints could not all be met.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{remaining_count} sessions could not be placed due to {reason}")]
pub struct GenerationFailure {
    /// Total sessions left in the bag.
    pub remaining_count: usize,
    /// Breakdown by subject, sorted by subject ID.
    pub unplaced: Vec<UnplacedSessions>,
    /// Human-readable hint.
    pub reason: String,
}

impl GenerationFailure {
    fn from_bag(bag: &[Placement]) -> Self {
        let mut grouped: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for p in bag {
            *grouped
                .entry((p.subject_id.as_str(), p.teacher_id.as_str()))
                .or_insert(0) += 1;
        }

        Self {
            remaining_count: bag.len(),
            unplaced: grouped
                .into_iter()
                .map(|((subject, teacher), count)| UnplacedSessions {
                    subject_id: subject.to_string(),
                    teacher_id: teacher.to_string(),
                    count,
                })
                .collect(),
            reason: FAILURE_REASON.to_string(),
        }
    }
}

/// Generator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Seed for the bag shuffle. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Timetable generator.
///
/// Stateless between runs: every call works on its own copy of the
/// quotas and grid.
///
/// # Example
///
/// ```
/// use u_timetable::models::{BusyIndex, ConstraintModel, SubjectAllocation};
/// use u_timetable::scheduler::ScheduleGenerator;
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
/// let timetable = ScheduleGenerator::new()
///     .with_seed(7)
///     .generate(&model, &BusyIndex::new())
///     .unwrap();
///
/// assert!(timetable.is_complete());
/// assert_eq!(timetable.subject_count("MATH"), 15);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    config: GeneratorConfig,
}

impl ScheduleGenerator {
    /// Creates an unseeded generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator from settings.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Fixes the shuffle seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Generates a timetable for one class.
    ///
    /// `busy` is read as a snapshot; it is not re-read during the run.
    pub fn generate(
        &self,
        model: &ConstraintModel,
        busy: &BusyIndex,
    ) -> Result<Timetable, GenerationFailure> {
        match self.config.seed {
            Some(seed) => self.generate_with_rng(model, busy, &mut SmallRng::seed_from_u64(seed)),
            None => self.generate_with_rng(model, busy, &mut SmallRng::from_os_rng()),
        }
    }

    /// Generates a timetable using the caller's random source.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        model: &ConstraintModel,
        busy: &BusyIndex,
        rng: &mut R,
    ) -> Result<Timetable, GenerationFailure> {
        info!(
            "Generating timetable: {} subjects, {} sessions/day, max {} consecutive",
            model.allocations().len(),
            model.sessions_per_day(),
            model.max_consecutive()
        );

        let mut board = Board::new(model, busy);
        let mut quotas = model.quotas();

        board.presence_pass(&mut quotas);
        debug!(
            "Presence pass placed {} sessions, {} left for bag fill",
            board.filled(),
            quotas.total_left()
        );

        let mut bag = remainder_bag(model, &quotas);
        bag.shuffle(rng);
        board.bag_fill(&mut bag);

        if bag.is_empty() {
            info!("Timetable complete: {} sessions placed", board.filled());
            Ok(board.into_timetable())
        } else {
            let failure = GenerationFailure::from_bag(&bag);
            warn!("Timetable generation failed: {failure}");
            Err(failure)
        }
    }
}

/// Unplaced sessions in allocation order, one entry per session.
fn remainder_bag(model: &ConstraintModel, quotas: &QuotaTracker) -> Vec<Placement> {
    model
        .allocations()
        .iter()
        .flat_map(|a| {
            let left = quotas.left(&a.subject_id);
            std::iter::repeat_with(|| Placement::new(a.subject_id.clone(), a.teacher_id.clone()))
                .take(left)
        })
        .collect()
}

/// In-progress grid for one run. Indices here are 0-based offsets;
/// the busy index uses 1-based session numbers.
struct Board<'a> {
    model: &'a ConstraintModel,
    busy: &'a BusyIndex,
    days: Vec<Vec<Option<Placement>>>,
}

impl<'a> Board<'a> {
    fn new(model: &'a ConstraintModel, busy: &'a BusyIndex) -> Self {
        Self {
            model,
            busy,
            days: vec![vec![None; model.sessions_per_day()]; SCHOOL_DAYS],
        }
    }

    fn filled(&self) -> usize {
        self.days.iter().flatten().filter(|c| c.is_some()).count()
    }

    fn into_timetable(self) -> Timetable {
        Timetable::from_days(self.days)
    }

    fn place(&mut self, day: usize, offset: usize, placement: Placement) {
        self.days[day][offset] = Some(placement);
    }

    /// Whether `placement` may go into (day, offset) under `rules`.
    fn admits(&self, day: usize, offset: usize, placement: &Placement, rules: PlacementRules) -> bool {
        let row = &self.days[day];
        if row[offset].is_some() {
            return false;
        }
        if self.busy.is_busy(day, offset + 1, &placement.teacher_id) {
            return false;
        }
        if run_with(row, offset, &placement.teacher_id) > self.model.max_consecutive() {
            return false;
        }
        if rules.no_duplicate_in_day
            && !self.model.allows_multiple_per_day(&placement.subject_id)
            && row
                .iter()
                .flatten()
                .any(|p| p.subject_id == placement.subject_id)
        {
            return false;
        }
        if rules.no_immediate_repeat && neighbour_holds(row, offset, &placement.subject_id) {
            return false;
        }
        true
    }

    fn presence_pass(&mut self, quotas: &mut QuotaTracker) {
        let model = self.model;
        let sessions = model.sessions_per_day();

        for day in 0..SCHOOL_DAYS {
            for alloc in model.allocations() {
                if quotas.left(&alloc.subject_id) == 0 {
                    continue;
                }
                let placement = Placement::new(alloc.subject_id.clone(), alloc.teacher_id.clone());
                match (0..sessions).find(|&o| self.admits(day, o, &placement, PlacementRules::STRICT)) {
                    Some(offset) => {
                        self.place(day, offset, placement);
                        quotas.take(&alloc.subject_id);
                    }
                    None => debug!(
                        "Day {day}: no cell for '{}' in presence pass",
                        alloc.subject_id
                    ),
                }
            }
        }
    }

    fn bag_fill(&mut self, bag: &mut Vec<Placement>) {
        let sessions = self.model.sessions_per_day();

        for day in 0..SCHOOL_DAYS {
            for offset in 0..sessions {
                if bag.is_empty() {
                    return;
                }
                if self.days[day][offset].is_some() {
                    continue;
                }

                for (stage, rules) in BAG_STAGES.iter().enumerate() {
                    if let Some(pos) = bag.iter().position(|p| self.admits(day, offset, p, *rules)) {
                        let placement = bag.remove(pos);
                        if stage > 0 {
                            debug!(
                                "Day {day} session {}: placed '{}' at relaxation stage {stage}",
                                offset + 1,
                                placement.subject_id
                            );
                        }
                        self.place(day, offset, placement);
                        break;
                    }
                }
            }
        }
    }
}

/// Length of the teacher's back-to-back run if they took `offset`.
fn run_with(row: &[Option<Placement>], offset: usize, teacher_id: &str) -> usize {
    let teaches = |cell: &Option<Placement>| cell.as_ref().is_some_and(|p| p.teacher_id == teacher_id);
    let before = row[..offset].iter().rev().take_while(|&c| teaches(c)).count();
    let after = row[offset + 1..].iter().take_while(|&c| teaches(c)).count();
    before + 1 + after
}

fn neighbour_holds(row: &[Option<Placement>], offset: usize, subject_id: &str) -> bool {
    let holds = |i: usize| {
        row.get(i)
            .and_then(Option::as_ref)
            .is_some_and(|p| p.subject_id == subject_id)
    };
    (offset > 0 && holds(offset - 1)) || holds(offset + 1)
}
