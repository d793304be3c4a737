//! Timetable generation and auditing.
//!
//! `ScheduleGenerator` fills one class's weekly grid with a two-pass greedy
//! heuristic: a presence pass that spreads every subject across the week,
//! then a shuffled bag fill under staged rule relaxation. It is not
//! exhaustive; it trades optimality for bounded, predictable runtime.
//!
//! `TimetableReport` checks any grid (generated or hand-edited) against the
//! same rules and reports what is broken.

mod generator;
mod report;

pub use generator::{
    GenerationFailure, GeneratorConfig, PlacementRules, ScheduleGenerator, UnplacedSessions,
    FAILURE_REASON,
};
pub use report::TimetableReport;
