//! School timetable generation for the U-Engine ecosystem.
//!
//! Builds weekly session grids, allocates subject/teacher sessions into a
//! class timetable under hard and soft constraints, and recommends
//! substitute teachers when someone is absent.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Subject`, `Teacher`, `SubjectAllocation`,
//!   `ConstraintModel`, `BusyIndex`, `Timetable`, `SavedSchedule`, `Substitution`
//! - **`timegrid`**: Session start/end times from a day configuration
//! - **`validation`**: Structured input errors, reported all at once
//! - **`scheduler`**: Two-pass greedy generator and timetable audit
//! - **`ranking`**: Composable ordering rules for substitute candidates
//! - **`substitution`**: Substitute-teacher recommendation
//!
//! # Flow
//!
//! ```text
//! allocations ──► ConstraintModel ─┐
//! saved schedules ──► BusyIndex ───┼──► ScheduleGenerator ──► Timetable ──► ScheduleDraft
//!                                  │
//! absence + date ──────────────────┴──► SubstitutionRecommender ──► SubstitutionDraft
//! ```
//!
//! Every operation is a pure function of its inputs. The busy index is an
//! immutable snapshot for the duration of a run; callers rebuild it after a
//! schedule save is confirmed.

pub mod error;
pub mod models;
pub mod ranking;
pub mod scheduler;
pub mod substitution;
pub mod timegrid;
pub mod validation;

pub use error::TimetableError;
