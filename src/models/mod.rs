//! Timetable domain models.
//!
//! Provides the data types for describing a school week, the allocation
//! requirements of one class, and the persisted schedules and
//! substitutions the scheduler reads back.
//!
//! # Domain Mappings
//!
//! | u-timetable | School | Generic scheduling |
//! |-------------|--------|--------------------|
//! | Teacher | Staff member | Resource |
//! | SubjectAllocation | Weekly lesson requirement | Task demand |
//! | Timetable | One class's weekly grid | Schedule |
//! | BusyIndex | Cross-class teacher commitments | Resource calendar |
//! | Substitution | Cover for an absent teacher | Reassignment |

mod busy_index;
mod calendar;
mod constraint;
mod resource;
mod schedule;
mod substitution;

pub use busy_index::{BusyIndex, TeacherLoads};
pub use calendar::{day_index_for, is_school_day, week_start, SCHOOL_DAYS};
pub use constraint::{ConstraintModel, QuotaTracker, Remaining, SubjectAllocation};
pub use resource::{NamedRef, RepeatAllowList, Subject, Teacher};
pub use schedule::{
    Placement, SavedItem, SavedSchedule, ScheduleDraft, ScheduleItem, Timetable, Violation,
    ViolationType,
};
pub use substitution::{Substitution, SubstitutionDraft, SubstitutionLedger, SubstitutionRow};
