//! Weekly session time grid.
//!
//! Turns a day configuration into start/end times for every session of
//! the school week. The result depends on the configuration only, so the
//! same config always yields the same grid and one grid can be shared by
//! every class that uses it.
//!
//! # Time Model
//! Sessions run back to back from `day_start`. A break configured
//! "after session k" pushes session k+1 back by its length. Manual times
//! replace the computation when they list exactly one entry per session.

use chrono::{Duration, NaiveTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::SCHOOL_DAYS;
use crate::validation::{validate_grid_config, ValidationError, ValidationResult};

/// Maximum number of break windows in one day.
pub const MAX_BREAKS: usize = 2;

/// A session's start and end time.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionTime {
    /// Session start (inclusive).
    pub start: NaiveTime,
    /// Session end (exclusive).
    pub end: NaiveTime,
}

impl SessionTime {
    /// Creates a new session time.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Length of the session in minutes.
    #[inline]
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether two sessions overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One cell of the weekly grid with its times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSlot {
    /// Day of the school week, 0 (Sunday) to 4 (Thursday).
    pub day_index: usize,
    /// Session number within the day, starting at 1.
    pub session_index: usize,
    /// Session start.
    pub start: NaiveTime,
    /// Session end.
    pub end: NaiveTime,
}

impl SessionSlot {
    /// The slot's time span.
    pub fn time(&self) -> SessionTime {
        SessionTime::new(self.start, self.end)
    }
}

/// A break inserted between two sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakWindow {
    /// The break starts when this session ends (1-based).
    pub after_session: usize,
    /// Break length in minutes.
    pub length_minutes: u32,
}

impl BreakWindow {
    /// Creates a break after the given session.
    pub fn new(after_session: usize, length_minutes: u32) -> Self {
        Self {
            after_session,
            length_minutes,
        }
    }
}

/// Day configuration for the time grid.
///
/// The computed timing (`day_start`, `session_length_minutes`, `breaks`)
/// is always present. `manual_times` overrides it only when it has exactly
/// one entry per session; otherwise it is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Sessions taught each day.
    pub sessions_per_day: usize,
    /// Start of the first session.
    pub day_start: NaiveTime,
    /// Length of every computed session.
    pub session_length_minutes: u32,
    /// Breaks between sessions.
    #[serde(default)]
    pub breaks: Vec<BreakWindow>,
    /// Explicit per-session times.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_times: Option<Vec<SessionTime>>,
}

impl GridConfig {
    /// Computed timing with no breaks.
    pub fn auto(sessions_per_day: usize, day_start: NaiveTime, session_length_minutes: u32) -> Self {
        Self {
            sessions_per_day,
            day_start,
            session_length_minutes,
            breaks: Vec::new(),
            manual_times: None,
        }
    }

    /// Adds a break.
    pub fn with_break(mut self, window: BreakWindow) -> Self {
        self.breaks.push(window);
        self
    }

    /// Sets explicit per-session times.
    pub fn with_manual_times(mut self, times: Vec<SessionTime>) -> Self {
        self.manual_times = Some(times);
        self
    }

    /// The manual times, if they cover every session.
    pub fn manual_override(&self) -> Option<&[SessionTime]> {
        self.manual_times
            .as_deref()
            .filter(|times| times.len() == self.sessions_per_day)
    }

    /// Validates this configuration.
    pub fn validate(&self) -> ValidationResult {
        validate_grid_config(self)
    }

    /// Session times for a single day.
    pub fn day_times(&self) -> Result<Vec<SessionTime>, Vec<ValidationError>> {
        self.validate()?;

        if let Some(times) = self.manual_override() {
            return Ok(times.to_vec());
        }
        if let Some(times) = &self.manual_times {
            debug!(
                "Ignoring {} manual times for {} sessions; computing instead",
                times.len(),
                self.sessions_per_day
            );
        }

        let length = Duration::minutes(i64::from(self.session_length_minutes));
        let mut cursor = self.day_start;
        let mut times = Vec::with_capacity(self.sessions_per_day);

        for session in 1..=self.sessions_per_day {
            let end = cursor + length;
            times.push(SessionTime::new(cursor, end));
            cursor = end;
            if let Some(b) = self.breaks.iter().find(|b| b.after_session == session) {
                cursor = cursor + Duration::minutes(i64::from(b.length_minutes));
            }
        }

        Ok(times)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::auto(
            7,
            NaiveTime::from_hms_opt(7, 30, 0).unwrap_or_default(),
            45,
        )
    }
}

/// Builds the weekly grid: one slot per (day, session), day-major.
///
/// # Example
/// ```
/// use chrono::NaiveTime;
/// use u_timetable::timegrid::{build_grid, BreakWindow, GridConfig};
///
/// let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
/// let config = GridConfig::auto(4, start, 45).with_break(BreakWindow::new(2, 30));
/// let slots = build_grid(&config).unwrap();
///
/// assert_eq!(slots.len(), 4 * 5);
/// // 08:00-08:45, 08:45-09:30, 30-minute break, 10:00-10:45
/// assert_eq!(slots[2].start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
/// ```
pub fn build_grid(config: &GridConfig) -> Result<Vec<SessionSlot>, Vec<ValidationError>> {
    let times = config.day_times()?;

    let slots = (0..SCHOOL_DAYS)
        .flat_map(|day| {
            times.iter().enumerate().map(move |(i, t)| SessionSlot {
                day_index: day,
                session_index: i + 1,
                start: t.start,
                end: t.end,
            })
        })
        .collect();

    Ok(slots)
}

/// Finds the slot for a (day, session) pair.
pub fn slot_at(slots: &[SessionSlot], day_index: usize, session_index: usize) -> Option<&SessionSlot> {
    slots
        .iter()
        .find(|s| s.day_index == day_index && s.session_index == session_index)
}
