//! Ordering rules and rule engine for substitute candidates.
//!
//! Each rule scores a [`Candidate`]; the engine composes rules either as a
//! tie-breaker chain or as a weighted sum and finishes with a
//! deterministic tie-break, so a fixed candidate set always comes back in
//! the same order.
//!
//! # Usage
//!
//! ```
//! use u_timetable::ranking::{rules, RuleEngine, TieBreaker};
//! use u_timetable::substitution::Candidate;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::LeastWeeklyLoad)
//!     .with_tie_breaker(rules::FewestSubstitutions)
//!     .with_final_tie_breaker(TieBreaker::ByName);
//!
//! let candidates = vec![
//!     Candidate::new("T1", "Huda", 18, 0),
//!     Candidate::new("T2", "Amal", 12, 3),
//! ];
//! assert_eq!(engine.select_best(&candidates), Some(1));
//! ```

mod engine;
pub mod rules;

pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use crate::substitution::Candidate;
use std::fmt::Debug;

/// Score returned by a ranking rule.
///
/// Lower scores rank first.
pub type RuleScore = f64;

/// A rule that scores a substitute candidate.
///
/// # Score Convention
/// **Lower score = preferred.** A rule returns smaller values for
/// candidates that should be offered first.
pub trait RankingRule: Send + Sync + Debug {
    /// Rule name (e.g., "LOAD").
    fn name(&self) -> &'static str;

    /// Scores a candidate.
    fn evaluate(&self, candidate: &Candidate) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
