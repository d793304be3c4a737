//! Built-in ranking rules.
//!
//! `LeastWeeklyLoad` and `FewestSubstitutions` balance work across the
//! staff. `SameSubjectFirst` and `SameClassFirst` prefer teachers who
//! already know the lesson or the students.

use super::{RankingRule, RuleScore};
use crate::substitution::Candidate;

/// Least weekly teaching load.
///
/// Scores by the number of sessions the teacher is scheduled for this week
/// across all classes.
#[derive(Debug, Clone, Copy)]
pub struct LeastWeeklyLoad;

impl RankingRule for LeastWeeklyLoad {
    fn name(&self) -> &'static str {
        "LOAD"
    }

    fn evaluate(&self, candidate: &Candidate) -> RuleScore {
        candidate.weekly_load as f64
    }

    fn description(&self) -> &'static str {
        "Least Weekly Load"
    }
}

/// Fewest substitutions covered this week.
#[derive(Debug, Clone, Copy)]
pub struct FewestSubstitutions;

impl RankingRule for FewestSubstitutions {
    fn name(&self) -> &'static str {
        "SUBS"
    }

    fn evaluate(&self, candidate: &Candidate) -> RuleScore {
        candidate.substitutions as f64
    }

    fn description(&self) -> &'static str {
        "Fewest Substitutions This Week"
    }
}

/// Teachers of the session's subject first.
#[derive(Debug, Clone, Copy)]
pub struct SameSubjectFirst;

impl RankingRule for SameSubjectFirst {
    fn name(&self) -> &'static str {
        "SUBJECT"
    }

    fn evaluate(&self, candidate: &Candidate) -> RuleScore {
        if candidate.teaches_subject {
            0.0
        } else {
            1.0
        }
    }

    fn description(&self) -> &'static str {
        "Same Subject First"
    }
}

/// Teachers attached to the session's class first.
#[derive(Debug, Clone, Copy)]
pub struct SameClassFirst;

impl RankingRule for SameClassFirst {
    fn name(&self) -> &'static str {
        "CLASS"
    }

    fn evaluate(&self, candidate: &Candidate) -> RuleScore {
        if candidate.knows_class {
            0.0
        } else {
            1.0
        }
    }
}
