//! Rule engine for multi-criteria candidate ranking.
//!
//! Composes ranking rules with configurable evaluation modes and a final
//! tie-breaking strategy.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{RankingRule, RuleScore};
use crate::substitution::Candidate;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compute weighted sum of all rule scores.
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep input order (the sort is stable).
    #[default]
    NextRule,
    /// Lexicographic by name, then by teacher ID.
    ByName,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn RankingRule>,
    weight: f64,
}

/// A composable rule engine for candidate ranking.
///
/// # Example
/// ```
/// use u_timetable::ranking::{rules, EvaluationMode, RuleEngine};
/// use u_timetable::substitution::Candidate;
///
/// let engine = RuleEngine::new()
///     .with_mode(EvaluationMode::Weighted)
///     .with_weighted_rule(rules::LeastWeeklyLoad, 1.0)
///     .with_weighted_rule(rules::FewestSubstitutions, 4.0);
///
/// let candidates = vec![
///     Candidate::new("T1", "Huda", 10, 3), // 10 + 12
///     Candidate::new("T2", "Amal", 16, 0), // 16
/// ];
/// assert_eq!(engine.select_best(&candidates), Some(1));
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::NextRule,
            epsilon: 1e-9,
        }
    }

    /// The standard substitute ordering: weekly load, then substitutions
    /// this week, then name.
    pub fn load_balancing() -> Self {
        Self::new()
            .with_rule(super::rules::LeastWeeklyLoad)
            .with_tie_breaker(super::rules::FewestSubstitutions)
            .with_final_tie_breaker(TieBreaker::ByName)
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: RankingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Ranks candidates, preferred first.
    ///
    /// Returns indices into the original slice.
    pub fn sort_indices(&self, candidates: &[Candidate]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..candidates.len()).collect();

        match &self.mode {
            EvaluationMode::Sequential => {
                indices.sort_by(|&a, &b| self.compare_sequential(&candidates[a], &candidates[b]));
            }
            EvaluationMode::Weighted => {
                let scores: Vec<f64> = candidates.iter().map(|c| self.weighted_score(c)).collect();
                indices.sort_by(|&a, &b| {
                    if (scores[a] - scores[b]).abs() > self.epsilon {
                        scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal)
                    } else {
                        self.break_tie(&candidates[a], &candidates[b])
                    }
                });
            }
        }

        indices
    }

    /// Ranks candidates in place, preferred first.
    pub fn sort(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let order = self.sort_indices(&candidates);
        let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }

    /// Returns the index of the preferred candidate.
    pub fn select_best(&self, candidates: &[Candidate]) -> Option<usize> {
        self.sort_indices(candidates).first().copied()
    }

    /// Evaluates a single candidate and returns weighted scores from each rule.
    pub fn evaluate(&self, candidate: &Candidate) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(candidate) * wr.weight)
            .collect()
    }

    fn compare_sequential(&self, a: &Candidate, b: &Candidate) -> Ordering {
        for wr in &self.rules {
            let score_a = wr.rule.evaluate(a);
            let score_b = wr.rule.evaluate(b);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        self.break_tie(a, b)
    }

    fn break_tie(&self, a: &Candidate, b: &Candidate) -> Ordering {
        match &self.tie_breaker {
            TieBreaker::NextRule => Ordering::Equal,
            TieBreaker::ByName => a
                .name
                .cmp(&b.name)
                .then_with(|| a.teacher_id.cmp(&b.teacher_id)),
        }
    }

    fn weighted_score(&self, candidate: &Candidate) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(candidate) * wr.weight)
            .sum()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
