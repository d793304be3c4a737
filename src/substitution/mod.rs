//! Substitute-teacher recommendation.
//!
//! Given an absent teacher and a date, finds every session that teacher was
//! due to teach that weekday and ranks the teachers who could cover it.
//!
//! # Algorithm
//!
//! 1. Map the date to a school-day index (Sunday = 0). Friday and Saturday
//!    are rejected.
//! 2. Collect the absent teacher's cells for that day across all classes.
//! 3. For each cell, keep every other teacher who is free at that session,
//!    is not already covering another absence then, and is under the
//!    weekly load ceiling.
//! 4. Rank by weekly load, then substitutions this week, then name.
//!
//! The function only reads its inputs. Saving the chosen rows is left to
//! the caller via [`Recommendation::to_draft`].

mod recommender;

pub use recommender::{
    Candidate, RecommendConfig, Recommendation, RecommendationStatus, SubRow,
    SubstitutionRecommender, DEFAULT_MAX_WEEKLY_LOAD,
};
