//! Compatibility scoring.
//!
//! `score` is a pure function of the two profiles: no clock, no
//! randomness, no storage. Identical inputs always produce identical
//! output, which the suggestion pipeline and tests rely on.

mod factors;
pub mod labels;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::profiles::Profile;

pub use factors::haversine_km;

// Factor weights, fixed platform policy. They sum to 1.0.
const W_AGE: f64 = 0.10;
const W_GENDER: f64 = 0.15;
const W_DISTANCE: f64 = 0.15;
const W_BELIEFS: f64 = 0.30;
const W_LIFESTYLE: f64 = 0.15;
const W_INTENT: f64 = 0.15;

/// Per-factor values (0-100) behind a combined score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub age: f64,
    pub gender: f64,
    pub distance: f64,
    pub beliefs: f64,
    pub lifestyle: f64,
    pub intent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Compatibility {
    pub value: i64,
    pub labels: Vec<String>,
    pub breakdown: Breakdown,
}

/// Score a pair of profiles. `Ok(None)` is the gender-preference veto:
/// neither preference set admits the other's gender, so no match is
/// possible whatever the remaining factors say.
pub fn score(a: &Profile, b: &Profile) -> Result<Option<Compatibility>, CoreError> {
    if !a.is_scorable() {
        return Err(CoreError::IncompleteProfile(a.user_id));
    }
    if !b.is_scorable() {
        return Err(CoreError::IncompleteProfile(b.user_id));
    }

    if !factors::genders_compatible(a, b) {
        return Ok(None);
    }

    let breakdown = Breakdown {
        age: factors::age_score(a, b),
        gender: 100.0,
        distance: factors::distance_score(a, b),
        beliefs: factors::belief_practice_score(a, b),
        lifestyle: factors::lifestyle_score(a, b),
        intent: factors::intent_score(a, b),
    };

    let weighted = breakdown.age * W_AGE
        + breakdown.gender * W_GENDER
        + breakdown.distance * W_DISTANCE
        + breakdown.beliefs * W_BELIEFS
        + breakdown.lifestyle * W_LIFESTYLE
        + breakdown.intent * W_INTENT;
    let value = (weighted.round() as i64).clamp(0, 100);

    let labels = labels::derive(&breakdown, a, b);

    Ok(Some(Compatibility { value, labels, breakdown }))
}
