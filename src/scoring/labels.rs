//! Qualitative match labels, derived from the factor breakdown.
//! Rules are independent; a pair can earn any subset.

use super::Breakdown;
use crate::profiles::Profile;

pub const ALIGNED_IN_SPIRITUAL_RHYTHM: &str = "aligned-in-spiritual-rhythm";
pub const ALIGNED_IN_PURPOSE: &str = "aligned-in-purpose";
pub const SIMILAR_LIFESTYLE: &str = "similar-lifestyle";
pub const COMPATIBLE_INTENT: &str = "compatible-intent";
pub const SPIRITUAL_SYNERGY: &str = "spiritual-synergy";

pub fn derive(breakdown: &Breakdown, a: &Profile, b: &Profile) -> Vec<String> {
    let mut labels = Vec::new();

    if breakdown.beliefs >= 80.0 {
        labels.push(ALIGNED_IN_SPIRITUAL_RHYTHM.to_string());
    }
    let has_purpose = a.life_purpose.is_some() || b.life_purpose.is_some();
    if breakdown.intent >= 80.0 && has_purpose {
        labels.push(ALIGNED_IN_PURPOSE.to_string());
    }
    if breakdown.lifestyle >= 75.0 {
        labels.push(SIMILAR_LIFESTYLE.to_string());
    }
    if breakdown.intent >= 75.0 {
        labels.push(COMPATIBLE_INTENT.to_string());
    }
    if breakdown.beliefs >= 70.0 && breakdown.lifestyle >= 70.0 {
        labels.push(SPIRITUAL_SYNERGY.to_string());
    }

    labels
}
