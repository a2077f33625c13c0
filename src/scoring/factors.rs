//! Individual compatibility factors. Every function is pure and returns
//! a 0-100 value (50 meaning "no data, neutral").

use std::collections::HashSet;

use crate::profiles::Profile;

pub const NEUTRAL: f64 = 50.0;

/// Ordinal healing-stage scale, earliest first.
const HEALING_STAGES: &[&str] = &["awakening", "healing", "integrating", "embodying"];

/// Relationship intentions considered close enough to pair up even
/// without an exact match. Order-insensitive.
const COMPATIBLE_INTENTS: &[(&str, &str)] = &[
    ("marriage-oriented", "conscious-partnership"),
    ("conscious-partnership", "spiritual-companionship"),
    ("long-term", "marriage-oriented"),
    ("long-term", "conscious-partnership"),
];

/// Mutual gender-preference check. False is the hard veto: no other
/// factor can rescue a pair that fails here.
pub fn genders_compatible(a: &Profile, b: &Profile) -> bool {
    a.accepts_gender(&b.gender) && b.accepts_gender(&a.gender)
}

pub fn age_score(a: &Profile, b: &Profile) -> f64 {
    let a_accepts = (b.age_min..=b.age_max).contains(&a.age);
    let b_accepts = (a.age_min..=a.age_max).contains(&b.age);
    if !a_accepts || !b_accepts {
        return 0.0;
    }

    match (a.age - b.age).abs() {
        0 => 100.0,
        1..=2 => 90.0,
        3..=5 => 75.0,
        6..=10 => 60.0,
        _ => 40.0,
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn distance_score(a: &Profile, b: &Profile) -> f64 {
    let (a_coords, b_coords) = (a.latitude.zip(a.longitude), b.latitude.zip(b.longitude));
    let (Some((lat1, lon1)), Some((lat2, lon2))) = (a_coords, b_coords) else {
        // Neutral only when neither side has a location.
        if a_coords.is_none() && b_coords.is_none() {
            return NEUTRAL;
        }
        return 0.0;
    };

    let km = haversine_km(lat1, lon1, lat2, lon2);
    if km > a.max_distance_km.min(b.max_distance_km) {
        return 0.0;
    }

    match km {
        km if km <= 5.0 => 100.0,
        km if km <= 15.0 => 90.0,
        km if km <= 40.0 => 75.0,
        km if km <= 80.0 => 60.0,
        _ => 40.0,
    }
}

/// Overlap ratio |A ∩ B| / max(|A|, |B|), on 0-100.
fn overlap_ratio(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let shared = a.intersection(b).count() as f64;
    100.0 * shared / a.len().max(b.len()) as f64
}

fn stage_index(stage: &str) -> Option<usize> {
    HEALING_STAGES.iter().position(|s| *s == stage)
}

/// Belief and practice alignment, averaged over whichever components both
/// profiles actually filled in; healing-stage distance decays linearly
/// across the four-point scale.
pub fn belief_practice_score(a: &Profile, b: &Profile) -> f64 {
    let mut components = Vec::new();

    if !a.beliefs.is_empty() && !b.beliefs.is_empty() {
        components.push(overlap_ratio(&a.beliefs, &b.beliefs));
    }
    if !a.practices.is_empty() && !b.practices.is_empty() {
        components.push(overlap_ratio(&a.practices, &b.practices));
    }
    if let (Some(sa), Some(sb)) = (
        a.healing_stage.as_deref().and_then(stage_index),
        b.healing_stage.as_deref().and_then(stage_index),
    ) {
        let diff = sa.abs_diff(sb) as f64;
        components.push(100.0 - diff * (100.0 / (HEALING_STAGES.len() - 1) as f64));
    }

    if components.is_empty() {
        return NEUTRAL;
    }
    components.iter().sum::<f64>() / components.len() as f64
}

pub fn lifestyle_score(a: &Profile, b: &Profile) -> f64 {
    let base = if !a.lifestyle.is_empty() && !b.lifestyle.is_empty() {
        let shared = a.lifestyle.intersection(&b.lifestyle).count() as f64;
        let union = a.lifestyle.union(&b.lifestyle).count() as f64;
        100.0 * shared / union
    } else {
        NEUTRAL
    };

    let bonus = match (&a.activity_level, &b.activity_level) {
        (Some(x), Some(y)) if x == y => 10.0,
        _ => 0.0,
    };

    (base + bonus).min(100.0)
}

fn intents_pair_up(a: &str, b: &str) -> bool {
    COMPATIBLE_INTENTS
        .iter()
        .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

pub fn intent_score(a: &Profile, b: &Profile) -> f64 {
    let (Some(ia), Some(ib)) = (a.intention.as_deref(), b.intention.as_deref()) else {
        return NEUTRAL;
    };

    if ia == ib {
        100.0
    } else if intents_pair_up(ia, ib) {
        75.0
    } else if !a.intent_badges.is_disjoint(&b.intent_badges) {
        80.0
    } else {
        40.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_paris_london() {
        let km = haversine_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((km - 344.0).abs() < 5.0, "got {km}");
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_km(10.0, 20.0, 10.0, 20.0) < 1e-9);
    }

    #[test]
    fn intent_pairs_are_order_insensitive() {
        assert!(intents_pair_up("marriage-oriented", "conscious-partnership"));
        assert!(intents_pair_up("conscious-partnership", "marriage-oriented"));
        assert!(!intents_pair_up("marriage-oriented", "casual"));
    }

    #[test]
    fn overlap_uses_larger_set() {
        let a: HashSet<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["x", "y", "z", "w"].iter().map(|s| s.to_string()).collect();
        assert_eq!(overlap_ratio(&a, &b), 50.0);
    }
}
