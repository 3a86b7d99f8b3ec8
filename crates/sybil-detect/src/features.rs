use crate::affinity::{affinity_features, ReferenceSets};
use crate::content::content_features;
use crate::profile_checks::profile_features;
use crate::timeline::timeline_features;
use std::collections::HashMap;
use sybil_core::{AccountProfile, FeatureVector, FEATURE_COUNT, FEATURE_ORDER};

/// Runs all four signal components over one snapshot and assembles their
/// maps into the canonical vector.
pub fn assemble(profile: &AccountProfile, sets: &ReferenceSets, now: f64) -> FeatureVector {
    let mut merged: HashMap<&'static str, f64> = HashMap::new();
    merged.extend(timeline_features(profile, now));
    merged.extend(content_features(profile));
    merged.extend(affinity_features(profile, sets));
    merged.extend(profile_features(profile));
    from_map(&merged)
}

/// Orders a merged feature map into the canonical vector. Unknown keys are
/// ignored; missing keys become 0.0. Map iteration order never leaks into
/// the output.
pub fn from_map(map: &HashMap<&'static str, f64>) -> FeatureVector {
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, name) in values.iter_mut().zip(FEATURE_ORDER.iter()) {
        *slot = map.get(name).copied().unwrap_or(0.0);
    }
    FeatureVector::new(values)
}
