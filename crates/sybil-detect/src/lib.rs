pub mod affinity;
pub mod content;
pub mod features;
pub mod profile_checks;
pub mod scoring;
pub mod timeline;

pub use affinity::ReferenceSets;
pub use scoring::HeuristicScorer;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Current wall-clock time as Unix seconds. Signal math takes `now` as an
/// argument so the windowed features stay deterministic under test.
pub fn unix_now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
