//! Explainable weighted-rule scoring. Each component's rule is independently
//! actionable: the four results are reported side by side, never summed into
//! one global score.

use crate::affinity::ReferenceSets;
use crate::content::short_comment_ratio;
use crate::timeline::karma_ratio;
use crate::{unix_now, SECONDS_PER_DAY};
use sybil_core::{
    AccountProfile, DetectionResult, DuplicationReport, FeatureVector, ScoringStrategy,
};

const HALF_YEAR_SECS: f64 = 183.0 * SECONDS_PER_DAY;
const NEW_ACCOUNT_SECS: f64 = 30.0 * SECONDS_PER_DAY;
const RAPID_FIRE_WINDOW_SECS: f64 = 20.0;

const RATIO_THRESHOLD: f64 = 0.95;
const RATE_THRESHOLD: f64 = 2000.0;
const RATE_MAX_SCALE: f64 = 10_000.0;
const TROPHY_THRESHOLD: u32 = 2;
const SHORT_COMMENT_DETAIL_CUTOFF: f64 = 0.2;

/// Account age, activity gaps, and karma behavior.
pub fn score_timeline(profile: &AccountProfile, now: f64) -> DetectionResult {
    let mut details = Vec::new();

    let has_half_year_gap = profile
        .events
        .windows(2)
        .any(|pair| pair[0].timestamp - pair[1].timestamp >= HALF_YEAR_SECS);
    let mut score_from_gap = 0.0;
    if has_half_year_gap {
        score_from_gap = 0.6;
        details.push("Account has a >6 month activity gap.".to_string());
    }

    let rapid_fire = rapid_fire_windows(profile);
    let mut score_from_rapid_fire = 0.0;
    if rapid_fire > 2 {
        score_from_rapid_fire = 0.3;
        details.push(format!("Has {rapid_fire} periods of rapid fire posting."));
    }

    let ratio = karma_ratio(profile.link_karma, profile.comment_karma);
    let mut score_from_ratio = 0.0;
    if ratio > RATIO_THRESHOLD {
        let scaled = (ratio - RATIO_THRESHOLD) / (1.0 - RATIO_THRESHOLD);
        score_from_ratio = scaled * 0.3;
        details.push(format!(
            "High post-to-comment karma ratio ({:.0}%).",
            ratio * 100.0
        ));
    }

    let rate = lifetime_karma_rate(profile, now);
    let mut score_from_rate = 0.0;
    if rate > RATE_THRESHOLD {
        let scaled = ((rate - RATE_THRESHOLD) / (RATE_MAX_SCALE - RATE_THRESHOLD)).min(1.0);
        score_from_rate = scaled * 0.3;
        details.push(format!("High karma rate ({rate:.0}/day)."));
    }

    // A brand-new account that already trips the karma rules is worth more
    // than either rule alone.
    let mut score_from_newness = 0.0;
    if now - profile.created_at <= NEW_ACCOUNT_SECS {
        details.push("Account is less than 1 month old.".to_string());
        if score_from_rate > 0.0 {
            score_from_newness += 0.3;
        }
        if score_from_ratio > 0.0 {
            score_from_newness += 0.3;
        }
    }

    let confidence = (score_from_gap
        + score_from_rapid_fire
        + score_from_ratio
        + score_from_rate
        + score_from_newness)
        .min(1.0);

    DetectionResult {
        rule_name: "Account Age, Activity Gaps, and Karma Behavior".to_string(),
        is_suspicious: confidence >= 0.5,
        confidence_score: confidence,
        details,
    }
}

/// Count of 3-event runs landing within a 20-second window.
fn rapid_fire_windows(profile: &AccountProfile) -> usize {
    profile
        .events
        .windows(3)
        .filter(|w| w[0].timestamp - w[2].timestamp <= RAPID_FIRE_WINDOW_SECS)
        .count()
}

/// Total karma over whole account lifetime, per day, floored at one day.
fn lifetime_karma_rate(profile: &AccountProfile, now: f64) -> f64 {
    let days_old = ((now - profile.created_at) / SECONDS_PER_DAY).floor().max(1.0);
    (profile.link_karma + profile.comment_karma) as f64 / days_old
}

/// Short or self-plagiarized comments.
pub fn score_content(profile: &AccountProfile, dupes: &DuplicationReport) -> DetectionResult {
    let mut details = Vec::new();

    let short_ratio = short_comment_ratio(&profile.comments);
    let score_from_short = short_ratio * 0.8;
    if score_from_short > SHORT_COMMENT_DETAIL_CUTOFF {
        details.push(format!(
            "About {:.0}% of comments are short.",
            short_ratio * 100.0
        ));
    }

    let copied = dupes.copied_comment_count();
    let score_from_copies = match copied {
        0 => 0.0,
        1 => 0.3,
        2 => 0.7,
        _ => 1.0,
    };
    if copied > 0 {
        details.push(format!(
            "Found {copied} comment(s) that appear to be copied from other users."
        ));
    }

    let confidence = (score_from_short + score_from_copies).min(1.0);

    DetectionResult {
        rule_name: "Short or Copied Comments".to_string(),
        is_suspicious: confidence > 0.5,
        confidence_score: confidence,
        details,
    }
}

/// Concentration of activity in karma-farm and scam-topic communities.
pub fn score_affinity(profile: &AccountProfile, sets: &ReferenceSets) -> DetectionResult {
    let features = crate::affinity::affinity_features(profile, sets);
    let popular = features["popular_subreddits_ratio"];
    let scammy = features["scammy_subreddits_ratio"];

    let mut details = Vec::new();
    if popular > 0.15 {
        details.push(format!(
            "~{:.0}% of activity is in very large, generic subreddits.",
            popular * 100.0
        ));
    }
    if scammy > 0.15 {
        details.push(format!(
            "~{:.0}% of activity is in subreddits related to spam/scam topics.",
            scammy * 100.0
        ));
    }

    let confidence = (popular * 0.7 + scammy * 1.0).min(1.0);

    DetectionResult {
        rule_name: "Subreddit Affinity".to_string(),
        is_suspicious: confidence > 0.35,
        confidence_score: confidence,
        details,
    }
}

/// Static profile attributes: verification, trophies, generated-looking name.
pub fn score_profile(profile: &AccountProfile) -> DetectionResult {
    let mut confidence: f64 = 0.0;
    let mut details = Vec::new();

    if !profile.verified_email {
        confidence += 0.4;
        details.push("Account email is not verified.".to_string());
    }
    if profile.trophy_count < TROPHY_THRESHOLD {
        confidence += 0.3;
        details.push(format!(
            "Account has fewer than {TROPHY_THRESHOLD} trophies ({}).",
            profile.trophy_count
        ));
    }
    if crate::profile_checks::matches_bot_name(&profile.name) {
        confidence += 0.3;
        details.push("Account name matches a common bot pattern.".to_string());
    }

    let confidence = confidence.min(1.0);

    DetectionResult {
        rule_name: "General Account Check".to_string(),
        is_suspicious: confidence >= 0.5,
        confidence_score: confidence,
        details,
    }
}

/// The explainable strategy: one independent verdict per component.
pub struct HeuristicScorer {
    sets: ReferenceSets,
}

impl HeuristicScorer {
    pub fn new(sets: ReferenceSets) -> Self {
        Self { sets }
    }
}

impl ScoringStrategy for HeuristicScorer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn evaluate(
        &self,
        profile: &AccountProfile,
        _features: &FeatureVector,
        dupes: &DuplicationReport,
    ) -> Vec<DetectionResult> {
        let now = unix_now();
        vec![
            score_timeline(profile, now),
            score_content(profile, dupes),
            score_affinity(profile, &self.sets),
            score_profile(profile),
        ]
    }
}
