use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One post or comment, reduced to when it happened and what it earned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub karma: i64,
}

/// Sentinel for `oldest_activity_timestamp` when the archive has no record.
pub const UNKNOWN_TIMESTAMP: f64 = -1.0;

/// Immutable snapshot of one account, shared read-only by every signal
/// component. `events` and `comments` are ordered newest-first; that ordering
/// is a fetcher contract and is not re-verified here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub name: String,
    /// Account creation time, seconds since the Unix epoch.
    pub created_at: f64,
    pub comment_karma: i64,
    pub link_karma: i64,
    pub verified_email: bool,
    pub trophy_count: u32,
    pub profile_picture_url: String,
    /// Up to the 900 most recent posts/comments, newest-first.
    pub events: Vec<ActivityEvent>,
    /// First recorded activity per the archive, or [`UNKNOWN_TIMESTAMP`].
    pub oldest_activity_timestamp: f64,
    /// Up to the 500 most recent comment bodies, newest-first.
    pub comments: Vec<String>,
    /// Lowercase names of every community the account was active in.
    pub subreddits: HashSet<String>,
}

/// The position-sensitive feature schema the classifier artifact was trained
/// against. Reordering this array breaks every persisted model and dataset.
pub const FEATURE_ORDER: [&str; 14] = [
    "karma_ratio",
    "active_karma_rate",
    "age_days",
    "biggest_timestamp_gap",
    "burst_activity_ratio",
    "first_activity_delay_days",
    "short_comment_ratio",
    "avg_comment_similarity",
    "verified_email",
    "trophy_count",
    "name_pattern",
    "icon_default",
    "popular_subreddits_ratio",
    "scammy_subreddits_ratio",
];

pub const FEATURE_COUNT: usize = FEATURE_ORDER.len();

/// The canonical numeric vector: always exactly [`FEATURE_COUNT`] values,
/// always in [`FEATURE_ORDER`], booleans coerced to 0/1, never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_ORDER
            .iter()
            .position(|&f| f == name)
            .map(|i| self.values[i])
    }
}

/// One rule's verdict on one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub rule_name: String,
    pub is_suspicious: bool,
    /// Clamped to [0, 1].
    pub confidence_score: f64,
    pub details: Vec<String>,
}

/// A near-duplicate of one of the account's comments found elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopiedComment {
    /// The account's own comment that was matched.
    pub comment: String,
    /// Who posted the near-identical text.
    pub copy_author: String,
    pub subreddit: String,
    pub permalink: String,
    /// Fuzzy similarity ratio, 0-100.
    pub ratio: u32,
}

/// Outcome of the cross-platform duplication scan. Empty when the scan was
/// skipped or every lookup degraded to "no match".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicationReport {
    pub copies: Vec<CopiedComment>,
}

impl DuplicationReport {
    /// Number of distinct account comments with at least one copy found.
    pub fn copied_comment_count(&self) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for copy in &self.copies {
            if !seen.contains(&copy.comment.as_str()) {
                seen.push(&copy.comment);
            }
        }
        seen.len()
    }
}

/// Shared contract for the two verdict engines: consume an immutable account
/// snapshot (plus its derived vector and duplication evidence) and emit one
/// or more independently actionable results.
pub trait ScoringStrategy {
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        profile: &AccountProfile,
        features: &FeatureVector,
        dupes: &DuplicationReport,
    ) -> Vec<DetectionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_lookup_follows_canonical_order() {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = 0.5;
        values[13] = 0.25;
        let v = FeatureVector::new(values);
        assert_eq!(v.get("karma_ratio"), Some(0.5));
        assert_eq!(v.get("scammy_subreddits_ratio"), Some(0.25));
        assert_eq!(v.get("not_a_feature"), None);
        assert_eq!(v.as_slice().len(), 14);
    }

    #[test]
    fn duplication_report_counts_distinct_source_comments() {
        let copy = |comment: &str| CopiedComment {
            comment: comment.to_string(),
            copy_author: "someone_else".to_string(),
            subreddit: "askreddit".to_string(),
            permalink: "/r/askreddit/x".to_string(),
            ratio: 90,
        };
        let report = DuplicationReport {
            copies: vec![copy("a"), copy("a"), copy("b")],
        };
        assert_eq!(report.copied_comment_count(), 2);
    }
}
