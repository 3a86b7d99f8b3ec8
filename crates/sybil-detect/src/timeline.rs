use crate::SECONDS_PER_DAY;
use std::collections::HashMap;
use sybil_core::{AccountProfile, UNKNOWN_TIMESTAMP};

/// Recent-activity window for the karma rate. 30 days, not the 35-day
/// variant an earlier revision of this rule used.
pub const ACTIVE_WINDOW_SECS: f64 = 30.0 * SECONDS_PER_DAY;

/// Two events closer together than this count as one burst pair.
pub const BURST_GAP_SECS: f64 = 65.0;

/// Karma/time-series features from an ordered (newest-first) activity
/// history. Degenerate histories resolve to 0.0, never to an error.
pub fn timeline_features(profile: &AccountProfile, now: f64) -> HashMap<&'static str, f64> {
    HashMap::from([
        ("karma_ratio", karma_ratio(profile.link_karma, profile.comment_karma)),
        ("active_karma_rate", active_karma_rate(profile, now)),
        ("age_days", (now - profile.created_at) / SECONDS_PER_DAY),
        ("biggest_timestamp_gap", biggest_timestamp_gap(profile)),
        ("burst_activity_ratio", burst_activity_ratio(profile)),
        ("first_activity_delay_days", first_activity_delay_days(profile)),
    ])
}

/// Share of total karma that came from posts rather than comments.
pub fn karma_ratio(link_karma: i64, comment_karma: i64) -> f64 {
    let total = link_karma + comment_karma;
    if total == 0 {
        return 0.0;
    }
    link_karma as f64 / total as f64
}

/// Average karma per day over the account's most recent active window: the
/// span from `now` back to the oldest event still inside the last 30 days.
/// Events are newest-first, so the scan stops at the first one outside the
/// window.
fn active_karma_rate(profile: &AccountProfile, now: f64) -> f64 {
    let window_start = now - ACTIVE_WINDOW_SECS;
    let mut total_recent_karma = 0.0;
    let mut oldest_recent: Option<f64> = None;

    for event in &profile.events {
        if event.timestamp < window_start {
            break;
        }
        total_recent_karma += event.karma as f64;
        oldest_recent = Some(event.timestamp);
    }

    let Some(oldest) = oldest_recent else {
        return 0.0;
    };
    let active_days = ((now - oldest) / SECONDS_PER_DAY).max(1.0);
    total_recent_karma / active_days
}

/// Longest stretch of inactivity between consecutive recorded events.
fn biggest_timestamp_gap(profile: &AccountProfile) -> f64 {
    profile
        .events
        .windows(2)
        .map(|pair| pair[0].timestamp - pair[1].timestamp)
        .fold(0.0, f64::max)
}

/// Fraction of consecutive event pairs landing within [`BURST_GAP_SECS`].
fn burst_activity_ratio(profile: &AccountProfile) -> f64 {
    let n = profile.events.len();
    if n < 2 {
        return 0.0;
    }
    let bursts = profile
        .events
        .windows(2)
        .filter(|pair| pair[0].timestamp - pair[1].timestamp <= BURST_GAP_SECS)
        .count();
    bursts as f64 / (n - 1) as f64
}

/// Days between account creation and its first recorded activity. 0 when the
/// archive had no record, or when the archive's record predates creation.
fn first_activity_delay_days(profile: &AccountProfile) -> f64 {
    if profile.oldest_activity_timestamp == UNKNOWN_TIMESTAMP {
        return 0.0;
    }
    ((profile.oldest_activity_timestamp - profile.created_at) / SECONDS_PER_DAY).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use sybil_core::ActivityEvent;

    const NOW: f64 = 1_700_000_000.0;

    fn profile_with_events(events: Vec<ActivityEvent>) -> AccountProfile {
        AccountProfile {
            name: "tester".to_string(),
            created_at: NOW - 400.0 * SECONDS_PER_DAY,
            comment_karma: 10,
            link_karma: 10,
            verified_email: true,
            trophy_count: 3,
            profile_picture_url: String::new(),
            events,
            oldest_activity_timestamp: UNKNOWN_TIMESTAMP,
            comments: Vec::new(),
            subreddits: HashSet::new(),
        }
    }

    fn ev(timestamp: f64, karma: i64) -> ActivityEvent {
        ActivityEvent { timestamp, karma }
    }

    #[test]
    fn karma_ratio_edges() {
        assert_eq!(karma_ratio(0, 0), 0.0);
        assert_eq!(karma_ratio(300, 0), 1.0);
        assert_eq!(karma_ratio(1, 1), 0.5);
    }

    #[test]
    fn biggest_gap_spans_consecutive_pairs_only() {
        let profile = profile_with_events(vec![ev(NOW, 1), ev(NOW - 200.0 * SECONDS_PER_DAY, 1)]);
        let features = timeline_features(&profile, NOW);
        let gap = features["biggest_timestamp_gap"];
        assert!((gap - 200.0 * SECONDS_PER_DAY).abs() < 1e-6);

        let empty = profile_with_events(vec![ev(NOW, 1)]);
        assert_eq!(timeline_features(&empty, NOW)["biggest_timestamp_gap"], 0.0);
    }

    #[test]
    fn burst_ratio_edges() {
        let none = profile_with_events(Vec::new());
        assert_eq!(timeline_features(&none, NOW)["burst_activity_ratio"], 0.0);

        let rapid = profile_with_events(vec![ev(NOW, 1), ev(NOW - 10.0, 1), ev(NOW - 20.0, 1)]);
        assert_eq!(timeline_features(&rapid, NOW)["burst_activity_ratio"], 1.0);

        let mixed = profile_with_events(vec![
            ev(NOW, 1),
            ev(NOW - 10.0, 1),
            ev(NOW - 10_000.0, 1),
        ]);
        assert_eq!(timeline_features(&mixed, NOW)["burst_activity_ratio"], 0.5);
    }

    #[test]
    fn active_rate_stops_at_window_boundary() {
        // 100 karma earned 10 days ago, 500 more outside the window.
        let mut profile = profile_with_events(vec![
            ev(NOW - 10.0 * SECONDS_PER_DAY, 100),
            ev(NOW - 60.0 * SECONDS_PER_DAY, 500),
        ]);
        let rate = timeline_features(&profile, NOW)["active_karma_rate"];
        assert!((rate - 10.0).abs() < 1e-9);

        profile.events.clear();
        assert_eq!(timeline_features(&profile, NOW)["active_karma_rate"], 0.0);
    }

    #[test]
    fn active_rate_clamps_to_one_day_minimum() {
        let profile = profile_with_events(vec![ev(NOW - 3600.0, 50)]);
        let rate = timeline_features(&profile, NOW)["active_karma_rate"];
        assert!((rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn first_activity_delay_handles_unknown_and_negative() {
        let mut profile = profile_with_events(Vec::new());
        assert_eq!(timeline_features(&profile, NOW)["first_activity_delay_days"], 0.0);

        profile.oldest_activity_timestamp = profile.created_at - 100.0;
        assert_eq!(timeline_features(&profile, NOW)["first_activity_delay_days"], 0.0);

        profile.oldest_activity_timestamp = profile.created_at + 5.0 * SECONDS_PER_DAY;
        let delay = timeline_features(&profile, NOW)["first_activity_delay_days"];
        assert!((delay - 5.0).abs() < 1e-9);
    }
}
