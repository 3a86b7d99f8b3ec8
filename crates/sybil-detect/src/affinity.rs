use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use sybil_core::AccountProfile;

/// Subreddits bots farm karma in: very large, very generic, low-effort
/// engagement. Defaults live here; deployments override them from config as
/// the lists age.
const HIGH_TRAFFIC_DEFAULTS: &[&str] = &[
    "nextfuckinglevel",
    "publicfreakout",
    "starterpacks",
    "mademesmile",
    "interestingasfuck",
    "askreddit",
    "funny",
    "mildlyinfuriating",
    "amitheasshole",
    "oddlysatisfying",
    "eyebleach",
    "woahthatsinteresting",
    "meirl",
    "me_irl",
    "rareinsults",
    "beamazed",
    "memes",
    "showerthoughts",
    "unpopularopinion",
    "jokes",
    "todayilearned",
    "pics",
    "holup",
    "thatsinsane",
    "dankmemes",
    "damnthatsinteresting",
    "guysbeingdudes",
    "murderedbywords",
    "clevercomebacks",
    "explainthejoke",
    "peterexplainsthejoke",
    "interesting",
    "sipstea",
];

/// Substrings marking communities tied to scam/spam/sales topics.
const SCAM_KEYWORD_DEFAULTS: &[&str] = &[
    "crypto",
    "blockchain",
    "bitcoin",
    "etherum",
    "dogecoin",
    "nft",
    "stocks",
    "wallstreet",
    "pennystock",
    "daytrade",
    "forex",
    "passiveincome",
    "hustle",
    "grind",
    "dropship",
    "money",
    "buy",
    "onlyfans",
    "fansly",
    "camgirl",
    "shirt",
    "hoodie",
    "merch",
    "essay",
    "homework",
    "vpn",
    "nootropic",
    "supplement",
    "sarm",
    "free",
    "nsfw",
];

/// Curated reference data for the affinity signals. Loaded once at startup,
/// read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSets {
    pub high_traffic: HashSet<String>,
    pub scam_keywords: Vec<String>,
}

impl Default for ReferenceSets {
    fn default() -> Self {
        Self {
            high_traffic: HIGH_TRAFFIC_DEFAULTS.iter().map(|s| s.to_string()).collect(),
            scam_keywords: SCAM_KEYWORD_DEFAULTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Community-membership ratios against the curated sets. Empty membership
/// resolves both ratios to 0.0.
pub fn affinity_features(
    profile: &AccountProfile,
    sets: &ReferenceSets,
) -> HashMap<&'static str, f64> {
    HashMap::from([
        ("popular_subreddits_ratio", popular_ratio(&profile.subreddits, sets)),
        ("scammy_subreddits_ratio", scammy_ratio(&profile.subreddits, sets)),
    ])
}

fn popular_ratio(memberships: &HashSet<String>, sets: &ReferenceSets) -> f64 {
    if memberships.is_empty() {
        return 0.0;
    }
    let hits = memberships
        .iter()
        .filter(|m| sets.high_traffic.contains(m.as_str()))
        .count();
    hits as f64 / memberships.len() as f64
}

fn scammy_ratio(memberships: &HashSet<String>, sets: &ReferenceSets) -> f64 {
    if memberships.is_empty() {
        return 0.0;
    }
    let hits = memberships
        .iter()
        .filter(|m| sets.scam_keywords.iter().any(|kw| m.contains(kw.as_str())))
        .count();
    hits as f64 / memberships.len() as f64
}
