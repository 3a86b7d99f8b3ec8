use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use sybil_core::AccountProfile;

/// Auto-generated-looking names: a capitalized word, an optional second word
/// joined by a separator or CamelCase, an optional trailing separator, then
/// two or more digits. Matches the whole name. `AngryDog22`, `angry_dog-22`,
/// and the platform-default `Angry-Dog-1495` shape all qualify.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][a-z]+(?:[_-][A-Za-z][a-z]+|[A-Z][a-z]+)(?:[_-])?\d{2,}$")
        .unwrap_or_else(|e| panic!("invalid name pattern: {e}"))
});

/// Path fragment the platform serves default avatars from.
const DEFAULT_AVATAR_PATH: &str = "/avatars/defaults/";

/// Boolean/count features from static account attributes, coerced to f64.
pub fn profile_features(profile: &AccountProfile) -> HashMap<&'static str, f64> {
    HashMap::from([
        ("verified_email", profile.verified_email as u8 as f64),
        ("trophy_count", f64::from(profile.trophy_count)),
        ("name_pattern", matches_bot_name(&profile.name) as u8 as f64),
        ("icon_default", has_default_icon(&profile.profile_picture_url) as u8 as f64),
    ])
}

pub fn matches_bot_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

pub fn has_default_icon(picture_url: &str) -> bool {
    picture_url.contains(DEFAULT_AVATAR_PATH)
}
