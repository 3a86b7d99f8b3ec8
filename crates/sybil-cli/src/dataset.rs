//! Resumable builder for the labeled training CSV. The file is append-only;
//! usernames already present in column 0 are never written twice, so a
//! partially completed run can simply be re-run.

use crate::config::DatasetConfig;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use sybil_core::{FeatureVector, SybilResult, FEATURE_ORDER};
use sybil_detect::{features, unix_now, ReferenceSets};
use sybil_fetch::RedditClient;
use tracing::{info, warn};

fn csv_header() -> String {
    let mut columns = vec!["username", "is_bot"];
    columns.extend(FEATURE_ORDER);
    columns.join(",")
}

/// Creates the file with its header if it does not exist yet.
pub fn ensure_header(path: &Path) -> SybilResult<()> {
    if path.exists() {
        return Ok(());
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", csv_header())?;
    Ok(())
}

/// Usernames already recorded in the artifact (column 0, header skipped).
/// A missing file means nothing was processed yet.
pub fn processed_usernames(path: &Path) -> SybilResult<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut processed = HashSet::new();
    for line in reader.lines().skip(1) {
        let line = line?;
        if let Some(username) = line.split(',').next() {
            if !username.is_empty() {
                processed.insert(username.to_string());
            }
        }
    }
    Ok(processed)
}

/// Appends one labeled feature row.
pub fn append_row(
    path: &Path,
    username: &str,
    is_bot: u8,
    vector: &FeatureVector,
) -> SybilResult<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    let features: Vec<String> = vector.as_slice().iter().map(|v| v.to_string()).collect();
    writeln!(file, "{},{},{}", username, is_bot, features.join(","))?;
    Ok(())
}

/// Fetches every labeled account not yet in the artifact and appends its
/// feature row. Fatal per-account fetch errors are logged and skipped; an
/// inter-account delay spaces out API usage.
pub async fn build_dataset(
    config: &DatasetConfig,
    fetcher: &RedditClient,
    sets: &ReferenceSets,
) -> SybilResult<usize> {
    let path = Path::new(&config.output);
    ensure_header(path)?;
    let processed = processed_usernames(path)?;
    info!(existing = processed.len(), output = %config.output, "dataset resume state");

    let labeled: Vec<(&String, u8)> = config
        .bots
        .iter()
        .map(|u| (u, 1))
        .chain(config.humans.iter().map(|u| (u, 0)))
        .collect();

    let mut appended = 0usize;
    for (username, label) in labeled {
        if processed.contains(username.as_str()) {
            continue;
        }

        info!(username = %username, label = i64::from(label), "processing account");
        let profile = match fetcher.fetch_profile(username).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(username = %username, error = %e, "skipping account");
                continue;
            }
        };

        let vector = features::assemble(&profile, sets, unix_now());
        append_row(path, username, label, &vector)?;
        appended += 1;

        tokio::time::sleep(std::time::Duration::from_secs(config.delay_secs)).await;
    }

    info!(appended, "dataset build complete");
    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sybil_core::FEATURE_COUNT;

    fn vector(fill: f64) -> FeatureVector {
        FeatureVector::new([fill; FEATURE_COUNT])
    }

    #[test]
    fn header_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");

        ensure_header(&path).unwrap();
        ensure_header(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("username,is_bot,karma_ratio,"));
        assert!(content.trim_end().ends_with("scammy_subreddits_ratio"));
    }

    #[test]
    fn rerunning_the_builder_loop_adds_no_duplicate_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        ensure_header(&path).unwrap();

        // First run records two accounts.
        for (user, label) in [("alice", 0u8), ("bot_one", 1u8)] {
            if !processed_usernames(&path).unwrap().contains(user) {
                append_row(&path, user, label, &vector(0.5)).unwrap();
            }
        }

        // Second run sees them as processed and only adds the new account.
        for (user, label) in [("alice", 0u8), ("bot_one", 1u8), ("carol", 0u8)] {
            if !processed_usernames(&path).unwrap().contains(user) {
                append_row(&path, user, label, &vector(0.25)).unwrap();
            }
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), 4, "header plus three unique accounts");
        assert_eq!(rows.iter().filter(|r| r.starts_with("alice,")).count(), 1);

        let processed = processed_usernames(&path).unwrap();
        assert_eq!(processed.len(), 3);
        assert!(processed.contains("carol"));
    }

    #[test]
    fn rows_carry_all_fourteen_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        ensure_header(&path).unwrap();
        append_row(&path, "alice", 0, &vector(1.0)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(row.split(',').count(), 2 + FEATURE_COUNT);
    }
}
