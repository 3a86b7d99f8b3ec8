use serde::Deserialize;
use sybil_core::{SybilError, SybilResult, UNKNOWN_TIMESTAMP};
use tracing::warn;

const ARCHIVE_BASE: &str = "https://arctic-shift.photon-reddit.com/api";

/// Historical-archive lookup for an account's very first recorded activity,
/// which can predate anything the platform's own listings still return.
pub struct ArchiveClient {
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ArchiveResponse {
    data: Option<Vec<ArchiveEntry>>,
}

#[derive(Deserialize)]
struct ArchiveEntry {
    created_utc: Option<f64>,
}

impl Default for ArchiveClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .user_agent("sybil/0.1 (behavioral account analysis)")
                .build()
                .unwrap_or_default(),
        }
    }

    /// Earliest known activity timestamp across comments and submissions, or
    /// [`UNKNOWN_TIMESTAMP`] when the archive has nothing. Best effort: a
    /// failed lookup of either kind is logged and skipped.
    pub async fn oldest_activity(&self, author: &str) -> f64 {
        let mut oldest = f64::INFINITY;

        for kind in ["comments", "submissions"] {
            match self.oldest_of_kind(kind, author).await {
                Ok(Some(ts)) => oldest = oldest.min(ts),
                Ok(None) => {}
                Err(e) => warn!(kind, error = %e, "archive lookup failed"),
            }
        }

        if oldest.is_finite() {
            oldest
        } else {
            UNKNOWN_TIMESTAMP
        }
    }

    async fn oldest_of_kind(&self, kind: &str, author: &str) -> SybilResult<Option<f64>> {
        let url = format!("{ARCHIVE_BASE}/{kind}/search");
        let resp = self
            .client
            .get(&url)
            .query(&[("author", author), ("sort", "asc"), ("limit", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SybilError::Fetch(format!(
                "archive returned {}",
                resp.status()
            )));
        }

        let body: ArchiveResponse = resp.json().await?;
        Ok(body
            .data
            .unwrap_or_default()
            .first()
            .and_then(|entry| entry.created_utc))
    }
}
