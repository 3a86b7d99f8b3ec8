//! Reddit public JSON API fetcher. Builds the immutable [`AccountProfile`]
//! every signal component consumes. Contract: a missing account is a fatal
//! error; a failed activity listing yields an empty sequence, not an error.

use crate::archive::ArchiveClient;
use serde::Deserialize;
use std::collections::HashSet;
use sybil_core::{AccountProfile, ActivityEvent, SybilError, SybilResult};
use tracing::{debug, warn};

const DEFAULT_BASE: &str = "https://www.reddit.com";

/// Listings paginate in pages of at most 100.
const PAGE_SIZE: usize = 100;

/// Most recent posts/comments retained for the timeline features.
const EVENT_LIMIT: usize = 900;

/// Most recent comment bodies retained for the content features.
const COMMENT_LIMIT: usize = 500;

pub struct RedditClient {
    client: reqwest::Client,
    base: String,
    archive: ArchiveClient,
}

#[derive(Deserialize)]
struct AboutResponse {
    data: Option<AboutData>,
}

#[derive(Deserialize)]
struct AboutData {
    name: Option<String>,
    created_utc: Option<f64>,
    link_karma: Option<i64>,
    comment_karma: Option<i64>,
    has_verified_email: Option<bool>,
    icon_img: Option<String>,
    is_suspended: Option<bool>,
}

#[derive(Deserialize)]
struct ListingResponse {
    data: Option<ListingData>,
}

#[derive(Deserialize)]
struct ListingData {
    after: Option<String>,
    children: Option<Vec<ListingChild>>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: Option<ItemData>,
}

#[derive(Deserialize)]
struct ItemData {
    created_utc: Option<f64>,
    score: Option<i64>,
    subreddit: Option<String>,
    body: Option<String>,
}

#[derive(Deserialize)]
struct TrophyResponse {
    data: Option<TrophyData>,
}

#[derive(Deserialize)]
struct TrophyData {
    trophies: Option<Vec<serde_json::Value>>,
}

impl RedditClient {
    pub fn new() -> Self {
        Self::with_base(DEFAULT_BASE.to_string())
    }

    /// Point the client at a different host; used by tests and proxies.
    pub fn with_base(base: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("sybil/0.1 (behavioral account analysis)")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base,
            archive: ArchiveClient::new(),
        }
    }

    /// Fetches everything the signal components need for one account. All
    /// boundary calls run sequentially; only the account lookup itself can
    /// fail the evaluation.
    pub async fn fetch_profile(&self, username: &str) -> SybilResult<AccountProfile> {
        let about = self.fetch_about(username).await?;

        let (events, subreddits) = match self.fetch_overview(username).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(username, error = %e, "overview listing failed, using empty history");
                (Vec::new(), HashSet::new())
            }
        };

        let comments = match self.fetch_comments(username).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!(username, error = %e, "comment listing failed, using empty history");
                Vec::new()
            }
        };

        let trophy_count = match self.fetch_trophy_count(username).await {
            Ok(count) => count,
            Err(e) => {
                warn!(username, error = %e, "trophy listing failed, assuming none");
                0
            }
        };

        let oldest_activity_timestamp = self.archive.oldest_activity(username).await;

        debug!(
            username,
            events = events.len(),
            comments = comments.len(),
            subreddits = subreddits.len(),
            "profile assembled"
        );

        Ok(AccountProfile {
            name: about.name.unwrap_or_else(|| username.to_string()),
            created_at: about.created_utc.unwrap_or(0.0),
            comment_karma: about.comment_karma.unwrap_or(0),
            link_karma: about.link_karma.unwrap_or(0),
            verified_email: about.has_verified_email.unwrap_or(false),
            trophy_count,
            profile_picture_url: about.icon_img.unwrap_or_default(),
            events,
            oldest_activity_timestamp,
            comments,
            subreddits,
        })
    }

    async fn fetch_about(&self, username: &str) -> SybilResult<AboutData> {
        let url = format!("{}/user/{}/about.json", self.base, username);
        let resp = self.client.get(&url).send().await?;

        match resp.status().as_u16() {
            404 => return Err(SybilError::AccountNotFound(username.to_string())),
            403 => return Err(SybilError::AccountInaccessible(username.to_string())),
            status if !resp.status().is_success() => {
                return Err(SybilError::Fetch(format!(
                    "about endpoint returned {status} for {username}"
                )));
            }
            _ => {}
        }

        let body: AboutResponse = resp.json().await?;
        let data = body
            .data
            .ok_or_else(|| SybilError::Fetch(format!("empty about payload for {username}")))?;

        if data.is_suspended.unwrap_or(false) {
            return Err(SybilError::AccountInaccessible(username.to_string()));
        }
        Ok(data)
    }

    /// Timestamps+karma of the most recent posts and comments (newest-first,
    /// as the listing returns them) plus the lowercase subreddit set.
    async fn fetch_overview(
        &self,
        username: &str,
    ) -> SybilResult<(Vec<ActivityEvent>, HashSet<String>)> {
        let mut events = Vec::new();
        let mut subreddits = HashSet::new();

        self.paginate(username, "overview", EVENT_LIMIT, |item| {
            if let Some(timestamp) = item.created_utc {
                events.push(ActivityEvent {
                    timestamp,
                    karma: item.score.unwrap_or(0),
                });
            }
            if let Some(sub) = &item.subreddit {
                subreddits.insert(sub.to_lowercase());
            }
        })
        .await?;

        Ok((events, subreddits))
    }

    async fn fetch_comments(&self, username: &str) -> SybilResult<Vec<String>> {
        let mut comments = Vec::new();
        self.paginate(username, "comments", COMMENT_LIMIT, |item| {
            if let Some(body) = &item.body {
                comments.push(body.clone());
            }
        })
        .await?;
        Ok(comments)
    }

    async fn fetch_trophy_count(&self, username: &str) -> SybilResult<u32> {
        let url = format!("{}/user/{}/trophies.json", self.base, username);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(SybilError::Fetch(format!(
                "trophy endpoint returned {}",
                resp.status()
            )));
        }
        let body: TrophyResponse = resp.json().await?;
        let count = body
            .data
            .and_then(|d| d.trophies)
            .map(|t| t.len())
            .unwrap_or(0);
        Ok(count as u32)
    }

    /// Walks a user listing page by page until `limit` items were seen or
    /// the listing ends, feeding each item to `consume`.
    async fn paginate<F>(
        &self,
        username: &str,
        listing: &str,
        limit: usize,
        mut consume: F,
    ) -> SybilResult<()>
    where
        F: FnMut(&ItemData),
    {
        let url = format!("{}/user/{}/{}.json", self.base, username, listing);
        let mut after: Option<String> = None;
        let mut seen = 0usize;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("limit", PAGE_SIZE.to_string())]);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor.as_str())]);
            }

            let resp = request.send().await?;
            if !resp.status().is_success() {
                return Err(SybilError::Fetch(format!(
                    "{listing} listing returned {}",
                    resp.status()
                )));
            }

            let page: ListingResponse = resp.json().await?;
            let Some(data) = page.data else {
                return Ok(());
            };
            let children = data.children.unwrap_or_default();
            if children.is_empty() {
                return Ok(());
            }

            for child in &children {
                if seen >= limit {
                    return Ok(());
                }
                if let Some(item) = &child.data {
                    consume(item);
                    seen += 1;
                }
            }

            match data.after {
                Some(cursor) if seen < limit => after = Some(cursor),
                _ => return Ok(()),
            }
        }
    }
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_payload_decodes_with_missing_fields() {
        let raw = r#"{"data": {"name": "tester", "created_utc": 1600000000.0,
                      "link_karma": 10, "comment_karma": 20}}"#;
        let body: AboutResponse = serde_json::from_str(raw).unwrap();
        let data = body.data.unwrap();
        assert_eq!(data.name.as_deref(), Some("tester"));
        assert_eq!(data.has_verified_email, None);
        assert_eq!(data.is_suspended, None);
    }

    #[test]
    fn listing_payload_decodes_items() {
        let raw = r#"{"data": {"after": "t1_abc", "children": [
            {"data": {"created_utc": 1600000100.0, "score": 5, "subreddit": "AskReddit"}},
            {"data": {"created_utc": 1600000000.0, "score": -2, "body": "a comment"}}
        ]}}"#;
        let body: ListingResponse = serde_json::from_str(raw).unwrap();
        let data = body.data.unwrap();
        assert_eq!(data.after.as_deref(), Some("t1_abc"));
        let children = data.children.unwrap();
        assert_eq!(children.len(), 2);
        let first = children[0].data.as_ref().unwrap();
        assert_eq!(first.subreddit.as_deref(), Some("AskReddit"));
        let second = children[1].data.as_ref().unwrap();
        assert_eq!(second.body.as_deref(), Some("a comment"));
        assert_eq!(second.score, Some(-2));
    }

    #[test]
    fn trophy_payload_counts_entries() {
        let raw = r#"{"data": {"trophies": [{"kind": "t6"}, {"kind": "t6"}]}}"#;
        let body: TrophyResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.data.unwrap().trophies.unwrap().len(), 2);
    }
}
