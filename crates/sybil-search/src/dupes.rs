//! Cross-platform comment-duplication scan. Best effort and strictly
//! sequential: one rate-limited search per comment, one fetch per result
//! URL, and any failure along the way degrades that item to "no match"
//! without touching the rest of the batch.

use crate::google::SearchClient;
use serde::Deserialize;
use sybil_core::{CopiedComment, DuplicationReport, SybilError, SybilResult};
use tracing::{debug, warn};

/// Comments below this length are too generic to search for.
const MIN_COMMENT_CHARS: usize = 20;

/// Only the most recent few comments are worth a search-quota hit.
const SCAN_COMMENT_LIMIT: usize = 3;

/// Top-level replies examined per discussion.
const REPLY_LIMIT: usize = 20;

/// Fuzzy ratio at or above which a reply counts as a copy.
const MATCH_RATIO_THRESHOLD: u32 = 85;

/// Mandatory gap between search queries; the collaborator's quota contract.
const QUERY_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

/// Normalized string-similarity ratio on the 0-100 scale.
pub fn fuzzy_ratio(a: &str, b: &str) -> u32 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u32
}

pub struct DupeScanner {
    search: SearchClient,
    client: reqwest::Client,
}

/// One top-level reply in a fetched discussion.
#[derive(Debug, Clone)]
pub struct Reply {
    pub author: String,
    pub body: String,
    pub subreddit: String,
    pub permalink: String,
}

#[derive(Deserialize)]
struct Listing {
    data: Option<ListingData>,
}

#[derive(Deserialize)]
struct ListingData {
    children: Option<Vec<ListingChild>>,
}

#[derive(Deserialize)]
struct ListingChild {
    kind: Option<String>,
    data: Option<CommentData>,
}

#[derive(Deserialize)]
struct CommentData {
    author: Option<String>,
    body: Option<String>,
    subreddit: Option<String>,
    permalink: Option<String>,
}

impl DupeScanner {
    pub fn new(search: SearchClient) -> Self {
        Self {
            search,
            client: reqwest::Client::builder()
                .user_agent("sybil/0.1 (behavioral account analysis)")
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Scans the account's most recent searchable comments for copies posted
    /// by other authors. Never fails: degraded lookups are logged and
    /// skipped.
    pub async fn scan(&self, account_name: &str, comments: &[String]) -> DuplicationReport {
        let mut report = DuplicationReport::default();

        let candidates = comments
            .iter()
            .filter(|c| c.chars().count() >= MIN_COMMENT_CHARS)
            .take(SCAN_COMMENT_LIMIT);

        for comment in candidates {
            tokio::time::sleep(QUERY_DELAY).await;

            let urls = match self.search.phrase_search(comment).await {
                Ok(urls) => urls,
                Err(e) => {
                    warn!(error = %e, "phrase search failed, treating as no match");
                    continue;
                }
            };

            for url in urls {
                match self.scan_discussion(&url, comment, account_name).await {
                    Ok(Some(copy)) => {
                        debug!(author = %copy.copy_author, ratio = copy.ratio, "copy found");
                        report.copies.push(copy);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(url = %url, error = %e, "discussion fetch failed, skipping");
                    }
                }
            }
        }

        report
    }

    /// Fetches one discussion and returns the first qualifying copy, if any.
    async fn scan_discussion(
        &self,
        url: &str,
        comment: &str,
        account_name: &str,
    ) -> SybilResult<Option<CopiedComment>> {
        let json_url = format!("{}.json", url.trim_end_matches('/'));
        let resp = self.client.get(&json_url).send().await?;

        if !resp.status().is_success() {
            return Err(SybilError::Search(format!(
                "discussion returned {}",
                resp.status()
            )));
        }

        let listings: Vec<Listing> = resp.json().await?;
        let replies = top_level_replies(&listings);
        Ok(first_match(&replies, comment, account_name))
    }
}

/// The comment listing is the second element of a discussion payload; only
/// `t1` children with a live author count.
fn top_level_replies(listings: &[Listing]) -> Vec<Reply> {
    let Some(children) = listings
        .get(1)
        .and_then(|l| l.data.as_ref())
        .and_then(|d| d.children.as_ref())
    else {
        return Vec::new();
    };

    children
        .iter()
        .filter(|child| child.kind.as_deref() == Some("t1"))
        .filter_map(|child| child.data.as_ref())
        .filter_map(|data| {
            let author = data.author.clone()?;
            if author.is_empty() || author == "[deleted]" {
                return None;
            }
            Some(Reply {
                author,
                body: data.body.clone().unwrap_or_default(),
                subreddit: data.subreddit.clone().unwrap_or_default(),
                permalink: data.permalink.clone().unwrap_or_default(),
            })
        })
        .take(REPLY_LIMIT)
        .collect()
}

/// First reply that is a near-duplicate of `comment` from a different
/// author. Scanning stops at the first hit per discussion.
fn first_match(replies: &[Reply], comment: &str, account_name: &str) -> Option<CopiedComment> {
    for reply in replies {
        let ratio = fuzzy_ratio(comment, &reply.body);
        if ratio >= MATCH_RATIO_THRESHOLD && reply.author != account_name {
            return Some(CopiedComment {
                comment: comment.to_string(),
                copy_author: reply.author.clone(),
                subreddit: reply.subreddit.clone(),
                permalink: format!("https://www.reddit.com{}", reply.permalink),
                ratio,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(author: &str, body: &str) -> Reply {
        Reply {
            author: author.to_string(),
            body: body.to_string(),
            subreddit: "pics".to_string(),
            permalink: "/r/pics/comments/x/y/".to_string(),
        }
    }

    #[test]
    fn ratio_scale_is_zero_to_hundred() {
        assert_eq!(fuzzy_ratio("same text", "same text"), 100);
        assert_eq!(fuzzy_ratio("abcd", "wxyz"), 0);
        let near = fuzzy_ratio(
            "this is a fairly long comment about things",
            "this is a fairly long comment about thing",
        );
        assert!(near >= 85, "near-duplicate scored {near}");
    }

    #[test]
    fn first_match_requires_threshold_and_different_author() {
        let original = "this exact comment was posted somewhere else first";
        let replies = vec![
            reply("the_account", original),
            reply("stranger", "totally unrelated reply"),
            reply("copycat", original),
            reply("second_copycat", original),
        ];

        let hit = first_match(&replies, original, "the_account").unwrap();
        // The account's own post and the unrelated reply are passed over;
        // scanning stops at the first qualifying copy.
        assert_eq!(hit.copy_author, "copycat");
        assert_eq!(hit.ratio, 100);
        assert!(hit.permalink.starts_with("https://www.reddit.com/"));
    }

    #[test]
    fn no_match_when_only_the_author_posted_it() {
        let original = "this exact comment was posted somewhere else first";
        let replies = vec![reply("the_account", original)];
        assert!(first_match(&replies, original, "the_account").is_none());
    }

    #[test]
    fn deleted_and_excess_replies_are_dropped() {
        fn make_child(author: Option<&str>, kind: &str) -> ListingChild {
            ListingChild {
                kind: Some(kind.to_string()),
                data: Some(CommentData {
                    author: author.map(|a| a.to_string()),
                    body: Some("body".to_string()),
                    subreddit: None,
                    permalink: None,
                }),
            }
        }

        let mut children = vec![
            make_child(Some("[deleted]"), "t1"),
            make_child(None, "t1"),
            make_child(Some("more"), "more"),
        ];
        for i in 0..REPLY_LIMIT + 5 {
            children.push(make_child(Some(&format!("user{i}")), "t1"));
        }

        let listings = vec![
            Listing { data: None },
            Listing {
                data: Some(ListingData {
                    children: Some(children),
                }),
            },
        ];

        let replies = top_level_replies(&listings);
        assert_eq!(replies.len(), REPLY_LIMIT);
        assert!(replies.iter().all(|r| r.author != "[deleted]"));
    }
}
