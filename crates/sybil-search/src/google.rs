use serde::Deserialize;
use sybil_core::{SybilError, SybilResult};
use tracing::debug;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// How many result URLs a single phrase query may return.
const RESULT_LIMIT: u32 = 2;

/// Google Custom Search JSON API client, restricted to exact-phrase queries
/// against the origin platform.
pub struct SearchClient {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Deserialize)]
struct SearchItem {
    link: Option<String>,
}

impl SearchClient {
    pub fn new(api_key: String, engine_id: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            api_key,
            engine_id,
        }
    }

    /// Up to [`RESULT_LIMIT`] discussion URLs where `phrase` appears
    /// verbatim on the platform.
    pub async fn phrase_search(&self, phrase: &str) -> SybilResult<Vec<String>> {
        let query = format!("site:reddit.com \"{phrase}\"");
        let resp = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query.as_str()),
                ("num", &RESULT_LIMIT.to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SybilError::Search(format!(
                "search endpoint returned {}",
                resp.status()
            )));
        }

        let body: SearchResponse = resp.json().await?;
        let urls: Vec<String> = body
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.link)
            .take(RESULT_LIMIT as usize)
            .collect();

        debug!(results = urls.len(), "phrase search complete");
        Ok(urls)
    }
}
