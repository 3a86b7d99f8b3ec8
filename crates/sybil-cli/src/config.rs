use serde::Deserialize;
use sybil_detect::ReferenceSets;
use sybil_search::SearchClient;

#[derive(Deserialize, Default)]
pub struct SybilConfig {
    #[serde(default)]
    pub model: ModelConfig,
    pub search: Option<SearchConfig>,
    pub reference: Option<ReferenceConfig>,
    pub dataset: Option<DatasetConfig>,
}

#[derive(Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
}

#[derive(Deserialize)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
}

/// Overrides for the curated affinity reference sets. Empty lists fall back
/// to the built-in defaults.
#[derive(Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub high_traffic: Vec<String>,
    #[serde(default)]
    pub scam_keywords: Vec<String>,
}

#[derive(Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_output")]
    pub output: String,
    #[serde(default)]
    pub bots: Vec<String>,
    #[serde(default)]
    pub humans: Vec<String>,
    #[serde(default = "default_account_delay")]
    pub delay_secs: u64,
}

fn default_model_path() -> String {
    "./models/forest.json".to_string()
}
fn default_dataset_output() -> String {
    "./training_data.csv".to_string()
}
fn default_account_delay() -> u64 {
    2
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

impl SybilConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn reference_sets(&self) -> ReferenceSets {
        let mut sets = ReferenceSets::default();
        if let Some(reference) = &self.reference {
            if !reference.high_traffic.is_empty() {
                sets.high_traffic = reference
                    .high_traffic
                    .iter()
                    .map(|s| s.to_lowercase())
                    .collect();
            }
            if !reference.scam_keywords.is_empty() {
                sets.scam_keywords = reference
                    .scam_keywords
                    .iter()
                    .map(|s| s.to_lowercase())
                    .collect();
            }
        }
        sets
    }

    /// Search credentials come from config first, environment second. None
    /// means the duplication scan is skipped.
    pub fn search_client(&self) -> Option<SearchClient> {
        let from_config = |pick: fn(&SearchConfig) -> Option<&String>| {
            self.search.as_ref().and_then(pick).cloned()
        };
        let api_key = from_config(|s| s.api_key.as_ref())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())?;
        let engine_id = from_config(|s| s.engine_id.as_ref())
            .or_else(|| std::env::var("GOOGLE_SEARCH_ENGINE_ID").ok())?;
        Some(SearchClient::new(api_key, engine_id))
    }
}
