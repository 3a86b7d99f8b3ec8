use thiserror::Error;

#[derive(Debug, Error)]
pub enum SybilError {
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("account inaccessible (suspended or private): {0}")]
    AccountInaccessible(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("search error: {0}")]
    Search(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SybilError {
    /// Errors that abort a single account's evaluation but not a batch.
    pub fn is_fatal_for_account(&self) -> bool {
        matches!(
            self,
            SybilError::AccountNotFound(_) | SybilError::AccountInaccessible(_)
        )
    }
}

pub type SybilResult<T> = Result<T, SybilError>;
