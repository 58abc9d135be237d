use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {0}: {1}")]
    InvalidUrl(String, String),

    #[error("Request failed: {0}")]
    Failed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Failed(err.to_string())
    }
}
