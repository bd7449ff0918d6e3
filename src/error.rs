use thiserror::Error;

/// Everything that can go wrong while fetching one page of artworks. The
/// controller treats all variants the same way; the split exists for logs.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("artworks API answered with status {status}")]
    Status { status: u16 },

    #[error("could not read artworks response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid page request: {0}")]
    InvalidRequest(String),
}
