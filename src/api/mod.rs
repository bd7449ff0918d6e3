//! Data fetching layer split across logical submodules.

mod client;
mod normalize;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::ArtworkPage;

pub use client::{ArticClient, DEFAULT_ENDPOINT, FIELDS};
pub use normalize::normalize_response;

/// Anything that can produce one page of artworks. The controller only talks
/// to this trait, so tests can swap the network for an in-memory catalog.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    /// Fetch the 1-based `page` holding `limit` rows.
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<ArtworkPage, FetchError>;
}
