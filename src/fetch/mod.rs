//! Source image retrieval
//!
//! Downloads the remote images referenced by a manifest row. One bounded
//! attempt per reference; any failure is terminal for that reference and
//! surfaces as [`crate::Error::Fetch`].

pub mod http;
pub mod mock;

pub use http::HttpFetchClient;
pub use mock::MockFetchClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FetchService: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
