//! Write-once content area for processed images
//!
//! Stores re-encoded JPEGs under generated names and hands back the
//! externally reachable URL for each stored file. Names are never reused,
//! so stored files are immutable once written.

pub mod fs;
pub mod mock;

pub use fs::FsContentStore;
pub use mock::MockContentStore;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn store_image(&self, filename: &str, data: &[u8]) -> Result<String>;
}
