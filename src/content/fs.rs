use super::ContentService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Local-filesystem content area.
///
/// Files land under `root`; the returned URLs point at the `/image/{name}`
/// route served by the outer HTTP layer.
pub struct FsContentStore {
    root: PathBuf,
    base_url: String,
}

impl FsContentStore {
    pub fn new(root: &Path, base_url: &str) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn public_url(&self, filename: &str) -> String {
        format!("{}/image/{}", self.base_url, filename)
    }
}

#[async_trait]
impl ContentService for FsContentStore {
    async fn store_image(&self, filename: &str, data: &[u8]) -> Result<String> {
        let path = self.root.join(filename);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| Error::Storage(format!("failed to write {}: {}", path.display(), e)))?;

        Ok(self.public_url(filename))
    }
}
