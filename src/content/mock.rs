use super::ContentService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockContentStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    base_url: String,
    store_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            base_url: "http://mock-content.example.com".to_string(),
            store_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_store_count(&self) -> usize {
        *self.store_count.lock().unwrap()
    }

    pub fn get_files(&self) -> HashMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }
}

impl Default for MockContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentService for MockContentStore {
    async fn store_image(&self, filename: &str, data: &[u8]) -> Result<String> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Storage("Mock content store failure".to_string()));
        }

        let mut count = self.store_count.lock().unwrap();
        *count += 1;

        self.files
            .lock()
            .unwrap()
            .insert(filename.to_string(), data.to_vec());
        Ok(format!("{}/image/{}", self.base_url, filename))
    }
}
