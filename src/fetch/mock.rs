use super::FetchService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Smallest decodable image: a 1x1 red RGB PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, // signature + IHDR
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, //
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, //
    0x0C, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0xF8, 0xCF, 0xC0, 0x00, // IDAT
    0x00, 0x03, 0x01, 0x01, 0x00, 0xF7, 0x03, 0x41, 0x43, 0x00, 0x00, 0x00, //
    0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82, // IEND
];

/// Test double keyed by URL: configured bodies, configured failures, and a
/// tiny valid PNG for anything else.
#[derive(Clone)]
pub struct MockFetchClient {
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failures: Arc<Mutex<HashSet<String>>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl MockFetchClient {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
            fetch_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image(self, url: &str, data: Vec<u8>) -> Self {
        self.images.lock().unwrap().insert(url.to_string(), data);
        self
    }

    pub fn with_failure(self, url: &str) -> Self {
        self.failures.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn get_fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }
}

impl Default for MockFetchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchService for MockFetchClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut count = self.fetch_count.lock().unwrap();
        *count += 1;

        if self.failures.lock().unwrap().contains(url) {
            return Err(Error::Fetch(format!("mock fetch failure for {}", url)));
        }

        match self.images.lock().unwrap().get(url) {
            Some(data) => Ok(data.clone()),
            None => Ok(TINY_PNG.to_vec()),
        }
    }
}
