use super::NotificationService;
use crate::models::CallbackPayload;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockNotificationClient {
    deliveries: Arc<Mutex<Vec<(String, CallbackPayload)>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockNotificationClient {
    pub fn new() -> Self {
        Self {
            deliveries: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_delivery_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    /// Recorded `(url, payload)` pairs in delivery order.
    pub fn get_deliveries(&self) -> Vec<(String, CallbackPayload)> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl Default for MockNotificationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationService for MockNotificationClient {
    async fn deliver(&self, url: &str, payload: &CallbackPayload) -> Result<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Notification("Mock delivery failure".to_string()));
        }

        self.deliveries
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        Ok(())
    }
}
