//! Outbound completion callbacks
//!
//! Delivers the batch completion payload to a configured webhook URL.
//! Delivery is best-effort and at-most-once; the caller decides whether a
//! failed delivery is retried (it is not, see [`crate::pipeline`]).

pub mod mock;
pub mod webhook;

pub use mock::MockNotificationClient;
pub use webhook::WebhookClient;

use crate::models::CallbackPayload;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn deliver(&self, url: &str, payload: &CallbackPayload) -> Result<()>;
}
