use crate::models::{completion_percentage, CallbackPayload, ProcessingStatus};
use crate::notify::NotificationService;
use crate::store::BatchStore;
use crate::{Error, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

/// Fires the completion callback for a batch, at most once.
///
/// The persisted `notified` flag is the entire at-most-once mechanism: it
/// flips only after a successful delivery, and there is no retry queue. A
/// failed delivery is logged and swallowed.
pub struct CompletionNotifier {
    store: Arc<dyn BatchStore>,
    notifier: Box<dyn NotificationService>,
    default_callback: Option<String>,
}

impl CompletionNotifier {
    pub fn new(
        store: Arc<dyn BatchStore>,
        notifier: Box<dyn NotificationService>,
        default_callback: Option<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            default_callback,
        }
    }

    /// Returns true when a callback was actually delivered.
    ///
    /// Nothing is sent unless the batch is `completed`, not yet notified,
    /// and a callback URL is known (batch-specific first, then the
    /// process-wide default).
    pub async fn notify_if_completed(&self, batch_id: &str) -> Result<bool> {
        let batch = self
            .store
            .batch(batch_id)
            .await?
            .ok_or_else(|| Error::Storage(format!("batch {} not found", batch_id)))?;

        if batch.notified || batch.status != ProcessingStatus::Completed {
            return Ok(false);
        }

        let url = match batch
            .callback_url
            .clone()
            .or_else(|| self.default_callback.clone())
        {
            Some(url) => url,
            None => return Ok(false),
        };

        let payload = CallbackPayload {
            request_id: batch.id.clone(),
            status: batch.status,
            total_products: batch.total_products,
            processed_products: batch.processed_products,
            completion_percentage: completion_percentage(
                batch.processed_products,
                batch.total_products,
            ),
            timestamp: Utc::now().to_rfc3339(),
        };

        if let Err(e) = self.notifier.deliver(&url, &payload).await {
            error!(
                "Failed to deliver completion callback for batch {}: {}",
                batch.id, e
            );
            return Ok(false);
        }

        if let Err(e) = self.store.mark_notified(batch_id).await {
            // The callback went out; a later run could deliver a duplicate.
            error!(
                "Delivered callback for batch {} but could not persist the notified flag: {}",
                batch.id, e
            );
            return Ok(true);
        }

        info!("Delivered completion callback for batch {}", batch.id);
        Ok(true)
    }
}
