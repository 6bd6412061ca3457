//! Batch driver: runs every product of a batch to a terminal status.

use super::{recompute_batch_status, CompletionNotifier, ProductProcessor};
use crate::content::{ContentService, FsContentStore};
use crate::fetch::{FetchService, HttpFetchClient};
use crate::models::{BatchOutcome, Config, ProcessingStatus};
use crate::notify::{NotificationService, WebhookClient};
use crate::store::BatchStore;
use crate::transform::ImageTransformer;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Injectable service bundle used to construct [`BatchRunner`] in
/// tests/harnesses.
pub struct PipelineServices {
    pub fetcher: Box<dyn FetchService>,
    pub content: Box<dyn ContentService>,
    pub notifier: Box<dyn NotificationService>,
}

/// Coordinates product processing, status aggregation and the completion
/// callback for whole batches.
pub struct BatchRunner {
    store: Arc<dyn BatchStore>,
    processor: ProductProcessor,
    completion: CompletionNotifier,
}

impl BatchRunner {
    /// Build a runner from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(
        store: Arc<dyn BatchStore>,
        services: PipelineServices,
        image_quality: u8,
        default_callback: Option<String>,
    ) -> Self {
        let processor = ProductProcessor::new(
            store.clone(),
            services.fetcher,
            ImageTransformer::new(image_quality),
            services.content,
        );
        let completion =
            CompletionNotifier::new(store.clone(), services.notifier, default_callback);

        Self {
            store,
            processor,
            completion,
        }
    }

    /// Construct a runner with the real HTTP and filesystem services.
    pub fn from_config(store: Arc<dyn BatchStore>, config: &Config) -> Result<Self> {
        let services = PipelineServices {
            fetcher: Box::new(HttpFetchClient::new(config.fetch_timeout)),
            content: Box::new(FsContentStore::new(&config.processed_dir, &config.base_url)?),
            notifier: Box::new(WebhookClient::new(config.webhook_timeout)),
        };

        Ok(Self::with_services(
            store,
            services,
            config.image_quality,
            config.webhook_url.clone(),
        ))
    }

    /// Drives one batch to a terminal status.
    ///
    /// Never returns an `Err`: a fault is folded into the error outcome
    /// after a best-effort sweep that fails the batch and its unfinished
    /// products. Re-invoking on a finished batch skips terminal products
    /// and converges on the same result without a second callback.
    pub async fn process_batch(&self, batch_id: &str) -> BatchOutcome {
        match self.drive(batch_id).await {
            Ok(()) => BatchOutcome::success(batch_id),
            Err(e) => {
                error!("Batch {} aborted: {}", batch_id, e);
                self.fail_batch(batch_id).await;
                BatchOutcome::error(batch_id, e.to_string())
            }
        }
    }

    async fn drive(&self, batch_id: &str) -> Result<()> {
        let batch = self
            .store
            .batch(batch_id)
            .await?
            .ok_or_else(|| Error::Storage(format!("batch {} not found", batch_id)))?;

        info!("Processing batch {} ({})", batch.id, batch.manifest_name);
        self.store
            .set_batch_status(batch_id, ProcessingStatus::Processing)
            .await?;

        let products = self.store.products(batch_id).await?;
        for product in &products {
            if product.status.is_terminal() {
                debug!("Skipping product {} already {}", product.id, product.status);
                continue;
            }

            self.processor.process(product).await?;
            recompute_batch_status(self.store.as_ref(), batch_id).await?;
        }

        // Converges the terminal status even when every product was skipped.
        let status = recompute_batch_status(self.store.as_ref(), batch_id).await?;
        info!("Batch {} finished as {}", batch_id, status);

        self.completion.notify_if_completed(batch_id).await?;
        Ok(())
    }

    /// Best-effort sweep after a fault: every unfinished product fails with
    /// placeholder outputs and the batch is forced to `failed`.
    async fn fail_batch(&self, batch_id: &str) {
        match self.store.batch(batch_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return,
            Err(e) => {
                error!("Could not load batch {} while failing it: {}", batch_id, e);
                return;
            }
        }

        let products = match self.store.products(batch_id).await {
            Ok(products) => products,
            Err(e) => {
                error!(
                    "Could not load products while failing batch {}: {}",
                    batch_id, e
                );
                return;
            }
        };

        let mut processed = 0;
        for product in &products {
            if product.status.is_terminal() {
                processed += 1;
                continue;
            }

            let placeholders = vec![String::new(); product.input_urls.len()];
            match self
                .store
                .finish_product(&product.id, placeholders, ProcessingStatus::Failed)
                .await
            {
                Ok(()) => processed += 1,
                Err(e) => error!("Could not fail product {}: {}", product.id, e),
            }
        }

        if let Err(e) = self
            .store
            .record_batch_progress(batch_id, processed, ProcessingStatus::Failed)
            .await
        {
            error!("Could not mark batch {} failed: {}", batch_id, e);
        }
    }
}
