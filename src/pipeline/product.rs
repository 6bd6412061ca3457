use crate::content::ContentService;
use crate::fetch::FetchService;
use crate::models::{ProcessingStatus, Product};
use crate::store::BatchStore;
use crate::transform::ImageTransformer;
use crate::Result;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

/// Runs one product's image references through fetch, transform and store.
///
/// A failed fetch or transform only blanks that reference's slot in the
/// output list; the product still completes. A content area fault fails the
/// whole product instead, and store faults propagate to the caller.
pub struct ProductProcessor {
    store: Arc<dyn BatchStore>,
    fetcher: Box<dyn FetchService>,
    transformer: ImageTransformer,
    content: Box<dyn ContentService>,
}

impl ProductProcessor {
    pub fn new(
        store: Arc<dyn BatchStore>,
        fetcher: Box<dyn FetchService>,
        transformer: ImageTransformer,
        content: Box<dyn ContentService>,
    ) -> Self {
        Self {
            store,
            fetcher,
            transformer,
            content,
        }
    }

    /// Processes the product to a terminal status and returns that status.
    ///
    /// The terminal write always carries an output list of the same length
    /// as the input list.
    pub async fn process(&self, product: &Product) -> Result<ProcessingStatus> {
        self.store.mark_product_processing(&product.id).await?;

        let mut outputs = Vec::with_capacity(product.input_urls.len());
        for url in &product.input_urls {
            let data = match self.fetcher.fetch(url).await {
                Ok(data) => data,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", url, e);
                    outputs.push(String::new());
                    continue;
                }
            };

            let jpeg = match self.transformer.transform(&data).await {
                Ok(jpeg) => jpeg,
                Err(e) => {
                    warn!("Failed to transform image from {}: {}", url, e);
                    outputs.push(String::new());
                    continue;
                }
            };

            let filename = format!("{}.jpg", Uuid::new_v4());
            match self.content.store_image(&filename, &jpeg).await {
                Ok(stored_url) => outputs.push(stored_url),
                Err(e) => {
                    error!(
                        "Content area fault while storing image for product {}: {}",
                        product.id, e
                    );
                    let placeholders = vec![String::new(); product.input_urls.len()];
                    self.store
                        .finish_product(&product.id, placeholders, ProcessingStatus::Failed)
                        .await?;
                    return Ok(ProcessingStatus::Failed);
                }
            }
        }

        self.store
            .finish_product(&product.id, outputs, ProcessingStatus::Completed)
            .await?;
        Ok(ProcessingStatus::Completed)
    }
}
