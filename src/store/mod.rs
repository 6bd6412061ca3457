//! Persistence boundary for batches and their products
//!
//! The pipeline talks to storage exclusively through [`BatchStore`]; a
//! relational implementation lives behind this trait in deployments that
//! need durable state. Every method is a single committed write, so batch
//! and product state stays observable between pipeline steps.

pub mod memory;

pub use memory::MemoryStore;

use crate::models::{Batch, Product, ProcessingStatus};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Persist a new batch together with all of its products.
    async fn insert_batch(&self, batch: Batch, products: Vec<Product>) -> Result<()>;

    /// Load a batch by identifier.
    async fn batch(&self, batch_id: &str) -> Result<Option<Batch>>;

    /// Load a batch's products in ordinal (manifest row) order.
    async fn products(&self, batch_id: &str) -> Result<Vec<Product>>;

    /// Move a product to `processing`.
    async fn mark_product_processing(&self, product_id: &str) -> Result<()>;

    /// Record a product's output list and terminal status in one write.
    async fn finish_product(
        &self,
        product_id: &str,
        outputs: Vec<String>,
        status: ProcessingStatus,
    ) -> Result<()>;

    /// Set a batch's aggregate status.
    async fn set_batch_status(&self, batch_id: &str, status: ProcessingStatus) -> Result<()>;

    /// Record a batch's processed count and aggregate status in one write.
    async fn record_batch_progress(
        &self,
        batch_id: &str,
        processed: usize,
        status: ProcessingStatus,
    ) -> Result<()>;

    /// Flip the batch's notification-sent flag to true.
    async fn mark_notified(&self, batch_id: &str) -> Result<()>;
}
