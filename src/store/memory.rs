use super::BatchStore;
use crate::models::{Batch, Product, ProcessingStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process [`BatchStore`] over mutex-guarded maps.
///
/// Backs single-process worker runs and tests. State does not survive the
/// process; deployments that need durability put a database behind the
/// same trait.
pub struct MemoryStore {
    batches: Mutex<HashMap<String, Batch>>,
    products: Mutex<Vec<Product>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(HashMap::new()),
            products: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchStore for MemoryStore {
    async fn insert_batch(&self, batch: Batch, products: Vec<Product>) -> Result<()> {
        let mut batches = self.batches.lock().unwrap();
        if batches.contains_key(&batch.id) {
            return Err(Error::Storage(format!(
                "batch {} already exists",
                batch.id
            )));
        }
        batches.insert(batch.id.clone(), batch);
        self.products.lock().unwrap().extend(products);
        Ok(())
    }

    async fn batch(&self, batch_id: &str) -> Result<Option<Batch>> {
        Ok(self.batches.lock().unwrap().get(batch_id).cloned())
    }

    async fn products(&self, batch_id: &str) -> Result<Vec<Product>> {
        let mut rows: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.batch_id == batch_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.ordinal);
        Ok(rows)
    }

    async fn mark_product_processing(&self, product_id: &str) -> Result<()> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| Error::Storage(format!("product {} not found", product_id)))?;
        product.status = ProcessingStatus::Processing;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn finish_product(
        &self,
        product_id: &str,
        outputs: Vec<String>,
        status: ProcessingStatus,
    ) -> Result<()> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| Error::Storage(format!("product {} not found", product_id)))?;
        product.output_urls = Some(outputs);
        product.status = status;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn set_batch_status(&self, batch_id: &str, status: ProcessingStatus) -> Result<()> {
        let mut batches = self.batches.lock().unwrap();
        let batch = batches
            .get_mut(batch_id)
            .ok_or_else(|| Error::Storage(format!("batch {} not found", batch_id)))?;
        batch.status = status;
        batch.updated_at = Utc::now();
        Ok(())
    }

    async fn record_batch_progress(
        &self,
        batch_id: &str,
        processed: usize,
        status: ProcessingStatus,
    ) -> Result<()> {
        let mut batches = self.batches.lock().unwrap();
        let batch = batches
            .get_mut(batch_id)
            .ok_or_else(|| Error::Storage(format!("batch {} not found", batch_id)))?;
        batch.processed_products = processed;
        batch.status = status;
        batch.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_notified(&self, batch_id: &str) -> Result<()> {
        let mut batches = self.batches.lock().unwrap();
        let batch = batches
            .get_mut(batch_id)
            .ok_or_else(|| Error::Storage(format!("batch {} not found", batch_id)))?;
        batch.notified = true;
        batch.updated_at = Utc::now();
        Ok(())
    }
}
