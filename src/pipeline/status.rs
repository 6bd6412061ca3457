use crate::models::ProcessingStatus;
use crate::store::BatchStore;
use crate::{Error, Result};

/// Recomputes a batch's aggregate status from its products and persists it.
///
/// `processed` counts terminal products, completed and failed alike. The
/// batch fails only when every product failed; a single completed product
/// among failures still completes the batch. Calling this again after the
/// batch is terminal recomputes the same values, so re-runs are harmless.
pub async fn recompute_batch_status(
    store: &dyn BatchStore,
    batch_id: &str,
) -> Result<ProcessingStatus> {
    let batch = store
        .batch(batch_id)
        .await?
        .ok_or_else(|| Error::Storage(format!("batch {} not found", batch_id)))?;

    let products = store.products(batch_id).await?;
    let total = products.len();
    let completed = products
        .iter()
        .filter(|p| p.status == ProcessingStatus::Completed)
        .count();
    let failed = products
        .iter()
        .filter(|p| p.status == ProcessingStatus::Failed)
        .count();
    let processed = completed + failed;

    let status = if processed == total {
        if failed > 0 && completed == 0 {
            ProcessingStatus::Failed
        } else {
            ProcessingStatus::Completed
        }
    } else if processed > 0 {
        ProcessingStatus::Processing
    } else {
        batch.status
    };

    store
        .record_batch_progress(batch_id, processed, status)
        .await?;

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Batch, Product};
    use crate::store::MemoryStore;

    async fn seed(store: &MemoryStore, statuses: &[ProcessingStatus]) -> String {
        let batch = Batch::new("products.csv".to_string(), statuses.len(), None);
        let batch_id = batch.id.clone();
        let products: Vec<Product> = statuses
            .iter()
            .enumerate()
            .map(|(i, _)| {
                Product::new(
                    batch_id.clone(),
                    i,
                    i as i64 + 1,
                    format!("Product {}", i + 1),
                    vec![format!("http://images.test/{}.png", i)],
                )
            })
            .collect();
        let ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
        store.insert_batch(batch, products).await.unwrap();

        for (id, status) in ids.iter().zip(statuses) {
            match status {
                ProcessingStatus::Pending => {}
                ProcessingStatus::Processing => {
                    store.mark_product_processing(id).await.unwrap();
                }
                terminal => {
                    store
                        .finish_product(id, vec![String::new()], *terminal)
                        .await
                        .unwrap();
                }
            }
        }
        batch_id
    }

    #[tokio::test]
    async fn test_no_terminal_products_keeps_current_status() {
        let store = MemoryStore::new();
        let batch_id = seed(
            &store,
            &[ProcessingStatus::Pending, ProcessingStatus::Pending],
        )
        .await;

        let status = recompute_batch_status(&store, &batch_id).await.unwrap();

        assert_eq!(status, ProcessingStatus::Pending);
        let batch = store.batch(&batch_id).await.unwrap().unwrap();
        assert_eq!(batch.processed_products, 0);
    }

    #[tokio::test]
    async fn test_partial_progress_is_processing() {
        let store = MemoryStore::new();
        let batch_id = seed(
            &store,
            &[ProcessingStatus::Completed, ProcessingStatus::Pending],
        )
        .await;

        let status = recompute_batch_status(&store, &batch_id).await.unwrap();

        assert_eq!(status, ProcessingStatus::Processing);
        let batch = store.batch(&batch_id).await.unwrap().unwrap();
        assert_eq!(batch.processed_products, 1);
    }

    #[tokio::test]
    async fn test_all_completed_is_completed() {
        let store = MemoryStore::new();
        let batch_id = seed(
            &store,
            &[ProcessingStatus::Completed, ProcessingStatus::Completed],
        )
        .await;

        let status = recompute_batch_status(&store, &batch_id).await.unwrap();

        assert_eq!(status, ProcessingStatus::Completed);
        let batch = store.batch(&batch_id).await.unwrap().unwrap();
        assert_eq!(batch.processed_products, 2);
    }

    #[tokio::test]
    async fn test_mixed_terminal_statuses_complete_the_batch() {
        let store = MemoryStore::new();
        let batch_id = seed(
            &store,
            &[
                ProcessingStatus::Completed,
                ProcessingStatus::Failed,
                ProcessingStatus::Failed,
            ],
        )
        .await;

        let status = recompute_batch_status(&store, &batch_id).await.unwrap();

        assert_eq!(status, ProcessingStatus::Completed);
        let batch = store.batch(&batch_id).await.unwrap().unwrap();
        assert_eq!(batch.processed_products, 3);
    }

    #[tokio::test]
    async fn test_all_failed_fails_the_batch() {
        let store = MemoryStore::new();
        let batch_id = seed(
            &store,
            &[ProcessingStatus::Failed, ProcessingStatus::Failed],
        )
        .await;

        let status = recompute_batch_status(&store, &batch_id).await.unwrap();

        assert_eq!(status, ProcessingStatus::Failed);
    }

    #[tokio::test]
    async fn test_batch_without_products_aggregates_to_completed() {
        let store = MemoryStore::new();
        let batch = Batch::new("products.csv".to_string(), 0, None);
        let batch_id = batch.id.clone();
        store.insert_batch(batch, vec![]).await.unwrap();

        let status = recompute_batch_status(&store, &batch_id).await.unwrap();

        assert_eq!(status, ProcessingStatus::Completed);
        let batch = store.batch(&batch_id).await.unwrap().unwrap();
        assert_eq!(batch.processed_products, 0);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let store = MemoryStore::new();
        let batch_id = seed(
            &store,
            &[ProcessingStatus::Completed, ProcessingStatus::Failed],
        )
        .await;

        let first = recompute_batch_status(&store, &batch_id).await.unwrap();
        let second = recompute_batch_status(&store, &batch_id).await.unwrap();

        assert_eq!(first, ProcessingStatus::Completed);
        assert_eq!(second, ProcessingStatus::Completed);
        let batch = store.batch(&batch_id).await.unwrap().unwrap();
        assert_eq!(batch.processed_products, 2);
    }

    #[tokio::test]
    async fn test_unknown_batch_is_storage_error() {
        let store = MemoryStore::new();

        let result = recompute_batch_status(&store, "no-such-batch").await;

        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
