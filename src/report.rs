//! Read-side views of batch state
//!
//! These are the JSON bodies an HTTP layer would serve for status and
//! detail queries; the worker binary prints them directly.

use crate::models::{completion_percentage, Batch, ProcessingStatus};
use crate::store::BatchStore;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub total_products: usize,
    pub processed_products: usize,
    pub percentage: f64,
}

/// Aggregate view of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub request_id: String,
    pub status: ProcessingStatus,
    pub progress: Progress,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product row inside [`BatchDetails`].
#[derive(Debug, Clone, Serialize)]
pub struct ProductReport {
    pub serial_number: i64,
    pub product_name: String,
    pub input_image_urls: Vec<String>,
    pub output_image_urls: Option<Vec<String>>,
    pub status: ProcessingStatus,
}

/// [`StatusReport`] plus per-product rows and manifest metadata.
#[derive(Debug, Clone, Serialize)]
pub struct BatchDetails {
    #[serde(flatten)]
    pub report: StatusReport,
    pub products: Vec<ProductReport>,
    pub csv_filename: String,
    pub total_products: usize,
    pub processed_products: usize,
    pub completion_percentage: f64,
}

fn status_message(status: ProcessingStatus) -> String {
    match status {
        ProcessingStatus::Pending => "Processing queued, not yet started",
        ProcessingStatus::Processing => "Processing in progress",
        ProcessingStatus::Completed => "Processing completed successfully",
        ProcessingStatus::Failed => "Processing failed",
    }
    .to_string()
}

fn report_for(batch: &Batch) -> StatusReport {
    StatusReport {
        request_id: batch.id.clone(),
        status: batch.status,
        progress: Progress {
            total_products: batch.total_products,
            processed_products: batch.processed_products,
            percentage: completion_percentage(batch.processed_products, batch.total_products),
        },
        message: status_message(batch.status),
        created_at: batch.created_at,
        updated_at: batch.updated_at,
    }
}

/// Aggregate status for one batch, `None` when the identifier is unknown.
pub async fn status_report(
    store: &dyn BatchStore,
    batch_id: &str,
) -> Result<Option<StatusReport>> {
    let batch = match store.batch(batch_id).await? {
        Some(batch) => batch,
        None => return Ok(None),
    };

    Ok(Some(report_for(&batch)))
}

/// Full detail view including every product, `None` when the identifier is
/// unknown.
pub async fn batch_details(
    store: &dyn BatchStore,
    batch_id: &str,
) -> Result<Option<BatchDetails>> {
    let batch = match store.batch(batch_id).await? {
        Some(batch) => batch,
        None => return Ok(None),
    };

    let products = store
        .products(batch_id)
        .await?
        .into_iter()
        .map(|p| ProductReport {
            serial_number: p.serial_number,
            product_name: p.name,
            input_image_urls: p.input_urls,
            output_image_urls: p.output_urls,
            status: p.status,
        })
        .collect();

    Ok(Some(BatchDetails {
        products,
        csv_filename: batch.manifest_name.clone(),
        total_products: batch.total_products,
        processed_products: batch.processed_products,
        completion_percentage: completion_percentage(
            batch.processed_products,
            batch.total_products,
        ),
        report: report_for(&batch),
    }))
}
