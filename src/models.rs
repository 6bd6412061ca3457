//! Data models and structures
//!
//! Defines the core data structures for batches, products, webhook
//! payloads, and worker configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Processing state shared by batches and products.
///
/// Transitions are forward-only: `Pending -> Processing -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested manifest and its aggregate processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub status: ProcessingStatus,
    pub manifest_name: String,
    pub total_products: usize,
    pub processed_products: usize,
    pub callback_url: Option<String>,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    pub fn new(manifest_name: String, total_products: usize, callback_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: ProcessingStatus::Pending,
            manifest_name,
            total_products,
            processed_products: 0,
            callback_url,
            notified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One manifest row: a product with one or more source image URLs.
///
/// `output_urls` stays `None` until the product reaches a terminal status;
/// from then on it has the same length as `input_urls`, with empty strings
/// marking references that failed fetch or transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub batch_id: String,
    pub ordinal: usize,
    pub serial_number: i64,
    pub name: String,
    pub input_urls: Vec<String>,
    pub output_urls: Option<Vec<String>>,
    pub status: ProcessingStatus,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        batch_id: String,
        ordinal: usize,
        serial_number: i64,
        name: String,
        input_urls: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            batch_id,
            ordinal,
            serial_number,
            name,
            input_urls,
            output_urls: None,
            status: ProcessingStatus::Pending,
            updated_at: Utc::now(),
        }
    }
}

/// JSON body delivered to the completion callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub request_id: String,
    pub status: ProcessingStatus,
    pub total_products: usize,
    pub processed_products: usize,
    pub completion_percentage: f64,
    pub timestamp: String,
}

/// Progress ratio as a percentage, 0 when the batch is empty.
pub fn completion_percentage(processed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        processed as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Result object handed back to whatever dispatched the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub status: OutcomeStatus,
    pub batch_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn success(batch_id: &str) -> Self {
        Self {
            status: OutcomeStatus::Success,
            batch_id: batch_id.to_string(),
            error: None,
        }
    }

    pub fn error(batch_id: &str, error: String) -> Self {
        Self {
            status: OutcomeStatus::Error,
            batch_id: batch_id.to_string(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub image_quality: u8,
    pub base_url: String,
    pub webhook_url: Option<String>,
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub webhook_timeout: Duration,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let image_quality = match std::env::var("IMAGE_QUALITY") {
            Ok(raw) => raw.parse::<u8>().map_err(|_| {
                crate::Error::Config(format!("IMAGE_QUALITY must be an integer, got '{}'", raw))
            })?,
            Err(_) => 50,
        };
        if !(1..=100).contains(&image_quality) {
            return Err(crate::Error::Config(format!(
                "IMAGE_QUALITY must be between 1 and 100, got {}",
                image_quality
            )));
        }

        let data_dir =
            PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        Ok(Self {
            image_quality,
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            webhook_url: std::env::var("WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            upload_dir: data_dir.join("uploads"),
            processed_dir: data_dir.join("processed"),
            fetch_timeout: Duration::from_secs(parse_secs("FETCH_TIMEOUT_SECS", 30)?),
            webhook_timeout: Duration::from_secs(parse_secs("WEBHOOK_TIMEOUT_SECS", 10)?),
        })
    }
}

fn parse_secs(var: &str, default: u64) -> crate::Result<u64> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| crate::Error::Config(format!("{} must be an integer, got '{}'", var, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ProcessingStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");

        let parsed: ProcessingStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, ProcessingStatus::Failed);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!ProcessingStatus::Pending.is_terminal());
        assert!(!ProcessingStatus::Processing.is_terminal());
        assert!(ProcessingStatus::Completed.is_terminal());
        assert!(ProcessingStatus::Failed.is_terminal());
    }

    #[test]
    fn test_new_batch_starts_pending() {
        let batch = Batch::new("products.csv".to_string(), 3, None);

        assert_eq!(batch.status, ProcessingStatus::Pending);
        assert_eq!(batch.total_products, 3);
        assert_eq!(batch.processed_products, 0);
        assert!(!batch.notified);
        assert!(!batch.id.is_empty());
    }

    #[test]
    fn test_new_product_has_no_outputs() {
        let product = Product::new(
            "batch-1".to_string(),
            0,
            1,
            "Widget".to_string(),
            vec!["http://example.com/a.jpg".to_string()],
        );

        assert_eq!(product.status, ProcessingStatus::Pending);
        assert!(product.output_urls.is_none());
        assert_eq!(product.input_urls.len(), 1);
    }

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(1, 2), 50.0);
        assert_eq!(completion_percentage(2, 2), 100.0);
    }

    #[test]
    fn test_callback_payload_field_names() {
        let payload = CallbackPayload {
            request_id: "abc".to_string(),
            status: ProcessingStatus::Completed,
            total_products: 2,
            processed_products: 2,
            completion_percentage: 100.0,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"request_id\":\"abc\""));
        assert!(json.contains("\"status\":\"completed\""));
        assert!(json.contains("\"total_products\":2"));
        assert!(json.contains("\"processed_products\":2"));
        assert!(json.contains("\"completion_percentage\":100.0"));
    }

    #[test]
    fn test_batch_outcome_serialization() {
        let ok = BatchOutcome::success("b-1");
        let json = serde_json::to_string(&ok).unwrap();
        assert_eq!(json, "{\"status\":\"success\",\"batchId\":\"b-1\"}");
        assert!(ok.is_success());

        let err = BatchOutcome::error("b-2", "store unavailable".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"error\":\"store unavailable\""));
        assert!(!err.is_success());
    }
}
