//! Manifest parsing, batch ingestion and result rendering
//!
//! The manifest format is a three-column CSV where the last column is
//! itself a comma-separated URL list, so rows split on the first two
//! commas only and nothing is ever quoted. The result manifest keeps that
//! convention: placeholder entries keep their commas so the output column
//! stays positionally aligned with the input column.

use crate::models::{Batch, ProcessingStatus, Product};
use crate::store::BatchStore;
use crate::{Error, Result};
use tracing::info;

pub const MANIFEST_HEADER: &str = "S. No.,Product Name,Input Image Urls";
pub const RESULT_HEADER: &str = "S. No.,Product Name,Input Image Urls,Output Image Urls";

/// One validated manifest row.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRow {
    pub serial_number: i64,
    pub name: String,
    pub input_urls: Vec<String>,
}

/// Validates and parses manifest text into rows.
///
/// Row numbers in errors are 1-based data-row indices, not counting the
/// header line.
pub fn parse_manifest(text: &str) -> Result<Vec<ManifestRow>> {
    let mut lines = text.lines();
    let header = lines.next().map(str::trim).unwrap_or_default();
    if header != MANIFEST_HEADER {
        return Err(Error::Manifest("Invalid manifest header".to_string()));
    }

    let mut rows = Vec::new();
    for (idx, line) in lines.enumerate() {
        let row_no = idx + 1;
        let parts: Vec<&str> = line.trim().splitn(3, ',').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::Manifest(format!("Missing data in row {}", row_no)));
        }

        let serial_number = parts[0].trim().parse::<i64>().map_err(|_| {
            Error::Manifest(format!("Invalid serial number in row {}", row_no))
        })?;

        let input_urls: Vec<String> = parts[2].split(',').map(|u| u.trim().to_string()).collect();
        if input_urls.iter().any(|u| !u.starts_with("http")) {
            return Err(Error::Manifest(format!(
                "Invalid image URL format in row {}",
                row_no
            )));
        }

        rows.push(ManifestRow {
            serial_number,
            name: parts[1].to_string(),
            input_urls,
        });
    }

    if rows.is_empty() {
        return Err(Error::Manifest(
            "Manifest contains no product rows".to_string(),
        ));
    }

    Ok(rows)
}

fn validate_callback_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::Manifest("Invalid webhook URL format".to_string()))
    }
}

/// Parses `text` and persists the new batch together with its products.
///
/// Returns the generated batch identifier. The batch starts `pending`
/// with nothing processed; products keep their manifest row order as
/// ordinals.
pub async fn ingest_manifest(
    store: &dyn BatchStore,
    manifest_name: &str,
    text: &str,
    callback_url: Option<String>,
) -> Result<String> {
    if let Some(url) = &callback_url {
        validate_callback_url(url)?;
    }

    let rows = parse_manifest(text)?;
    let total = rows.len();

    let batch = Batch::new(manifest_name.to_string(), total, callback_url);
    let batch_id = batch.id.clone();
    let products = rows
        .into_iter()
        .enumerate()
        .map(|(ordinal, row)| {
            Product::new(
                batch_id.clone(),
                ordinal,
                row.serial_number,
                row.name,
                row.input_urls,
            )
        })
        .collect();

    store.insert_batch(batch, products).await?;
    info!(
        "Ingested manifest {} as batch {} ({} products)",
        manifest_name, batch_id, total
    );

    Ok(batch_id)
}

/// Renders the downloadable result rows for a completed batch.
pub fn render_result_manifest(batch: &Batch, products: &[Product]) -> Result<String> {
    if batch.status != ProcessingStatus::Completed {
        return Err(Error::Manifest(
            "CSV is only available for completed requests".to_string(),
        ));
    }

    let mut out = String::from(RESULT_HEADER);
    out.push('\n');
    for product in products {
        let outputs = match &product.output_urls {
            Some(urls) => urls.join(","),
            // Terminal products always carry outputs; keep alignment anyway.
            None => vec![""; product.input_urls.len()].join(","),
        };
        out.push_str(&format!(
            "{},{},{},{}\n",
            product.serial_number,
            product.name,
            product.input_urls.join(","),
            outputs
        ));
    }

    Ok(out)
}
