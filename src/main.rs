use anyhow::Result;
use catalog_image_worker::manifest::{ingest_manifest, render_result_manifest};
use catalog_image_worker::models::{Config, ProcessingStatus};
use catalog_image_worker::pipeline::BatchRunner;
use catalog_image_worker::report::status_report;
use catalog_image_worker::store::{BatchStore, MemoryStore};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "catalog-image-worker")]
#[command(about = "Process product image manifests")]
struct CliArgs {
    /// CSV manifests to ingest and process.
    #[arg(value_name = "MANIFEST", required = true)]
    manifests: Vec<PathBuf>,

    /// Completion callback URL attached to every ingested batch.
    #[arg(long, value_name = "URL")]
    callback_url: Option<String>,

    /// JPEG quality override, otherwise IMAGE_QUALITY (default 50).
    #[arg(long, value_name = "N", value_parser = parse_quality_arg)]
    quality: Option<u8>,
}

fn parse_quality_arg(input: &str) -> std::result::Result<u8, String> {
    input
        .parse::<u8>()
        .ok()
        .filter(|q| (1..=100).contains(q))
        .ok_or_else(|| format!("Invalid quality '{}'. Expected an integer 1-100", input))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_image_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting catalog-image-worker");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(quality) = args.quality {
        config.image_quality = quality;
    }

    if let Err(e) = fs::create_dir_all(&config.upload_dir) {
        error!(
            "Could not create upload directory {}: {}",
            config.upload_dir.display(),
            e
        );
        std::process::exit(1);
    }

    let store: Arc<dyn BatchStore> = Arc::new(MemoryStore::new());
    let runner = match BatchRunner::from_config(store.clone(), &config) {
        Ok(runner) => Arc::new(runner),
        Err(e) => {
            error!("Failed to initialize pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let mut batch_ids = Vec::new();
    for manifest_path in &args.manifests {
        let text = match tokio::fs::read_to_string(manifest_path).await {
            Ok(text) => text,
            Err(e) => {
                error!("Could not read {}: {}", manifest_path.display(), e);
                std::process::exit(1);
            }
        };
        let name = manifest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| manifest_path.display().to_string());

        match ingest_manifest(store.as_ref(), &name, &text, args.callback_url.clone()).await {
            Ok(batch_id) => batch_ids.push(batch_id),
            Err(e) => {
                error!("Could not ingest {}: {}", manifest_path.display(), e);
                std::process::exit(1);
            }
        }
    }

    // One task per batch; products within a batch stay sequential.
    let mut handles = Vec::new();
    for batch_id in batch_ids {
        let runner = runner.clone();
        handles.push(tokio::spawn(async move {
            let outcome = runner.process_batch(&batch_id).await;
            (batch_id, outcome)
        }));
    }

    let mut any_failed = false;
    for handle in handles {
        let (batch_id, outcome) = match handle.await {
            Ok(pair) => pair,
            Err(e) => {
                error!("Batch task panicked: {}", e);
                any_failed = true;
                continue;
            }
        };

        if let Some(report) = status_report(store.as_ref(), &batch_id).await? {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        if !outcome.is_success() {
            error!(
                "Batch {} failed: {}",
                batch_id,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            any_failed = true;
            continue;
        }

        if let Some(batch) = store.batch(&batch_id).await? {
            if batch.status == ProcessingStatus::Completed {
                let products = store.products(&batch_id).await?;
                let csv = render_result_manifest(&batch, &products)?;
                let path = config.upload_dir.join(format!("output_{}.csv", batch_id));
                fs::write(&path, csv)?;
                info!("Wrote result manifest to {}", path.display());
            }
        }
    }

    if any_failed {
        std::process::exit(1);
    }

    info!("All batches processed");
    Ok(())
}
