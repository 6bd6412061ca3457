//! Batch processing pipeline
//!
//! [`BatchRunner`] drives one batch end to end: every product is processed
//! in ordinal order by [`ProductProcessor`], the batch status is recomputed
//! after each product, and [`CompletionNotifier`] fires the completion
//! callback once the batch completes.

pub mod completion;
pub mod product;
pub mod runner;
pub mod status;

pub use completion::CompletionNotifier;
pub use product::ProductProcessor;
pub use runner::{BatchRunner, PipelineServices};
pub use status::recompute_batch_status;
