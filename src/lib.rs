//! Product-image processing pipeline for catalog manifests
//!
//! Ingests CSV manifests of products with remote image URLs, fetches and
//! re-encodes every image as JPEG, publishes the results under generated
//! names, and tracks completion per product and per batch. A completed
//! batch fires a one-time webhook callback.

pub mod content;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod transform;

pub use error::{Error, Result};
