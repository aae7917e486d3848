//! Access to the Copernicus Climate Data Store.

pub mod client;
pub mod config;
pub mod error;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

pub use client::{CdsClient, PollPolicy};
pub use config::Credentials;
pub use error::CdsError;

use crate::request::RetrievalRequest;

/// Fetches one request from a dataset and writes the result to `target`.
///
/// Returns once the file is in place. Nothing is written to `target` on
/// failure.
#[async_trait]
pub trait Retrieve: Send + Sync {
    async fn retrieve(&self, dataset: &str, request: &RetrievalRequest, target: &Path)
        -> Result<()>;
}
