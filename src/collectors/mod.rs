//! Metrics Collectors
//!
//! One collector per exporter variant. Each collector fetches a fresh
//! document from its API, evaluates its metric tables against it, and hands
//! back the resulting families for a single scrape.
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Fetch the document(s) for this scrape
//! - Evaluate the static metric tables against them
//! - Return a [`Collection`] holding the families and the fetch status
//!
//! # Error Handling
//!
//! A failed fetch is non-fatal: it is logged as a warning and yields a
//! [`Collection`] with `CollectionStatus::Failed` and no families. Nothing
//! from a previous scrape is reused.

use crate::mapping::MetricFamily;
use tracing::{info, warn};

pub mod connection_server;
pub mod uag;

pub use connection_server::{collect_connection_server_metrics, ConnectionServerTables};
pub use uag::{collect_uag_metrics, uag_table};

/// Status of a metrics collection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// The API was reachable and the families reflect its data
    Success,
    /// Fetching failed (already logged as warning)
    Failed,
}

/// Families gathered by one scrape
#[derive(Debug, Clone)]
pub struct Collection {
    pub status: CollectionStatus,
    pub families: Vec<MetricFamily>,
}

impl Collection {
    pub fn failed() -> Self {
        Self {
            status: CollectionStatus::Failed,
            families: Vec::new(),
        }
    }
}

/// Helper to reduce boilerplate in collectors
///
/// Wraps API queries with consistent error handling:
/// - On success: maps the data to families, logs, returns `CollectionStatus::Success`
/// - On error: logs warning, returns `CollectionStatus::Failed` with no families
///
/// # Arguments
///
/// * `name` - Name of the data source (for logging)
/// * `query_future` - Async API call that returns data
/// * `process` - Function turning the data into metric families
pub async fn collect_with_handler<T, F, P, E>(name: &str, query_future: F, process: P) -> Collection
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnOnce(T) -> Vec<MetricFamily>,
{
    match query_future.await {
        Ok(data) => {
            let families = process(data);
            let samples: usize = families.iter().map(|f| f.samples.len()).sum();
            info!("Collected {} samples from {}", samples, name);
            Collection {
                status: CollectionStatus::Success,
                families,
            }
        }
        Err(e) => {
            warn!("Failed to query {}: {}", name, e);
            Collection::failed()
        }
    }
}
