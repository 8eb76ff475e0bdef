//! Unified Access Gateway Metrics Collector
//!
//! Maps the `accessPointStatusAndStats` document of a UAG onto metrics.
//!
//! # Metrics Produced
//! - `horizon_uag_status_info`, `horizon_uag_version_info` - Overall status and version
//! - `horizon_uag_*session_count`, `horizon_uag_open_incoming_connection_count`,
//!   `horizon_uag_connection_high_water_mark` - Session and connection gauges
//! - `horizon_uag_backend_status_info`, `horizon_uag_edge_service_status_info` - Edge service health
//! - `horizon_uag_edge_service_*` - Edge service session stats
//!   - Labels: identifier
//! - `horizon_uag_protocol_*` - Per-protocol status and sessions
//!   - Labels: name
//! - `horizon_uag_appliance_*` - Appliance memory and CPU

use super::{collect_with_handler, Collection};
use crate::error::{ExporterError, Result};
use crate::horizon::UagClient;
use crate::mapping::{FamilySet, MetricDescriptor, MetricFamily, MetricTable};
use serde_json::Value;
use tracing::debug;

/// Root element of the monitor document
pub const UAG_ROOT: &str = "accessPointStatusAndStats";

const EDGE_SESSIONS: [&str; 2] = ["viewEdgeServiceStats", "edgeServiceSessionStats"];
const IDENTIFIER: [&str; 3] = [
    "viewEdgeServiceStats",
    "edgeServiceSessionStats",
    "identifier",
];
const PROTOCOL: [&str; 2] = ["viewEdgeServiceStats", "protocol"];

fn edge_session_gauge(name: &str, help: &str, field: &str) -> Result<MetricDescriptor> {
    let [service, stats] = EDGE_SESSIONS;
    MetricDescriptor::gauge(name, help, [service, stats, field])
        .label_path(IDENTIFIER, "identifier")
        .build()
}

fn protocol_gauge(name: &str, help: &str, field: &str) -> Result<MetricDescriptor> {
    MetricDescriptor::gauge(name, help, PROTOCOL)
        .records()
        .record_label("@name", "name")
        .field(field)
        .build()
}

/// Descriptor table for the UAG monitor document
pub fn uag_table() -> Result<MetricTable> {
    MetricTable::new(
        &[],
        vec![
            MetricDescriptor::info(
                "horizon_uag_status",
                "VMware UAG Overall Status",
                ["overAllStatus"],
                &["status"],
            )
            .build()?,
            MetricDescriptor::info(
                "horizon_uag_version",
                "VMware UAG Version",
                ["uagVersion"],
                &["version"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_uag_session_count",
                "VMware UAG Session Count",
                ["sessionCount"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_uag_authenticated_session_count",
                "VMware UAG Authenticated Session Count",
                ["authenticatedSessionCount"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_uag_authenticated_view_session_count",
                "VMware UAG Authenticated View Session Count",
                ["authenticatedViewSessionCount"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_uag_open_incoming_connection_count",
                "VMware UAG Open Incoming Connection Count",
                ["openIncomingConnectionCount"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_uag_connection_high_water_mark",
                "VMware UAG Connection High Water Mark",
                ["highWaterMark"],
            )
            .build()?,
            MetricDescriptor::info(
                "horizon_uag_backend_status",
                "VMware UAG Backend Status",
                ["viewEdgeServiceStats", "backendStatus"],
                &["reason", "status"],
            )
            .scalar_key("status")
            .build()?,
            MetricDescriptor::info(
                "horizon_uag_edge_service_status",
                "VMware UAG Edge Service Status",
                ["viewEdgeServiceStats", "edgeServiceStatus"],
                &["status"],
            )
            .build()?,
            edge_session_gauge(
                "horizon_uag_edge_service_total_sessions",
                "VMware UAG Edge Service Total Sessions",
                "totalSessions",
            )?,
            edge_session_gauge(
                "horizon_uag_edge_service_authenticated_sessions",
                "VMware UAG Edge Service Authenticated Sessions",
                "authenticatedSessions",
            )?,
            edge_session_gauge(
                "horizon_uag_edge_service_unauthenticated_sessions",
                "VMware UAG Edge Service Unauthenticated Sessions",
                "unauthenticatedSessions",
            )?,
            edge_session_gauge(
                "horizon_uag_edge_service_failed_login_attempts",
                "VMware UAG Edge Service Failed Login Attempts",
                "failedLoginAttempts",
            )?,
            edge_session_gauge(
                "horizon_uag_edge_service_user_count",
                "VMware UAG Edge Service User Count",
                "userCount",
            )?,
            MetricDescriptor::info(
                "horizon_uag_protocol_status",
                "VMware UAG Protocol Status",
                PROTOCOL,
                &["reason", "status"],
            )
            .records()
            .record_label("@name", "name")
            .field("status")
            .scalar_key("status")
            .build()?,
            protocol_gauge(
                "horizon_uag_protocol_sessions",
                "VMware UAG Protocol Sessions",
                "sessions",
            )?,
            protocol_gauge(
                "horizon_uag_protocol_max_sessions",
                "VMware UAG Protocol Max Sessions",
                "maxSessions",
            )?,
            protocol_gauge(
                "horizon_uag_protocol_unrecognized_requests_count",
                "VMware UAG Protocol Unrecognized Requests Count",
                "unrecognizedRequestsCount",
            )?,
            MetricDescriptor::gauge(
                "horizon_uag_appliance_mem_free",
                "VMware UAG Appliance Free Memory in Mb",
                ["applianceStats", "freeMemoryMb"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_uag_appliance_mem_total",
                "VMware UAG Appliance Total Memory in Mb",
                ["applianceStats", "totalMemoryMb"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_uag_appliance_cpu_load",
                "VMware UAG Appliance Total CPU Load in Percent",
                ["applianceStats", "totalCpuLoadPercent"],
            )
            .build()?,
        ],
    )
}

/// Take the statistics element out of a decoded monitor document
pub fn stats_root(document: Value) -> Result<Value> {
    match document {
        Value::Object(mut map) => map
            .remove(UAG_ROOT)
            .ok_or_else(|| ExporterError::PathNotFound(UAG_ROOT.to_string())),
        _ => Err(ExporterError::PathNotFound(UAG_ROOT.to_string())),
    }
}

/// Evaluate the UAG table against the statistics element
pub fn evaluate_uag_stats(table: &MetricTable, stats: &Value) -> Vec<MetricFamily> {
    let mut set = FamilySet::new(table);
    let summary = set.evaluate(stats, &[]);
    debug!(
        "Evaluated UAG statistics: {} samples, {} absent, {} dropped",
        summary.emitted, summary.absent, summary.dropped
    );
    set.into_families()
}

/// Collects UAG metrics for one scrape of `target`
///
/// # Returns
///
/// A [`Collection`] with `CollectionStatus::Failed` and no families when the
/// gateway is unreachable, rejects the credentials, or returns a document
/// without the statistics element.
pub async fn collect_uag_metrics(
    client: &UagClient,
    table: &MetricTable,
    target: &str,
) -> Collection {
    collect_with_handler(
        &format!("UAG {}", target),
        async { stats_root(client.monitor_stats(target).await?) },
        |stats| evaluate_uag_stats(table, &stats),
    )
    .await
}
