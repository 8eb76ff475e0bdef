//! Connection Server Metrics Collector
//!
//! Collects gateway and connection server monitoring data from a Horizon
//! connection server. Each resource group has its own descriptor table, which
//! is evaluated once per resource instance with the instance name bound to
//! the `name` label.
//!
//! # Metrics Produced
//! - `horizon_gateway_*` - Gateway connection counts, details, status
//!   - Labels: name
//! - `horizon_connection_server_*` - Connection server counts, details, status,
//!   replication, services, certificate validity
//!   - Labels: name

use super::{collect_with_handler, Collection};
use crate::error::{ExporterError, Result};
use crate::horizon::ConnectionServerClient;
use crate::mapping::{
    as_records, label_value, EvaluationSummary, FamilySet, MetricDescriptor, MetricFamily,
    MetricTable,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Structural label holding the resource instance name
const NAME: &str = "name";

/// Descriptor tables of the connection server exporter
#[derive(Debug, Clone)]
pub struct ConnectionServerTables {
    pub gateways: MetricTable,
    pub connection_servers: MetricTable,
}

impl ConnectionServerTables {
    pub fn new() -> Result<Self> {
        Ok(Self {
            gateways: gateway_table()?,
            connection_servers: connection_server_table()?,
        })
    }
}

fn gauge(name: &str, help: &str, field: &str) -> Result<MetricDescriptor> {
    MetricDescriptor::gauge(name, help, field).build()
}

/// Descriptors evaluated against each record of `/rest/monitor/v3/gateways`
pub fn gateway_table() -> Result<MetricTable> {
    MetricTable::new(
        &[NAME],
        vec![
            gauge(
                "horizon_gateway_active_connection_count",
                "VMware Horizon Gateway Active Connection Count",
                "active_connection_count",
            )?,
            gauge(
                "horizon_gateway_pcoip_connection_count",
                "VMware Horizon Gateway PCoIP Connection Count",
                "pcoip_connection_count",
            )?,
            gauge(
                "horizon_gateway_blast_connection_count",
                "VMware Horizon Gateway Blast Connection Count",
                "blast_connection_count",
            )?,
            gauge(
                "horizon_gateway_unrecognized_pcoip_requests_count",
                "VMware Horizon Gateway Unrecognized PCoIP Requests Count",
                "unrecognized_pcoip_requests_count",
            )?,
            gauge(
                "horizon_gateway_unrecognized_tunnel_requests_count",
                "VMware Horizon Gateway Unrecognized Tunnel Requests Count",
                "unrecognized_tunnel_requests_count",
            )?,
            gauge(
                "horizon_gateway_unrecognized_xmlapi_requests_count",
                "VMware Horizon Gateway Unrecognized XML API Requests Count",
                "unrecognized_xmlapi_requests_count",
            )?,
            MetricDescriptor::info(
                "horizon_gateway",
                "VMware Horizon Gateway Internal Details",
                "details",
                &["type", "address", "internal", "version"],
            )
            .scalar_key("version")
            .build()?,
            MetricDescriptor::info(
                "horizon_gateway_status",
                "VMware Horizon Gateway Status",
                "status",
                &["status"],
            )
            .build()?,
            gauge(
                "horizon_gateway_last_updated",
                "VMware Horizon Gateway last updated",
                "last_updated_timestamp",
            )?,
        ],
    )
}

/// Descriptors evaluated against each record of `/rest/monitor/v3/connection-servers`
pub fn connection_server_table() -> Result<MetricTable> {
    MetricTable::new(
        &[NAME],
        vec![
            gauge(
                "horizon_connection_server_connection_count",
                "VMware Horizon Connection Server Connection Count",
                "connection_count",
            )?,
            gauge(
                "horizon_connection_server_tunnel_connection_count",
                "VMware Horizon Connection Server Tunnel Connection Count",
                "tunnel_connection_count",
            )?,
            gauge(
                "horizon_connection_server_unrecognized_pcoip_requests_count",
                "VMware Horizon Connection Server Unrecognized PCoIP Requests Count",
                "unrecognized_pcoip_requests_count",
            )?,
            gauge(
                "horizon_connection_server_unrecognized_tunnel_requests_count",
                "VMware Horizon Connection Server Unrecognized Tunnel Requests Count",
                "unrecognized_tunnel_requests_count",
            )?,
            gauge(
                "horizon_connection_server_unrecognized_xmlapi_requests_count",
                "VMware Horizon Connection Server Unrecognized XML API Requests Count",
                "unrecognized_xmlapi_requests_count",
            )?,
            MetricDescriptor::info(
                "horizon_connection_server",
                "VMware Horizon Connection Server Internal Details",
                "details",
                &["build", "version"],
            )
            .scalar_key("version")
            .build()?,
            MetricDescriptor::info(
                "horizon_connection_server_status",
                "VMware Horizon Connection Server Status",
                "status",
                &["status"],
            )
            .build()?,
            MetricDescriptor::info(
                "horizon_connection_server_replication",
                "VMware Horizon Connection Server Replication Info",
                "cs_replications",
                &["server_name", "status"],
            )
            .scalar_key("status")
            .build()?,
            MetricDescriptor::info(
                "horizon_connection_server_service",
                "VMware Horizon Connection Server Service Info",
                "services",
                &["service_name", "status"],
            )
            .scalar_key("status")
            .build()?,
            MetricDescriptor::gauge(
                "horizon_connection_server_certificate_valid_from",
                "VMware Horizon Connection Server Certificate Valid From",
                ["certificate", "valid_from"],
            )
            .build()?,
            MetricDescriptor::gauge(
                "horizon_connection_server_certificate_valid_to",
                "VMware Horizon Connection Server Certificate Valid To",
                ["certificate", "valid_to"],
            )
            .build()?,
            gauge(
                "horizon_connection_server_last_updated",
                "VMware Horizon Connection Server last updated",
                "last_updated_timestamp",
            )?,
        ],
    )
}

/// Evaluate `table` once per resource record in `document`
///
/// Records without a `name` cannot be labelled and are skipped.
pub fn evaluate_resources(
    table: &MetricTable,
    kind: &str,
    document: &Value,
) -> Vec<MetricFamily> {
    let mut set = FamilySet::new(table);
    let mut summary = EvaluationSummary::default();

    for record in as_records(document) {
        match record.get(NAME).filter(|name| !name.is_null()) {
            Some(name) => summary += set.evaluate(record, &[label_value(name)]),
            None => warn!("Skipping {} record without a name", kind),
        }
    }

    debug!(
        "Evaluated {}: {} samples, {} absent, {} dropped",
        kind, summary.emitted, summary.absent, summary.dropped
    );
    set.into_families()
}

/// Collects gateway and connection server metrics for one scrape
///
/// Both lists are fetched before any mapping happens; if either request
/// fails the whole scrape is reported as failed.
pub async fn collect_connection_server_metrics(
    client: &ConnectionServerClient,
    tables: &ConnectionServerTables,
) -> Collection {
    collect_with_handler(
        "connection server",
        async {
            let gateways = client.monitor_gateways().await?;
            let connection_servers = client.monitor_connection_servers().await?;
            Ok::<_, ExporterError>((gateways, connection_servers))
        },
        |(gateways, connection_servers)| {
            let mut families = evaluate_resources(&tables.gateways, "gateway", &gateways);
            families.extend(evaluate_resources(
                &tables.connection_servers,
                "connection server",
                &connection_servers,
            ));
            families
        },
    )
    .await
}
