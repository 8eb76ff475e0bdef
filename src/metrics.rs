//! Prometheus Exposition
//!
//! Renders the families of one scrape in the Prometheus text format.
//!
//! Every scrape builds a fresh [`Registry`], so the output only ever reflects
//! the document fetched for that request.
//!
//! # Metric Types
//!
//! - **Gauge** families → `GaugeVec`
//! - **Counter** families → `IntCounterVec`, exposed with a `_total` suffix
//! - **Info** families → `GaugeVec` named `<name>_info`, constant value 1
//!
//! Each scrape also carries an `up` gauge (`horizon_up` or `horizon_uag_up`):
//! 1 when the API answered, 0 when the fetch failed.

use crate::collectors::{Collection, CollectionStatus};
use crate::mapping::{FamilyKind, MetricFamily, SampleValue};
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

/// `up` gauge of the connection server exporter
pub const CONNECTION_SERVER_UP: &str = "horizon_up";

/// `up` gauge of the UAG exporter
pub const UAG_UP: &str = "horizon_uag_up";

/// Registry holding the metrics of a single scrape
pub struct ScrapeRegistry {
    registry: Registry,
    pub up: Gauge,
}

impl ScrapeRegistry {
    pub fn new(up_name: &str, up_help: &str) -> anyhow::Result<Self> {
        let registry = Registry::new();
        let up = Gauge::with_opts(Opts::new(up_name, up_help))?;
        registry.register(Box::new(up.clone()))?;
        Ok(Self { registry, up })
    }

    /// Register a family and set all of its samples
    pub fn add_family(&self, family: &MetricFamily) -> anyhow::Result<()> {
        let label_names: Vec<&str> = family.label_names.iter().map(String::as_str).collect();

        match family.kind {
            FamilyKind::Gauge | FamilyKind::Info => {
                let name = match family.kind {
                    FamilyKind::Info => format!("{}_info", family.name),
                    _ => family.name.clone(),
                };
                let vec = GaugeVec::new(Opts::new(name, family.help.clone()), &label_names)?;
                for sample in &family.samples {
                    let values: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                    let value = match &sample.value {
                        SampleValue::Gauge(v) => *v,
                        SampleValue::Counter(v) => *v as f64,
                        SampleValue::Info(_) => 1.0,
                    };
                    vec.get_metric_with_label_values(&values)?.set(value);
                }
                self.registry.register(Box::new(vec))?;
            }
            FamilyKind::Counter => {
                let name = format!("{}_total", family.name);
                let vec = IntCounterVec::new(Opts::new(name, family.help.clone()), &label_names)?;
                for sample in &family.samples {
                    let values: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                    if let SampleValue::Counter(v) = sample.value {
                        let counter = vec.get_metric_with_label_values(&values)?;
                        counter.reset();
                        counter.inc_by(v);
                    }
                }
                self.registry.register(Box::new(vec))?;
            }
        }

        Ok(())
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Render one scrape, including its `up` gauge
pub fn render_collection(
    up_name: &str,
    up_help: &str,
    collection: &Collection,
) -> anyhow::Result<String> {
    let registry = ScrapeRegistry::new(up_name, up_help)?;
    registry.up.set(match collection.status {
        CollectionStatus::Success => 1.0,
        CollectionStatus::Failed => 0.0,
    });

    for family in &collection.families {
        registry.add_family(family)?;
    }

    registry.render()
}
