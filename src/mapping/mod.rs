//! Nested-Data-to-Metric Mapping
//!
//! Declarative metric tables evaluated against decoded API documents.
//!
//! # Overview
//!
//! A [`MetricTable`] is a validated list of [`MetricDescriptor`]s plus the
//! names of any structural labels bound by the caller (for example the
//! gateway name when a table is evaluated once per gateway). A
//! [`FamilySet`] evaluates a table against one or more documents and yields
//! fresh [`MetricFamily`] values for exposition.
//!
//! ```
//! use horizon_exporter::mapping::{FamilySet, MetricDescriptor, MetricTable};
//! use serde_json::json;
//!
//! # fn example() -> horizon_exporter::error::Result<()> {
//! let table = MetricTable::new(
//!     &[],
//!     vec![MetricDescriptor::gauge("uag_sessions", "Sessions", ["sessionCount"]).build()?],
//! )?;
//!
//! let mut set = FamilySet::new(&table);
//! set.evaluate(&json!({"sessionCount": "12"}), &[]);
//! let families = set.into_families();
//! assert_eq!(families[0].samples.len(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod descriptor;
pub mod evaluator;
pub mod family;
pub mod path;

pub use descriptor::{
    label_value, DescriptorBuilder, InfoSchema, MetricDescriptor, SampleValue, Shape, ValueKind,
};
pub use evaluator::{as_records, EvaluationSummary, FamilySet};
pub use family::{FamilyKind, MetricFamily, Sample};
pub use path::{resolve, Path, PathKey};

use crate::error::{ExporterError, Result};
use descriptor::{has_duplicates, is_valid_label_name};

/// Validated, immutable descriptor table
#[derive(Debug, Clone)]
pub struct MetricTable {
    structural_labels: Vec<String>,
    descriptors: Vec<MetricDescriptor>,
}

impl MetricTable {
    /// Build a table, rejecting label collisions and duplicate metric names
    pub fn new(structural_labels: &[&str], descriptors: Vec<MetricDescriptor>) -> Result<Self> {
        let structural_labels: Vec<String> =
            structural_labels.iter().map(|l| l.to_string()).collect();

        if let Some(bad) = structural_labels.iter().find(|l| !is_valid_label_name(l)) {
            return Err(ExporterError::Config(format!(
                "'{}' is not a valid structural label name",
                bad
            )));
        }

        for (i, descriptor) in descriptors.iter().enumerate() {
            if descriptors[..i].iter().any(|d| d.name == descriptor.name) {
                return Err(ExporterError::InvalidDescriptor {
                    metric: descriptor.name.clone(),
                    reason: "declared more than once".to_string(),
                });
            }

            let mut names = structural_labels.clone();
            names.extend(descriptor.label_names());
            if has_duplicates(&names) {
                return Err(ExporterError::InvalidDescriptor {
                    metric: descriptor.name.clone(),
                    reason: "label name collides with a structural label".to_string(),
                });
            }
        }

        Ok(Self {
            structural_labels,
            descriptors,
        })
    }

    pub fn structural_labels(&self) -> &[String] {
        &self.structural_labels
    }

    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }
}
