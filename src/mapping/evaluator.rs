//! Descriptor Evaluation
//!
//! Walks a [`MetricTable`] against a decoded document and accumulates one
//! [`MetricFamily`] per descriptor, in declaration order.
//!
//! # Algorithm
//!
//! For every descriptor:
//! 1. Resolve `path`. A missing path means the metric is absent this cycle and
//!    the descriptor emits nothing.
//! 2. Normalize the resolved value into a list of records (a non-sequence
//!    becomes a single record).
//! 3. For every record, assemble labels (structural, document label, record
//!    labels), apply the field selector, coerce, and emit.
//!
//! Failures are isolated per sample: a record whose labels or value cannot be
//! extracted is dropped and the remaining records and descriptors proceed.
//! Evaluating the same table repeatedly (once per resource instance) with
//! different structural label values accumulates into the same families.

use super::descriptor::{label_value, MetricDescriptor, SampleValue};
use super::family::MetricFamily;
use super::path::resolve;
use super::MetricTable;
use crate::error::Result;
use serde_json::Value;
use tracing::debug;

/// Counters describing one evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Samples emitted
    pub emitted: usize,
    /// Descriptors whose path was absent from the document
    pub absent: usize,
    /// Records dropped because labels or value could not be extracted
    pub dropped: usize,
}

impl std::ops::AddAssign for EvaluationSummary {
    fn add_assign(&mut self, other: Self) {
        self.emitted += other.emitted;
        self.absent += other.absent;
        self.dropped += other.dropped;
    }
}

/// Per-scrape accumulator bound to one table
pub struct FamilySet<'t> {
    table: &'t MetricTable,
    families: Vec<MetricFamily>,
}

impl<'t> FamilySet<'t> {
    pub fn new(table: &'t MetricTable) -> Self {
        let families = table
            .descriptors()
            .iter()
            .map(|d| MetricFamily::for_descriptor(d, table.structural_labels()))
            .collect();
        Self { table, families }
    }

    /// Evaluate every descriptor against `document`
    ///
    /// `structural` supplies the values of the table's structural labels, in
    /// order. A length mismatch is a programming error and emits nothing.
    pub fn evaluate(&mut self, document: &Value, structural: &[String]) -> EvaluationSummary {
        let mut summary = EvaluationSummary::default();

        if structural.len() != self.table.structural_labels().len() {
            debug!(
                "Expected {} structural label values, got {}",
                self.table.structural_labels().len(),
                structural.len()
            );
            return summary;
        }

        for (descriptor, family) in self.table.descriptors().iter().zip(&mut self.families) {
            evaluate_descriptor(descriptor, document, structural, family, &mut summary);
        }

        summary
    }

    pub fn into_families(self) -> Vec<MetricFamily> {
        self.families
    }
}

/// Normalize a resolved value into a list of records
pub fn as_records(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn evaluate_descriptor(
    descriptor: &MetricDescriptor,
    document: &Value,
    structural: &[String],
    family: &mut MetricFamily,
    summary: &mut EvaluationSummary,
) {
    let resolved = match descriptor.path.resolve(document) {
        Ok(value) => value,
        Err(_) => {
            summary.absent += 1;
            return;
        }
    };

    let mut base = structural.to_vec();
    if let Some(label) = &descriptor.label_path {
        match label.path.resolve(document) {
            Ok(value) => base.push(label_value(value)),
            Err(e) => {
                debug!(
                    "{}: dropping samples, label {}: {}",
                    descriptor.name, label.label, e
                );
                summary.dropped += 1;
                return;
            }
        }
    }

    for record in as_records(resolved) {
        match record_samples(descriptor, record, &base) {
            Ok(samples) => {
                for (labels, value) in samples {
                    family.add(labels, value);
                    summary.emitted += 1;
                }
            }
            Err(e) => {
                debug!("{}: dropping sample: {}", descriptor.name, e);
                summary.dropped += 1;
            }
        }
    }
}

type Emitted = Vec<(Vec<String>, SampleValue)>;

fn record_samples(
    descriptor: &MetricDescriptor,
    record: &Value,
    base: &[String],
) -> Result<Emitted> {
    let mut labels = base.to_vec();
    for record_label in &descriptor.record_labels {
        let value = resolve(record, std::slice::from_ref(&record_label.key))?;
        labels.push(label_value(value));
    }

    let value = match &descriptor.field {
        Some(field) => field.resolve(record)?,
        None => record,
    };

    Ok(descriptor
        .coerce(value)?
        .into_iter()
        .map(|v| (labels.clone(), v))
        .collect())
}
