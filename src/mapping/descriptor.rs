//! Metric Descriptors
//!
//! A [`MetricDescriptor`] declares where one metric lives inside a fetched
//! document and how its value is coerced. Descriptors are assembled with
//! [`DescriptorBuilder`] and validated once, when the table is built.
//!
//! # Shapes
//!
//! - **Scalar** (default): `path` resolves to the value itself. A sequence at
//!   that position yields one sample per element.
//! - **Records**: `path` resolves to a sequence of sibling records (a single
//!   record is accepted as a one-element sequence). Only this shape may use
//!   repeated-group labels and a field selector.

use super::path::{Path, PathKey};
use crate::error::{ExporterError, Result};
use serde_json::Value;

/// Info families carry these label names after the structural labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSchema {
    /// Record entries exposed as labels, in exposition order
    pub labels: Vec<String>,
    /// Label under which a scalar value is wrapped
    pub scalar_key: String,
}

/// Value kind of a descriptor, with its coercion rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// Floating point, may go up and down
    Gauge,
    /// Non-negative integer
    Counter,
    /// Textual attributes exposed as labels with a constant value of 1
    Info(InfoSchema),
}

/// Whether `path` addresses a value or a list of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Records,
}

/// Label taken from every repeated record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLabel {
    /// Key inside the record, e.g. `@name`
    pub key: PathKey,
    /// Exposed label name, e.g. `name`
    pub label: String,
}

/// Label taken from a scalar elsewhere in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLabel {
    pub path: Path,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub kind: ValueKind,
    pub shape: Shape,
    pub path: Path,
    pub label_path: Option<DocumentLabel>,
    pub record_labels: Vec<RecordLabel>,
    pub field: Option<Path>,
}

/// Coerced value of one sample
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Gauge(f64),
    Counter(u64),
    /// Info label values, aligned with [`InfoSchema::labels`]
    Info(Vec<String>),
}

impl MetricDescriptor {
    pub fn gauge(name: &str, help: &str, path: impl Into<Path>) -> DescriptorBuilder {
        DescriptorBuilder::new(name, help, path.into(), KindSpec::Gauge)
    }

    pub fn counter(name: &str, help: &str, path: impl Into<Path>) -> DescriptorBuilder {
        DescriptorBuilder::new(name, help, path.into(), KindSpec::Counter)
    }

    pub fn info(
        name: &str,
        help: &str,
        path: impl Into<Path>,
        labels: &[&str],
    ) -> DescriptorBuilder {
        let labels = labels.iter().map(|l| l.to_string()).collect();
        DescriptorBuilder::new(name, help, path.into(), KindSpec::Info(labels))
    }

    /// Label names this descriptor adds after the table's structural labels
    pub fn label_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .label_path
            .iter()
            .map(|l| l.label.clone())
            .chain(self.record_labels.iter().map(|l| l.label.clone()))
            .collect();
        if let ValueKind::Info(schema) = &self.kind {
            names.extend(schema.labels.iter().cloned());
        }
        names
    }

    /// Coerce a resolved value into zero or more samples
    ///
    /// Gauge and Counter values produce exactly one sample; Info values
    /// produce one per mapping when given a sequence.
    pub fn coerce(&self, value: &Value) -> Result<Vec<SampleValue>> {
        match &self.kind {
            ValueKind::Gauge => Ok(vec![SampleValue::Gauge(coerce_gauge(value)?)]),
            ValueKind::Counter => Ok(vec![SampleValue::Counter(coerce_counter(value)?)]),
            ValueKind::Info(schema) => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| info_values(schema, item).map(SampleValue::Info))
                    .collect(),
                other => Ok(vec![SampleValue::Info(info_values(schema, other)?)]),
            },
        }
    }
}

fn coerce_gauge(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.ok_or_else(|| ExporterError::ValueType(format!("{} is not numeric", value)))
}

fn coerce_counter(value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ExporterError::ValueType(format!("{} is not a non-negative integer", value))
    })
}

fn info_values(schema: &InfoSchema, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Object(map) => Ok(schema
            .labels
            .iter()
            .map(|label| map.get(label).map(label_value).unwrap_or_default())
            .collect()),
        Value::Array(_) => Err(ExporterError::ValueType(
            "nested sequence cannot be exposed as info labels".to_string(),
        )),
        scalar => Ok(schema
            .labels
            .iter()
            .map(|label| {
                if *label == schema.scalar_key {
                    label_value(scalar)
                } else {
                    String::new()
                }
            })
            .collect()),
    }
}

/// Render a document value as a label value
pub fn label_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

#[derive(Debug, Clone)]
enum KindSpec {
    Gauge,
    Counter,
    Info(Vec<String>),
}

/// Builder validating a [`MetricDescriptor`] on [`build`](Self::build)
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    help: String,
    path: Path,
    kind: KindSpec,
    shape: Shape,
    label_path: Option<DocumentLabel>,
    record_labels: Vec<RecordLabel>,
    field: Option<Path>,
    scalar_key: Option<String>,
}

impl DescriptorBuilder {
    fn new(name: &str, help: &str, path: Path, kind: KindSpec) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            path,
            kind,
            shape: Shape::Scalar,
            label_path: None,
            record_labels: Vec::new(),
            field: None,
            scalar_key: None,
        }
    }

    /// `path` resolves to a sequence of sibling records
    pub fn records(mut self) -> Self {
        self.shape = Shape::Records;
        self
    }

    /// Add the scalar at `path` (from the document root) as label `label`
    pub fn label_path(mut self, path: impl Into<Path>, label: &str) -> Self {
        self.label_path = Some(DocumentLabel {
            path: path.into(),
            label: label.to_string(),
        });
        self
    }

    /// Add `record[key]` as label `label` for every repeated record
    pub fn record_label(mut self, key: &str, label: &str) -> Self {
        self.record_labels.push(RecordLabel {
            key: PathKey::from(key),
            label: label.to_string(),
        });
        self
    }

    /// Read the value from `record[field]` instead of the record itself
    pub fn field(mut self, field: impl Into<Path>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Info label a scalar value is wrapped under
    pub fn scalar_key(mut self, key: &str) -> Self {
        self.scalar_key = Some(key.to_string());
        self
    }

    fn invalid(&self, reason: impl Into<String>) -> ExporterError {
        ExporterError::InvalidDescriptor {
            metric: self.name.clone(),
            reason: reason.into(),
        }
    }

    pub fn build(self) -> Result<MetricDescriptor> {
        if !is_valid_metric_name(&self.name) {
            return Err(self.invalid("not a valid metric name"));
        }
        if self.help.trim().is_empty() {
            return Err(self.invalid("help text is empty"));
        }
        if self.shape == Shape::Scalar {
            if !self.record_labels.is_empty() {
                return Err(self.invalid("record labels require a records path"));
            }
            if self.field.is_some() {
                return Err(self.invalid("a field selector requires a records path"));
            }
        }
        if matches!(&self.field, Some(field) if field.is_empty()) {
            return Err(self.invalid("field selector is empty"));
        }

        let kind = match &self.kind {
            KindSpec::Gauge | KindSpec::Counter if self.scalar_key.is_some() => {
                return Err(self.invalid("scalar_key only applies to info metrics"));
            }
            KindSpec::Gauge => ValueKind::Gauge,
            KindSpec::Counter => ValueKind::Counter,
            KindSpec::Info(labels) => {
                let scalar_key = match (&self.scalar_key, labels.as_slice()) {
                    (Some(key), _) if labels.contains(key) => key.clone(),
                    (Some(key), _) => {
                        return Err(
                            self.invalid(format!("scalar_key '{}' is not an info label", key))
                        );
                    }
                    (None, [only]) => only.clone(),
                    (None, []) => return Err(self.invalid("info metric declares no labels")),
                    (None, _) => {
                        return Err(self.invalid(
                            "info metric with several labels needs an explicit scalar_key",
                        ));
                    }
                };
                ValueKind::Info(InfoSchema {
                    labels: labels.clone(),
                    scalar_key,
                })
            }
        };

        let descriptor = MetricDescriptor {
            name: self.name.clone(),
            help: self.help.clone(),
            kind,
            shape: self.shape,
            path: self.path.clone(),
            label_path: self.label_path.clone(),
            record_labels: self.record_labels.clone(),
            field: self.field.clone(),
        };

        let names = descriptor.label_names();
        if let Some(bad) = names.iter().find(|n| !is_valid_label_name(n)) {
            return Err(self.invalid(format!("'{}' is not a valid label name", bad)));
        }
        if has_duplicates(&names) {
            return Err(self.invalid("duplicate label names"));
        }

        Ok(descriptor)
    }
}

pub(crate) fn has_duplicates(names: &[String]) -> bool {
    names
        .iter()
        .enumerate()
        .any(|(i, name)| names[..i].contains(name))
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

pub(crate) fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with("__")
}
