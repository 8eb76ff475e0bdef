//! Metric family accumulators, rebuilt from scratch on every scrape.

use super::descriptor::{MetricDescriptor, SampleValue, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyKind {
    Gauge,
    Counter,
    Info,
}

impl From<&ValueKind> for FamilyKind {
    fn from(kind: &ValueKind) -> Self {
        match kind {
            ValueKind::Gauge => FamilyKind::Gauge,
            ValueKind::Counter => FamilyKind::Counter,
            ValueKind::Info(_) => FamilyKind::Info,
        }
    }
}

/// One exposed sample; `labels` is aligned with [`MetricFamily::label_names`]
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<String>,
    pub value: SampleValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: FamilyKind,
    pub label_names: Vec<String>,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn for_descriptor(descriptor: &MetricDescriptor, structural_labels: &[String]) -> Self {
        let mut label_names = structural_labels.to_vec();
        label_names.extend(descriptor.label_names());
        Self {
            name: descriptor.name.clone(),
            help: descriptor.help.clone(),
            kind: FamilyKind::from(&descriptor.kind),
            label_names,
            samples: Vec::new(),
        }
    }

    /// Append a sample; info values are appended to the label values
    pub fn add(&mut self, mut labels: Vec<String>, value: SampleValue) {
        if let SampleValue::Info(info) = &value {
            labels.extend(info.iter().cloned());
        }
        self.samples.push(Sample { labels, value });
    }
}
