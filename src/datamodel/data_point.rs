use super::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All values sharing one timestamp, keyed by metric name.
///
/// Serializes flat, e.g. `{"date":100,"pressure":10.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: Timestamp,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl DataPoint {
    pub fn new(date: Timestamp) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(date: Timestamp, metric: &str, value: f64) -> Self {
        let mut point = Self::new(date);
        point.set(metric, value);
        point
    }

    pub fn set(&mut self, metric: &str, value: f64) {
        self.values.insert(metric.to_string(), value);
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    /// Number of metric fields, the date excluded.
    pub fn field_count(&self) -> usize {
        self.values.len()
    }

    /// True when the row holds a value for every metric in `metrics`.
    /// An empty comparison set never makes a row complete.
    pub fn is_complete_for<S: AsRef<str>>(&self, metrics: &[S]) -> bool {
        !metrics.is_empty() && metrics.iter().all(|m| self.values.contains_key(m.as_ref()))
    }
}
