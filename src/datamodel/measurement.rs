use super::{Timestamp, Unit};
use serde::{Deserialize, Serialize};

/// One observed value of a metric.
///
/// Historical measurements carry their unit, live ones usually do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub metric: String,
    pub at: Timestamp,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl Measurement {
    pub fn new(metric: &str, at: Timestamp, value: f64, unit: Option<Unit>) -> Self {
        Self {
            metric: metric.to_string(),
            at,
            value,
            unit,
        }
    }

    pub fn live(metric: &str, at: Timestamp, value: f64) -> Self {
        Self::new(metric, at, value, None)
    }
}
