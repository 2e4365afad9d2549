use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical unit of a metric, as reported by the data source.
///
/// The unit name doubles as the identifier of the value axis the metric is
/// plotted on, so two metrics sharing a unit share an axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unit {
    pub name: String,
}

impl Unit {
    pub fn new(name: String) -> Self {
        Unit { name }
    }

    /// Axis identifier for metrics whose unit was never reported.
    pub fn unitless_axis_id() -> &'static str {
        ""
    }

    pub fn axis_id(unit: Option<&Unit>) -> &str {
        unit.map(|u| u.name.as_str())
            .unwrap_or(Self::unitless_axis_id())
    }
}

// Implement display for Unit
impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Unit {
    fn from(name: &str) -> Self {
        Unit::new(name.to_string())
    }
}
