use crate::datamodel::MetricState;
use thiserror::Error;
use tracing::error;

/// Violations of the lifecycle contract of the metric registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// The metric was never selected
    #[error("Unknown metric: {metric}")]
    UnknownMetric { metric: String },

    /// The metric is selected and not removed yet
    #[error("Metric already selected: {metric}")]
    AlreadySelected { metric: String },

    /// The requested state is not the next one in the lifecycle
    #[error("Invalid transition for metric {metric}: {from} -> {to}")]
    InvalidTransition {
        metric: String,
        from: MetricState,
        to: MetricState,
    },
}

impl RegistryError {
    pub fn unknown(metric: &str) -> Self {
        RegistryError::UnknownMetric {
            metric: metric.to_string(),
        }
    }

    pub fn invalid_transition(metric: &str, from: MetricState, to: MetricState) -> Self {
        RegistryError::InvalidTransition {
            metric: metric.to_string(),
            from,
            to,
        }
    }
}

/// Reports a broken lifecycle contract.
///
/// Debug and test builds panic. Release builds log the violation and the
/// caller carries on as if the operation was a no-op.
pub fn report_contract_violation(err: &RegistryError) {
    error!(%err, "metric lifecycle contract violation");
    debug_assert!(false, "metric lifecycle contract violation: {}", err);
}
