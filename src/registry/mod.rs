pub mod error;
pub mod metric_registry;

pub use error::{RegistryError, report_contract_violation};
pub use metric_registry::MetricRegistry;
