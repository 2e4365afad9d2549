pub mod data_source;
pub mod replay;
pub mod simulated;
pub mod source_factory;

pub use data_source::{DataSource, MeasurementStream};
pub use source_factory::create_source_from_connection_string;
