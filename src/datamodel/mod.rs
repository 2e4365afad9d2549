pub mod data_point;
pub mod datetime;
pub mod measurement;
pub mod metric;
pub mod unit;

pub use data_point::DataPoint;
pub use datetime::{Timestamp, TimestampExt};
pub use measurement::Measurement;
pub use metric::{MetricInfo, MetricState};
pub use unit::Unit;
