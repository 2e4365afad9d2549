use crate::datamodel::{Measurement, Timestamp};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Debug;

/// Unbounded feed of live measurements for every metric of the source.
/// Dropping the stream unsubscribes.
pub type MeasurementStream = BoxStream<'static, Measurement>;

#[async_trait]
pub trait DataSource: Send + Sync + Debug {
    async fn list_metrics(&self) -> Result<Vec<String>>;
    /// Measurements of `metric` taken at or after `since`, in milliseconds.
    async fn fetch_history(&self, metric: &str, since: Timestamp) -> Result<Vec<Measurement>>;
    async fn subscribe_live(&self) -> Result<MeasurementStream>;
}
