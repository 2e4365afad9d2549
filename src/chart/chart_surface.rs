use crate::datamodel::{DataPoint, Timestamp};
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Time,
    Value,
}

/// Value axis as currently held by the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisInfo {
    pub handle: AxisHandle,
    /// Unit identifier carried by the axis.
    pub id: String,
    pub title: String,
    pub synced_with: Option<AxisHandle>,
}

/// Series as currently held by the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInfo {
    pub handle: SeriesHandle,
    pub name: String,
    pub axis: AxisHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub name: String,
    pub x_field: String,
    pub y_field: String,
    pub axis: AxisHandle,
    pub tooltip: String,
}

impl SeriesSpec {
    /// Line series of one metric: the row date on the horizontal axis and
    /// the metric's field on the given value axis.
    pub fn for_metric(metric: &str, axis: AxisHandle) -> Self {
        Self {
            name: metric.to_string(),
            x_field: "date".to_string(),
            y_field: metric.to_string(),
            axis,
            tooltip: "{valueY.value}".to_string(),
        }
    }
}

/// Rendering surface driven by the reconciliation engine.
///
/// The surface keeps its own copy of the rows and its own axes and series.
/// It is not the source of truth: the engine reads it back and diffs it
/// against the registry and the store.
pub trait ChartSurface: Send + Debug {
    fn create_axis(&mut self, kind: AxisKind, id: &str, title: &str) -> AxisHandle;
    /// Makes `axis` follow the zoom and scroll of `with`.
    fn sync_axis(&mut self, axis: AxisHandle, with: AxisHandle);
    fn remove_axis(&mut self, axis: AxisHandle);
    /// Value axes in creation order.
    fn value_axes(&self) -> Vec<AxisInfo>;

    fn create_series(&mut self, spec: SeriesSpec) -> SeriesHandle;
    fn remove_series(&mut self, series: SeriesHandle);
    fn series(&self) -> Vec<SeriesInfo>;

    fn set_all_data(&mut self, rows: &[DataPoint]);
    fn append_row(&mut self, row: &DataPoint, evict_oldest: bool);
    fn last_row_date(&self) -> Option<Timestamp>;
    fn row_count(&self) -> usize;

    fn dispose(&mut self);
}
