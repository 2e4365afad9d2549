use super::chart_surface::{
    AxisHandle, AxisInfo, AxisKind, ChartSurface, SeriesHandle, SeriesInfo, SeriesSpec,
};
use crate::datamodel::{DataPoint, Timestamp};
use std::collections::VecDeque;
use tracing::debug;

/// Headless chart surface.
///
/// Keeps axes, series and mirrored rows in memory and logs every
/// operation. Used by the binary and by the tests to observe what the
/// engine asks a real chart to do.
#[derive(Debug, Default)]
pub struct MemoryChart {
    next_handle: u64,
    time_axis: Option<AxisHandle>,
    value_axes: Vec<AxisInfo>,
    series: Vec<(SeriesInfo, SeriesSpec)>,
    rows: VecDeque<DataPoint>,
    appended: usize,
    disposed: bool,
}

impl MemoryChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<DataPoint> {
        self.rows.iter().cloned().collect()
    }

    /// Number of rows received through `append_row` since creation.
    pub fn appended_count(&self) -> usize {
        self.appended
    }

    pub fn time_axis(&self) -> Option<AxisHandle> {
        self.time_axis
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn axis_by_id(&self, id: &str) -> Option<&AxisInfo> {
        self.value_axes.iter().find(|axis| axis.id == id)
    }

    pub fn series_by_name(&self, name: &str) -> Option<&SeriesSpec> {
        self.series
            .iter()
            .find(|(info, _)| info.name == name)
            .map(|(_, spec)| spec)
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl ChartSurface for MemoryChart {
    fn create_axis(&mut self, kind: AxisKind, id: &str, title: &str) -> AxisHandle {
        let handle = AxisHandle(self.handle());
        match kind {
            AxisKind::Time => self.time_axis = Some(handle),
            AxisKind::Value => self.value_axes.push(AxisInfo {
                handle,
                id: id.to_string(),
                title: title.to_string(),
                synced_with: None,
            }),
        }
        debug!(?kind, id, ?handle, "chart: axis created");
        handle
    }

    fn sync_axis(&mut self, axis: AxisHandle, with: AxisHandle) {
        if let Some(info) = self.value_axes.iter_mut().find(|a| a.handle == axis) {
            info.synced_with = Some(with);
            debug!(?axis, ?with, "chart: axis synced");
        }
    }

    fn remove_axis(&mut self, axis: AxisHandle) {
        self.value_axes.retain(|a| a.handle != axis);
        // Axes synced to the removed one fall back to their own scale
        for info in self.value_axes.iter_mut() {
            if info.synced_with == Some(axis) {
                info.synced_with = None;
            }
        }
        debug!(?axis, "chart: axis removed");
    }

    fn value_axes(&self) -> Vec<AxisInfo> {
        self.value_axes.clone()
    }

    fn create_series(&mut self, spec: SeriesSpec) -> SeriesHandle {
        let handle = SeriesHandle(self.handle());
        debug!(name = %spec.name, ?handle, axis = ?spec.axis, "chart: series created");
        self.series.push((
            SeriesInfo {
                handle,
                name: spec.name.clone(),
                axis: spec.axis,
            },
            spec,
        ));
        handle
    }

    fn remove_series(&mut self, series: SeriesHandle) {
        self.series.retain(|(info, _)| info.handle != series);
        debug!(?series, "chart: series removed");
    }

    fn series(&self) -> Vec<SeriesInfo> {
        self.series.iter().map(|(info, _)| info.clone()).collect()
    }

    fn set_all_data(&mut self, rows: &[DataPoint]) {
        self.rows = rows.iter().cloned().collect();
        debug!(rows = self.rows.len(), "chart: data replaced");
    }

    fn append_row(&mut self, row: &DataPoint, evict_oldest: bool) {
        if evict_oldest {
            self.rows.pop_front();
        }
        self.rows.push_back(row.clone());
        self.appended += 1;
        debug!(date = row.date, evict_oldest, "chart: row appended");
    }

    fn last_row_date(&self) -> Option<Timestamp> {
        self.rows.back().map(|row| row.date)
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn dispose(&mut self) {
        self.value_axes.clear();
        self.series.clear();
        self.rows.clear();
        self.time_axis = None;
        self.disposed = true;
        debug!("chart: disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_and_series() {
        let mut chart = MemoryChart::new();
        let psi = chart.create_axis(AxisKind::Value, "psi", "psi");
        let f = chart.create_axis(AxisKind::Value, "F", "F");
        chart.sync_axis(f, psi);
        assert_eq!(chart.axis_by_id("F").unwrap().synced_with, Some(psi));

        let series = chart.create_series(SeriesSpec::for_metric("pressure", psi));
        assert_eq!(chart.series().len(), 1);
        assert_eq!(chart.series_by_name("pressure").unwrap().y_field, "pressure");

        chart.remove_series(series);
        chart.remove_axis(psi);
        assert!(chart.series().is_empty());
        assert_eq!(chart.value_axes().len(), 1);
        assert_eq!(chart.axis_by_id("F").unwrap().synced_with, None);
    }

    #[test]
    fn test_append_with_eviction() {
        let mut chart = MemoryChart::new();
        chart.set_all_data(&[
            DataPoint::with_value(1, "a", 1.0),
            DataPoint::with_value(2, "a", 2.0),
        ]);
        chart.append_row(&DataPoint::with_value(3, "a", 3.0), true);
        assert_eq!(chart.row_count(), 2);
        assert_eq!(chart.rows()[0].date, 2);
        assert_eq!(chart.last_row_date(), Some(3));
        assert_eq!(chart.appended_count(), 1);

        chart.append_row(&DataPoint::with_value(4, "a", 4.0), false);
        assert_eq!(chart.row_count(), 3);
    }

    #[test]
    fn test_dispose() {
        let mut chart = MemoryChart::new();
        chart.create_axis(AxisKind::Time, "date", "");
        chart.create_axis(AxisKind::Value, "psi", "psi");
        chart.dispose();
        assert!(chart.is_disposed());
        assert!(chart.value_axes().is_empty());
        assert_eq!(chart.time_axis(), None);
    }
}
