use super::state::AppState;
use crate::chart::{AxisHandle, AxisKind, ChartSurface, SeriesInfo, SeriesSpec};
use crate::datamodel::{MetricState, Unit};
use crate::registry::report_contract_violation;
use tracing::debug;

/// Side effects requested by a registry reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadHistory(String),
    EstablishLiveFeed,
}

/// Drives a chart surface from the registry and the store.
///
/// The chart is read back and diffed on every pass. Nothing assumes it
/// already reflects the store or the registry.
#[derive(Debug)]
pub struct ChartReconciler<C: ChartSurface> {
    chart: C,
    evict_on_append: bool,
    mounted: bool,
}

impl<C: ChartSurface> ChartReconciler<C> {
    /// Takes ownership of the chart and gives it its time axis.
    pub fn mount(mut chart: C, evict_on_append: bool) -> Self {
        chart.create_axis(AxisKind::Time, "date", "");
        Self {
            chart,
            evict_on_append,
            mounted: true,
        }
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn unmount(&mut self) {
        if self.mounted {
            self.chart.dispose();
            self.mounted = false;
        }
    }

    /// One pass over every registry entry, dispatching on its state.
    pub fn reconcile_registry(&mut self, state: &mut AppState) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.mounted {
            return effects;
        }

        for (metric, metric_state) in state.registry().snapshot() {
            match metric_state {
                MetricState::Added => effects.push(Effect::LoadHistory(metric)),
                MetricState::Initializing => {}
                MetricState::Initialized => self.plot(state, &metric),
                MetricState::Plotted => {
                    if !effects.contains(&Effect::EstablishLiveFeed) {
                        effects.push(Effect::EstablishLiveFeed);
                    }
                }
                MetricState::Removed => self.unplot(&metric),
            }
        }
        effects
    }

    fn plot(&mut self, state: &mut AppState, metric: &str) {
        // A series left over under the same name would leak
        self.unplot(metric);

        let unit = state.registry().unit(metric).cloned();
        let axis = self.ensure_axis(unit.as_ref());
        self.chart
            .create_series(SeriesSpec::for_metric(metric, axis));
        self.chart.set_all_data(state.store().all_rows());

        if let Err(err) = state
            .registry_mut()
            .transition(metric, MetricState::Plotted)
        {
            report_contract_violation(&err);
        }
    }

    fn ensure_axis(&mut self, unit: Option<&Unit>) -> AxisHandle {
        let id = Unit::axis_id(unit);
        let axes = self.chart.value_axes();
        if let Some(existing) = axes.iter().find(|axis| axis.id == id) {
            return existing.handle;
        }

        let title = unit.map(|u| u.to_string()).unwrap_or_default();
        let axis = self.chart.create_axis(AxisKind::Value, id, &title);
        if let Some(first) = axes.first() {
            self.chart.sync_axis(axis, first.handle);
        }
        debug!(unit = id, "value axis created");
        axis
    }

    fn unplot(&mut self, metric: &str) {
        let series = self.chart.series();
        let Some(target) = series.iter().find(|s| s.name == metric) else {
            return;
        };

        if !axis_shared(&series, target) {
            self.chart.remove_axis(target.axis);
        }
        self.chart.remove_series(target.handle);
        debug!(metric, "series removed");
    }

    /// Forwards rows that are newer than the chart's last row and complete
    /// for the current selection. Returns how many rows were forwarded.
    ///
    /// Incomplete rows are skipped and looked at again on the next call
    /// for as long as they stay newer than the chart's last row.
    pub fn reconcile_rows(&mut self, state: &AppState) -> usize {
        if !self.mounted || self.chart.series().is_empty() {
            return 0;
        }

        let store = state.store();
        let start = match self.chart.last_row_date() {
            Some(last) => match store.first_newer_than(last) {
                Some(idx) => idx,
                None => return 0,
            },
            None => 0,
        };

        let mut forwarded = 0;
        for row in &store.all_rows()[start..] {
            if !row.is_complete_for(state.selection()) {
                continue;
            }
            let evict = self.evict_on_append && self.chart.row_count() > 0;
            self.chart.append_row(row, evict);
            forwarded += 1;
        }
        if forwarded > 0 {
            debug!(forwarded, "rows forwarded to chart");
        }
        forwarded
    }
}

fn axis_shared(series: &[SeriesInfo], target: &SeriesInfo) -> bool {
    series
        .iter()
        .any(|s| s.handle != target.handle && s.axis == target.axis)
}
