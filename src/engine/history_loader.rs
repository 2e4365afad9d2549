use super::state::AppState;
use crate::bus::{Event, EventBus};
use crate::datamodel::{Measurement, MetricState, Timestamp, TimestampExt};
use crate::registry::RegistryError;
use crate::source::DataSource;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What applying a history response did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Initialized { rows_merged: usize },
    /// The metric was removed or selected again since the fetch was issued
    Stale,
}

/// Fetches a bounded history window per metric.
///
/// Starting a load moves the metric to `Initializing`, which refuses a
/// second load for the same selection. The fetch runs as a spawned task
/// and its completion comes back through the event bus.
#[derive(Debug, Clone)]
pub struct HistoryLoader {
    source: Arc<dyn DataSource>,
    window: Duration,
    bus: EventBus,
}

impl HistoryLoader {
    pub fn new(source: Arc<dyn DataSource>, window: Duration, bus: EventBus) -> Self {
        Self {
            source,
            window,
            bus,
        }
    }

    pub fn load_history(
        &self,
        state: &mut AppState,
        metric: &str,
    ) -> Result<JoinHandle<()>, RegistryError> {
        let generation = state.registry_mut().begin_initializing(metric)?;
        debug!(metric, generation, "loading history");

        let source = self.source.clone();
        let window = self.window;
        let bus = self.bus.clone();
        let metric = metric.to_string();

        Ok(tokio::spawn(async move {
            let event = match fetch(source.as_ref(), &metric, window).await {
                Ok(measurements) => Event::HistoryLoaded {
                    metric,
                    generation,
                    measurements,
                },
                Err(err) => Event::HistoryFailed {
                    metric,
                    generation,
                    error: format!("{:#}", err),
                },
            };
            if let Err(err) = bus.publish(event) {
                warn!("Dropping history result: {}", err);
            }
        }))
    }
}

async fn fetch(
    source: &dyn DataSource,
    metric: &str,
    window: Duration,
) -> Result<Vec<Measurement>> {
    let now = Timestamp::now_unix_milliseconds()?;
    source.fetch_history(metric, now.window_start(window)).await
}

/// Applies a history response to the state.
///
/// Records the unit from the first measurement, merges everything into the
/// store, then moves the metric to `Initialized`. An empty response still
/// initializes the metric, without a unit. Responses for a selection that
/// is gone are dropped untouched.
pub fn apply_history(
    state: &mut AppState,
    metric: &str,
    generation: u64,
    measurements: &[Measurement],
) -> Result<HistoryOutcome, RegistryError> {
    if !state.registry().awaits_history(metric, generation) {
        debug!(metric, generation, "ignoring stale history response");
        return Ok(HistoryOutcome::Stale);
    }

    match measurements.first() {
        Some(first) => {
            if let Some(unit) = &first.unit {
                state.registry_mut().set_unit(metric, unit.clone())?;
            }
        }
        None => debug!(metric, "empty history, metric initialized without a unit"),
    }

    state.store_mut().merge_measurements(measurements);
    state
        .registry_mut()
        .transition(metric, MetricState::Initialized)?;

    Ok(HistoryOutcome::Initialized {
        rows_merged: measurements.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::Unit;

    fn initializing(metric: &str) -> (AppState, u64) {
        let mut state = AppState::new();
        state.on_selection_added(metric).unwrap();
        let generation = state.registry_mut().begin_initializing(metric).unwrap();
        (state, generation)
    }

    #[test]
    fn test_apply_history() {
        let (mut state, generation) = initializing("pressure");
        let history = vec![Measurement::new(
            "pressure",
            100,
            10.0,
            Some(Unit::from("psi")),
        )];

        let outcome = apply_history(&mut state, "pressure", generation, &history).unwrap();

        assert_eq!(outcome, HistoryOutcome::Initialized { rows_merged: 1 });
        assert_eq!(
            state.registry().state("pressure"),
            Some(MetricState::Initialized)
        );
        assert_eq!(state.registry().unit("pressure"), Some(&Unit::from("psi")));
        assert_eq!(state.store().row_at(100).unwrap().get("pressure"), Some(10.0));
    }

    #[test]
    fn test_empty_history_still_initializes() {
        let (mut state, generation) = initializing("pressure");
        let outcome = apply_history(&mut state, "pressure", generation, &[]).unwrap();
        assert_eq!(outcome, HistoryOutcome::Initialized { rows_merged: 0 });
        assert_eq!(
            state.registry().state("pressure"),
            Some(MetricState::Initialized)
        );
        assert_eq!(state.registry().unit("pressure"), None);
    }

    #[test]
    fn test_history_after_removal_is_dropped() {
        let (mut state, generation) = initializing("pressure");
        state.on_selection_removed("pressure").unwrap();

        let history = vec![Measurement::new("pressure", 100, 10.0, Some(Unit::from("psi")))];
        let outcome = apply_history(&mut state, "pressure", generation, &history).unwrap();

        assert_eq!(outcome, HistoryOutcome::Stale);
        assert!(state.store().is_empty());
        assert_eq!(state.registry().state("pressure"), Some(MetricState::Removed));
    }

    #[test]
    fn test_history_for_previous_selection_is_dropped() {
        let (mut state, old_generation) = initializing("pressure");
        state.on_selection_removed("pressure").unwrap();
        state.on_selection_added("pressure").unwrap();
        state.registry_mut().begin_initializing("pressure").unwrap();

        let history = vec![Measurement::new("pressure", 100, 10.0, Some(Unit::from("psi")))];
        let outcome = apply_history(&mut state, "pressure", old_generation, &history).unwrap();

        assert_eq!(outcome, HistoryOutcome::Stale);
        assert_eq!(
            state.registry().state("pressure"),
            Some(MetricState::Initializing)
        );
    }
}
