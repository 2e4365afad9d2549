use super::history_loader::{HistoryLoader, HistoryOutcome, apply_history};
use super::live_fanin::LiveFanIn;
use super::reconciler::{ChartReconciler, Effect};
use super::state::AppState;
use crate::bus::{Event, EventBus};
use crate::chart::ChartSurface;
use crate::config::SensViewConfig;
use crate::registry::report_contract_violation;
use crate::source::DataSource;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub history_window: Duration,
    pub tick_interval: Duration,
    pub evict_on_append: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_window: Duration::from_secs(30 * 60),
            tick_interval: Duration::from_secs(1),
            evict_on_append: true,
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &SensViewConfig) -> Result<Self> {
        Ok(Self {
            history_window: config.history_window()?,
            tick_interval: config.tick_interval()?,
            evict_on_append: config.evict_on_append,
        })
    }
}

/// Single-threaded dispatcher of the dashboard.
///
/// Owns the application state and the mounted chart. Events are applied
/// one at a time in arrival order; after any event that changed the
/// registry, the registry is reconciled until it stops changing.
pub struct EventLoop<C: ChartSurface> {
    state: AppState,
    reconciler: ChartReconciler<C>,
    loader: HistoryLoader,
    fan_in: LiveFanIn,
    source: Arc<dyn DataSource>,
    bus: EventBus,
    receiver: UnboundedReceiver<Event>,
    tick_interval: Duration,
    // Fetches whose completion event has not been applied yet
    in_flight: usize,
}

impl<C: ChartSurface> EventLoop<C> {
    pub fn new(source: Arc<dyn DataSource>, chart: C, options: EngineOptions) -> Self {
        let (bus, receiver) = EventBus::init("SensView".to_string());
        let loader = HistoryLoader::new(source.clone(), options.history_window, bus.clone());
        Self {
            state: AppState::new(),
            reconciler: ChartReconciler::mount(chart, options.evict_on_append),
            loader,
            fan_in: LiveFanIn::new(),
            source,
            bus,
            receiver,
            tick_interval: options.tick_interval,
            in_flight: 0,
        }
    }

    /// Handle used to push selection edits into the loop.
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn chart(&self) -> &C {
        self.reconciler.chart()
    }

    pub fn is_live(&self) -> bool {
        self.fan_in.is_active()
    }

    pub fn is_mounted(&self) -> bool {
        self.reconciler.is_mounted()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Lists the selectable metrics from the source into the catalog.
    pub async fn load_catalog(&mut self) -> Result<()> {
        let metrics = self.source.list_metrics().await?;
        self.handle(Event::CatalogListed(metrics));
        Ok(())
    }

    /// Applies one event. Returns `false` once the loop is unmounted.
    pub fn handle(&mut self, event: Event) -> bool {
        if !self.reconciler.is_mounted() {
            debug!(?event, "event after unmount ignored");
            return false;
        }
        let revision = self.state.registry().revision();

        match event {
            Event::CatalogListed(metrics) => self.state.set_catalog(metrics),
            Event::SelectionAdded(metric) => {
                if let Err(err) = self.state.on_selection_added(&metric) {
                    report_contract_violation(&err);
                }
            }
            Event::SelectionRemoved(metric) => {
                if let Err(err) = self.state.on_selection_removed(&metric) {
                    report_contract_violation(&err);
                }
            }
            Event::HistoryLoaded {
                metric,
                generation,
                measurements,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match apply_history(&mut self.state, &metric, generation, &measurements) {
                    Ok(HistoryOutcome::Initialized { rows_merged }) => {
                        debug!(metric = %metric, rows_merged, "history loaded");
                    }
                    Ok(HistoryOutcome::Stale) => {}
                    Err(err) => report_contract_violation(&err),
                }
            }
            Event::HistoryFailed {
                metric,
                generation,
                error,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                warn!(metric = %metric, generation, "History fetch failed: {}", error);
            }
            Event::LiveMeasurement(measurement) => {
                if !self.state.accept_live(&measurement) {
                    debug!(metric = %measurement.metric, "live measurement discarded");
                }
            }
            Event::LiveFeedEnded => {
                if self.fan_in.ended() {
                    warn!("Live feed ended");
                }
            }
            Event::Tick => {
                self.reconciler.reconcile_rows(&self.state);
            }
            Event::Unmount => {
                self.unmount();
                return false;
            }
        }

        if self.state.registry().revision() != revision {
            self.reconcile_registry();
        }
        true
    }

    fn reconcile_registry(&mut self) {
        loop {
            let revision = self.state.registry().revision();
            let effects = self.reconciler.reconcile_registry(&mut self.state);
            for effect in effects {
                self.apply(effect);
            }
            if self.state.registry().revision() == revision {
                break;
            }
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::LoadHistory(metric) => match self.loader.load_history(&mut self.state, &metric)
            {
                Ok(_) => self.in_flight += 1,
                Err(err) => report_contract_violation(&err),
            },
            Effect::EstablishLiveFeed => {
                if self.fan_in.establish(self.source.clone(), self.bus.clone()) {
                    info!("live updates started");
                }
            }
        }
    }

    /// Tears the live subscription down and disposes the chart.
    pub fn unmount(&mut self) {
        if self.fan_in.teardown() {
            info!("live updates stopped");
        }
        self.reconciler.unmount();
    }

    /// Waits for the next event and applies it.
    pub async fn handle_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(event) => self.handle(event),
            None => false,
        }
    }

    /// Applies queued events and waits for every in-flight fetch to come
    /// back. Does not tick.
    pub async fn run_until_idle(&mut self) {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(_) if self.in_flight > 0 => match self.receiver.recv().await {
                    Some(event) => event,
                    None => return,
                },
                Err(_) => return,
            };
            if !self.handle(event) {
                return;
            }
        }
    }

    /// Runs until an `Unmount` event arrives, ticking on the configured
    /// cadence.
    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                received = self.receiver.recv() => match received {
                    Some(event) => event,
                    None => Event::Unmount,
                },
                _ = ticker.tick() => Event::Tick,
            };
            if !self.handle(event) {
                break;
            }
        }
    }
}
