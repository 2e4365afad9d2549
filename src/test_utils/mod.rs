use crate::datamodel::{Measurement, Timestamp};
use crate::source::{DataSource, MeasurementStream};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, broadcast};
use tokio_stream::wrappers::BroadcastStream;

#[derive(Debug, Default)]
struct MemorySourceInner {
    metrics: Vec<String>,
    history: HashMap<String, Vec<Measurement>>,
    failing: HashSet<String>,
    held: HashMap<String, Arc<Semaphore>>,
    fetches: HashMap<String, usize>,
    subscriptions: usize,
    live_failing: bool,
}

/// Data source controlled by the test.
///
/// History is served from what the test registered, fetches can be held
/// back or made to fail, and live measurements are pushed by hand.
#[derive(Debug, Clone)]
pub struct MemorySource {
    inner: Arc<Mutex<MemorySourceInner>>,
    live: broadcast::Sender<Measurement>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        let (live, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(Mutex::new(MemorySourceInner::default())),
            live,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemorySourceInner>> {
        self.inner
            .lock()
            .map_err(|e| anyhow!("MemorySource lock poisoned: {}", e))
    }

    /// Registers a metric and the history served for it.
    pub fn with_metric(self, metric: &str, history: Vec<Measurement>) -> Self {
        if let Ok(mut inner) = self.lock() {
            inner.metrics.push(metric.to_string());
            inner.history.insert(metric.to_string(), history);
        }
        self
    }

    pub fn fail_history(&self, metric: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.failing.insert(metric.to_string());
        }
    }

    /// Makes `subscribe_live` fail until [`MemorySource::restore_live`].
    pub fn fail_live(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.live_failing = true;
        }
    }

    pub fn restore_live(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.live_failing = false;
        }
    }

    /// Fetches for `metric` block until [`MemorySource::release`].
    pub fn hold(&self, metric: &str) {
        if let Ok(mut inner) = self.lock() {
            inner
                .held
                .insert(metric.to_string(), Arc::new(Semaphore::new(0)));
        }
    }

    pub fn release(&self, metric: &str) {
        if let Ok(mut inner) = self.lock() {
            if let Some(gate) = inner.held.remove(metric) {
                gate.add_permits(Semaphore::MAX_PERMITS);
            }
        }
    }

    /// Pushes a live measurement to every subscriber. Returns how many
    /// subscribers received it.
    pub fn push_live(&self, measurement: Measurement) -> usize {
        self.live.send(measurement).unwrap_or(0)
    }

    pub fn live_subscribers(&self) -> usize {
        self.live.receiver_count()
    }

    pub fn fetch_count(&self, metric: &str) -> usize {
        self.lock()
            .map(|inner| inner.fetches.get(metric).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn subscription_count(&self) -> usize {
        self.lock().map(|inner| inner.subscriptions).unwrap_or(0)
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn list_metrics(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.metrics.clone())
    }

    async fn fetch_history(&self, metric: &str, since: Timestamp) -> Result<Vec<Measurement>> {
        let gate = {
            let mut inner = self.lock()?;
            *inner.fetches.entry(metric.to_string()).or_default() += 1;
            inner.held.get(metric).cloned()
        };
        if let Some(gate) = gate {
            let _permit = gate.acquire().await?;
        }

        let inner = self.lock()?;
        if inner.failing.contains(metric) {
            bail!("History unavailable for {}", metric);
        }
        Ok(inner
            .history
            .get(metric)
            .map(|history| {
                history
                    .iter()
                    .filter(|m| m.at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn subscribe_live(&self) -> Result<MeasurementStream> {
        {
            let mut inner = self.lock()?;
            if inner.live_failing {
                bail!("Live feed unavailable");
            }
            inner.subscriptions += 1;
        }
        let receiver = self.live.subscribe();
        Ok(BroadcastStream::new(receiver)
            .filter_map(|received| async move { received.ok() })
            .boxed())
    }
}
