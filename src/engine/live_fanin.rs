use crate::bus::{Event, EventBus};
use crate::source::DataSource;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The single live subscription serving every plotted metric.
///
/// Established at most once per activation and torn down once, on
/// unmount. A feed that ends on its own releases the slot through
/// [`LiveFanIn::ended`] so that it can be established again. Filtering
/// against the selection happens when the forwarded event is applied, not
/// here.
#[derive(Debug, Default)]
pub struct LiveFanIn {
    token: Option<CancellationToken>,
}

impl LiveFanIn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// Subscribes to the live feed and forwards every measurement to the
    /// bus. Returns `false` when a subscription is already active.
    pub fn establish(&mut self, source: Arc<dyn DataSource>, bus: EventBus) -> bool {
        if self.token.is_some() {
            return false;
        }
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            let mut stream = match source.subscribe_live().await {
                Ok(stream) => stream,
                Err(err) => {
                    warn!("Live subscription failed: {:#}", err);
                    let _ = bus.publish(Event::LiveFeedEnded);
                    return;
                }
            };
            info!("live subscription established");

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    next = stream.next() => match next {
                        Some(measurement) => {
                            if bus.publish(Event::LiveMeasurement(measurement)).is_err() {
                                break;
                            }
                        }
                        None => {
                            let _ = bus.publish(Event::LiveFeedEnded);
                            break;
                        }
                    },
                }
            }
            info!("live subscription closed");
        });

        self.token = Some(token);
        true
    }

    /// Forgets a subscription whose forwarder already stopped. Returns
    /// `false` when no subscription was active.
    pub fn ended(&mut self) -> bool {
        self.token.take().is_some()
    }

    /// Unsubscribes. Returns `false` when there was nothing to tear down.
    pub fn teardown(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

impl Drop for LiveFanIn {
    fn drop(&mut self) {
        self.teardown();
    }
}
