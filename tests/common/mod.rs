#![allow(dead_code)]

use sensview::chart::MemoryChart;
use sensview::datamodel::{Measurement, Timestamp, TimestampExt, Unit};
use sensview::engine::{EngineOptions, EventLoop};
use sensview::test_utils::MemorySource;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

pub mod fixtures;

static BASE: OnceLock<Timestamp> = OnceLock::new();

/// Timestamp `offset` milliseconds after a base ten minutes in the past,
/// well inside the default history window.
pub fn recent(offset: i64) -> Timestamp {
    let base = *BASE.get_or_init(|| {
        Timestamp::now_unix_milliseconds().expect("clock available") - 10 * 60 * 1000
    });
    base + offset
}

pub fn historical(metric: &str, unit: &str, points: &[(i64, f64)]) -> Vec<Measurement> {
    points
        .iter()
        .map(|(offset, value)| {
            Measurement::new(metric, recent(*offset), *value, Some(Unit::from(unit)))
        })
        .collect()
}

pub fn test_options() -> EngineOptions {
    EngineOptions {
        tick_interval: Duration::from_millis(10),
        ..EngineOptions::default()
    }
}

pub fn event_loop(source: &MemorySource) -> EventLoop<MemoryChart> {
    EventLoop::new(Arc::new(source.clone()), MemoryChart::new(), test_options())
}

/// Waits until the live forwarder has subscribed to the source.
pub async fn wait_for_subscribers(source: &MemorySource, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while source.live_subscribers() != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("live subscription did not settle");
}

/// Applies the next event, failing the test if none arrives.
pub async fn handle_next(event_loop: &mut EventLoop<MemoryChart>) -> bool {
    tokio::time::timeout(Duration::from_secs(2), event_loop.handle_next())
        .await
        .expect("no event arrived")
}
