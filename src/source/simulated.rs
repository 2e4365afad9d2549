use super::data_source::{DataSource, MeasurementStream};
use crate::datamodel::{Measurement, Timestamp, TimestampExt, Unit};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use rand::Rng;
use std::time::Duration;

const DEFAULT_METRICS: &str = "pressure:psi,temperature:F,humidity:%";
const DEFAULT_PERIOD_MS: u64 = 1000;

#[derive(Debug, Clone)]
struct SimulatedMetric {
    name: String,
    unit: Unit,
    baseline: f64,
}

/// Random-walk data source.
///
/// All metrics are sampled on the same period-aligned timestamps, so
/// their values meet in complete rows.
///
/// Connection string: `simulated://host?period_ms=1000&metrics=pressure:psi,temperature:F`
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    metrics: Vec<SimulatedMetric>,
    period_ms: u64,
}

fn jitter() -> f64 {
    rand::rng().random_range(-1.0..1.0)
}

fn parse_metrics(list: &str) -> Result<Vec<SimulatedMetric>> {
    list.split(',')
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(idx, entry)| {
            let (name, unit) = entry
                .split_once(':')
                .with_context(|| format!("Expected name:unit, got {}", entry))?;
            Ok(SimulatedMetric {
                name: name.to_string(),
                unit: Unit::from(unit),
                baseline: 20.0 * (idx as f64 + 1.0),
            })
        })
        .collect()
}

impl SimulatedSource {
    pub fn connect(connection_string: &str) -> Result<Self> {
        let url = url::Url::parse(connection_string)
            .with_context(|| format!("Failed to parse simulated source URL: {}", connection_string))?;

        let mut metrics = None;
        let mut period_ms = DEFAULT_PERIOD_MS;
        for (key, value) in url.query_pairs() {
            match &*key {
                "metrics" => metrics = Some(parse_metrics(&value)?),
                "period_ms" => {
                    period_ms = value
                        .parse()
                        .with_context(|| format!("Invalid period_ms: {}", value))?
                }
                _ => {}
            }
        }
        if period_ms == 0 {
            bail!("period_ms must be greater than 0");
        }

        let metrics = match metrics {
            Some(metrics) => metrics,
            None => parse_metrics(DEFAULT_METRICS)?,
        };
        if metrics.is_empty() {
            bail!("Simulated source needs at least one metric");
        }

        Ok(Self { metrics, period_ms })
    }

    fn align(&self, at: Timestamp) -> Timestamp {
        let period = self.period_ms as i64;
        at - at.rem_euclid(period)
    }
}

#[async_trait]
impl DataSource for SimulatedSource {
    async fn list_metrics(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.metrics.iter().map(|m| m.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn fetch_history(&self, metric: &str, since: Timestamp) -> Result<Vec<Measurement>> {
        let Some(simulated) = self.metrics.iter().find(|m| m.name == metric) else {
            return Ok(Vec::new());
        };
        let now = Timestamp::now_unix_milliseconds()?;
        let period = self.period_ms as i64;

        let mut at = self.align(since);
        if at < since {
            at += period;
        }
        let mut value = simulated.baseline;
        let mut measurements = Vec::new();
        while at < now {
            value += jitter();
            measurements.push(Measurement::new(
                metric,
                at,
                value,
                Some(simulated.unit.clone()),
            ));
            at += period;
        }
        Ok(measurements)
    }

    async fn subscribe_live(&self) -> Result<MeasurementStream> {
        let source = self.clone();
        let values: Vec<f64> = source.metrics.iter().map(|m| m.baseline).collect();
        let mut interval = tokio::time::interval(Duration::from_millis(source.period_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let ticks = stream::unfold(
            (source, values, interval),
            |(source, mut values, mut interval)| async move {
                interval.tick().await;
                let at = match Timestamp::now_unix_milliseconds() {
                    Ok(now) => source.align(now),
                    Err(_) => return None,
                };
                let batch: Vec<Measurement> = source
                    .metrics
                    .iter()
                    .zip(values.iter_mut())
                    .map(|(metric, value)| {
                        *value += jitter();
                        Measurement::live(&metric.name, at, *value)
                    })
                    .collect();
                Some((batch, (source, values, interval)))
            },
        );

        Ok(ticks.flat_map(stream::iter).boxed())
    }
}
