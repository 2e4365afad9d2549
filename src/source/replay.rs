use super::data_source::{DataSource, MeasurementStream};
use crate::datamodel::{Measurement, Timestamp};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::BTreeSet;

/// Serves history from a JSON-lines file of measurements.
///
/// Connection string: `replay://<path>`. The live feed never yields.
#[derive(Debug)]
pub struct ReplaySource {
    measurements: Vec<Measurement>,
}

impl ReplaySource {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let path = connection_string
            .strip_prefix("replay://")
            .or_else(|| connection_string.strip_prefix("replay:"))
            .unwrap_or(connection_string);
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read replay file: {}", path))?;
        Self::from_jsonl(&content)
    }

    pub fn from_jsonl(content: &str) -> Result<Self> {
        let measurements = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<Measurement>(line)
                    .with_context(|| format!("Invalid measurement on line {}", idx + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { measurements })
    }
}

#[async_trait]
impl DataSource for ReplaySource {
    async fn list_metrics(&self) -> Result<Vec<String>> {
        let names: BTreeSet<&str> = self
            .measurements
            .iter()
            .map(|m| m.metric.as_str())
            .collect();
        Ok(names.into_iter().map(String::from).collect())
    }

    async fn fetch_history(&self, metric: &str, since: Timestamp) -> Result<Vec<Measurement>> {
        Ok(self
            .measurements
            .iter()
            .filter(|m| m.metric == metric && m.at >= since)
            .cloned()
            .collect())
    }

    async fn subscribe_live(&self) -> Result<MeasurementStream> {
        Ok(futures::stream::pending::<Measurement>().boxed())
    }
}
