use std::sync::Arc;

use anyhow::{Result, bail};

use super::DataSource;
use super::replay::ReplaySource;
use super::simulated::SimulatedSource;

pub async fn create_source_from_connection_string(
    connection_string: &str,
) -> Result<Arc<dyn DataSource>> {
    Ok(match connection_string {
        s if s.starts_with("simulated:") => Arc::new(SimulatedSource::connect(s)?),
        s if s.starts_with("replay:") => Arc::new(ReplaySource::connect(s).await?),
        _ => {
            let scheme = connection_string
                .split_once(':')
                .map(|(scheme, _)| scheme)
                .unwrap_or(connection_string);
            bail!(
                "Unsupported data source: {}. Use simulated:// or replay://",
                scheme
            )
        }
    })
}
