use anyhow::Error;
use confique::Config;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

#[derive(Debug, Config)]
pub struct SensViewConfig {
    /// Length of the history fetched for a newly selected metric.
    #[config(env = "SENSVIEW_HISTORY_WINDOW_MINUTES", default = 30)]
    pub history_window_minutes: u64,

    /// Cadence at which new rows are forwarded to the chart.
    #[config(env = "SENSVIEW_TICK_INTERVAL_MS", default = 1000)]
    pub tick_interval_ms: u64,

    #[config(
        env = "SENSVIEW_SOURCE",
        default = "simulated://localhost?period_ms=1000"
    )]
    pub source_connection_string: String,

    /// Drop the oldest chart row for every appended one, keeping the
    /// visible range fixed.
    #[config(env = "SENSVIEW_EVICT_ON_APPEND", default = true)]
    pub evict_on_append: bool,
}

impl SensViewConfig {
    pub fn load() -> Result<SensViewConfig, Error> {
        let c = SensViewConfig::builder()
            .env()
            .file("settings.toml")
            .load()?;

        Ok(c)
    }

    pub fn history_window(&self) -> Result<Duration, Error> {
        let seconds = self
            .history_window_minutes
            .checked_mul(60)
            .filter(|seconds| i64::try_from(seconds.saturating_mul(1000)).is_ok())
            .ok_or_else(|| {
                Error::msg(format!(
                    "History window of {} minutes is too large",
                    self.history_window_minutes
                ))
            })?;
        Ok(Duration::from_secs(seconds))
    }

    pub fn tick_interval(&self) -> Result<Duration, Error> {
        if self.tick_interval_ms == 0 {
            anyhow::bail!("Tick interval must be greater than 0");
        }
        Ok(Duration::from_millis(self.tick_interval_ms))
    }
}

static SENSVIEW_CONFIG: OnceLock<Arc<SensViewConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<SensViewConfig>, Error> {
    SENSVIEW_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    // Check if the configuration has already been loaded
    if SENSVIEW_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = SensViewConfig::load()?;
    SENSVIEW_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

use std::sync::Mutex;

// Used by integration tests
#[allow(dead_code)]
static TEST_CONFIG_INIT: Mutex<()> = Mutex::new(());

/// Test-only function to ensure configuration is loaded exactly once per test run
#[allow(dead_code)]
pub fn load_configuration_for_tests() -> Result<(), Error> {
    let _guard = TEST_CONFIG_INIT
        .lock()
        .map_err(|e| Error::msg(format!("Test configuration lock poisoned: {}", e)))?;

    if SENSVIEW_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = SensViewConfig::load()?;
    SENSVIEW_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_config() {
        let config = SensViewConfig::load().unwrap();

        assert_eq!(config.history_window_minutes, 30);
        assert_eq!(config.tick_interval_ms, 1000);
        assert!(config.evict_on_append);
        assert!(config.source_connection_string.starts_with("simulated://"));

        temp_env::with_var("SENSVIEW_TICK_INTERVAL_MS", Some("250"), || {
            let config = SensViewConfig::load().unwrap();
            assert_eq!(config.tick_interval_ms, 250);
        });
    }

    #[test]
    #[serial]
    fn test_durations() {
        let config = SensViewConfig::load().unwrap();
        assert_eq!(config.history_window().unwrap(), Duration::from_secs(30 * 60));
        assert_eq!(config.tick_interval().unwrap(), Duration::from_secs(1));

        temp_env::with_var("SENSVIEW_TICK_INTERVAL_MS", Some("0"), || {
            let config = SensViewConfig::load().unwrap();
            assert!(config.tick_interval().is_err());
        });

        temp_env::with_var("SENSVIEW_HISTORY_WINDOW_MINUTES", Some("5"), || {
            let config = SensViewConfig::load().unwrap();
            assert_eq!(config.history_window().unwrap(), Duration::from_secs(300));
        });

        temp_env::with_var(
            "SENSVIEW_HISTORY_WINDOW_MINUTES",
            Some(u64::MAX.to_string()),
            || {
                let config = SensViewConfig::load().unwrap();
                assert!(config.history_window().is_err());
            },
        );
    }

    #[test]
    #[serial]
    fn test_load_configuration() {
        load_configuration().unwrap();
        assert!(SENSVIEW_CONFIG.get().is_some());

        let config = get().unwrap();
        assert_eq!(config.history_window_minutes, 30);
    }
}
