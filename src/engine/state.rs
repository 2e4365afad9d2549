use crate::datamodel::Measurement;
use crate::registry::{MetricRegistry, RegistryError};
use crate::store::DataPointStore;
use tracing::debug;

/// Application state container.
///
/// Owns the selectable catalog, the ordered selection, the lifecycle
/// registry and the data point store. Everything is mutated through the
/// methods below, from the event loop only.
#[derive(Debug, Default)]
pub struct AppState {
    catalog: Vec<String>,
    selection: Vec<String>,
    registry: MetricRegistry,
    store: DataPointStore,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Sets the selectable metrics. A catalog is only ever set once.
    pub fn set_catalog(&mut self, metrics: Vec<String>) {
        if self.catalog.is_empty() {
            self.catalog = metrics;
        } else {
            debug!(ignored = metrics.len(), "metric catalog already set");
        }
    }

    /// Checks requested metrics against the catalog and drops repeats,
    /// keeping the first occurrence of each.
    pub fn resolve_selection(&self, requested: &[String]) -> Result<Vec<String>, RegistryError> {
        let mut resolved: Vec<String> = Vec::with_capacity(requested.len());
        for metric in requested {
            if !self.catalog.contains(metric) {
                return Err(RegistryError::unknown(metric));
            }
            if !resolved.contains(metric) {
                resolved.push(metric.clone());
            }
        }
        Ok(resolved)
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn is_selected(&self, metric: &str) -> bool {
        self.selection.iter().any(|m| m == metric)
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut MetricRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &DataPointStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut DataPointStore {
        &mut self.store
    }

    pub fn on_selection_added(&mut self, metric: &str) -> Result<(), RegistryError> {
        self.registry.add(metric)?;
        self.selection.push(metric.to_string());
        Ok(())
    }

    pub fn on_selection_removed(&mut self, metric: &str) -> Result<(), RegistryError> {
        let idx = self
            .selection
            .iter()
            .position(|m| m == metric)
            .ok_or_else(|| RegistryError::unknown(metric))?;
        self.registry.mark_removed(metric)?;
        self.selection.remove(idx);
        Ok(())
    }

    /// Merges a live measurement if its metric is currently selected.
    /// Returns whether the measurement was kept.
    pub fn accept_live(&mut self, measurement: &Measurement) -> bool {
        if !self.is_selected(&measurement.metric) {
            return false;
        }
        self.store.merge_measurements(std::iter::once(measurement));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::MetricState;

    #[test]
    fn test_catalog_is_set_once() {
        let mut state = AppState::new();
        state.set_catalog(vec!["pressure".to_string()]);
        state.set_catalog(vec!["temperature".to_string()]);
        assert_eq!(state.catalog(), &["pressure".to_string()]);
    }

    #[test]
    fn test_selection_edits() {
        let mut state = AppState::new();
        state.on_selection_added("pressure").unwrap();
        state.on_selection_added("temperature").unwrap();
        assert_eq!(state.selection(), &["pressure", "temperature"]);

        state.on_selection_removed("pressure").unwrap();
        assert_eq!(state.selection(), &["temperature"]);
        assert_eq!(
            state.registry().state("pressure"),
            Some(MetricState::Removed)
        );

        assert_eq!(
            state.on_selection_removed("pressure"),
            Err(RegistryError::unknown("pressure"))
        );
        assert!(state.on_selection_added("temperature").is_err());
        assert_eq!(state.selection().len(), 1);
    }

    #[test]
    fn test_resolve_selection() {
        let mut state = AppState::new();
        state.set_catalog(vec!["pressure".to_string(), "temperature".to_string()]);

        let requested = vec![
            "temperature".to_string(),
            "pressure".to_string(),
            "temperature".to_string(),
        ];
        let resolved = state.resolve_selection(&requested).unwrap();
        assert_eq!(resolved, vec!["temperature", "pressure"]);

        // Repeats resolve to one selection each, so none is added twice
        for metric in &resolved {
            state.on_selection_added(metric).unwrap();
        }
        assert_eq!(state.selection(), &["temperature", "pressure"]);

        assert_eq!(
            state.resolve_selection(&["humidity".to_string()]),
            Err(RegistryError::unknown("humidity"))
        );
    }

    #[test]
    fn test_live_filter() {
        let mut state = AppState::new();
        state.on_selection_added("pressure").unwrap();

        assert!(state.accept_live(&Measurement::live("pressure", 200, 12.0)));
        assert!(!state.accept_live(&Measurement::live("temperature", 200, 70.0)));

        assert_eq!(state.store().len(), 1);
        let row = state.store().row_at(200).unwrap();
        assert_eq!(row.get("pressure"), Some(12.0));
        assert_eq!(row.get("temperature"), None);
    }
}
