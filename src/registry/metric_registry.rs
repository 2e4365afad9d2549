use super::error::RegistryError;
use crate::datamodel::{MetricInfo, MetricState, Unit};
use std::collections::BTreeMap;
use tracing::debug;

/// Per-metric lifecycle state and metadata.
///
/// Entries are only created by a selection and are kept, marked
/// `Removed`, after deselection. Selecting the metric again replaces the
/// entry with a fresh one carrying a new generation.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    entries: BTreeMap<String, MetricInfo>,
    next_generation: u64,
    // Bumped on every mutation, lets observers detect changes
    revision: u64,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an `Added` entry and returns its generation.
    pub fn add(&mut self, metric: &str) -> Result<u64, RegistryError> {
        if let Some(info) = self.entries.get(metric) {
            if !info.state.is_terminal() {
                return Err(RegistryError::AlreadySelected {
                    metric: metric.to_string(),
                });
            }
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entries
            .insert(metric.to_string(), MetricInfo::new(generation));
        self.revision += 1;
        debug!(metric, generation, "metric added");
        Ok(generation)
    }

    pub fn get(&self, metric: &str) -> Option<&MetricInfo> {
        self.entries.get(metric)
    }

    pub fn state(&self, metric: &str) -> Option<MetricState> {
        self.entries.get(metric).map(|info| info.state)
    }

    pub fn unit(&self, metric: &str) -> Option<&Unit> {
        self.entries.get(metric).and_then(|info| info.unit.as_ref())
    }

    /// Moves the metric one step forward in its lifecycle, or to `Removed`.
    pub fn transition(&mut self, metric: &str, to: MetricState) -> Result<(), RegistryError> {
        let info = self
            .entries
            .get_mut(metric)
            .ok_or_else(|| RegistryError::unknown(metric))?;
        if !info.state.can_transition_to(to) {
            return Err(RegistryError::invalid_transition(metric, info.state, to));
        }
        debug!(metric, from = %info.state, to = %to, "metric state transition");
        info.state = to;
        self.revision += 1;
        Ok(())
    }

    /// Marks the metric as being fetched and returns the generation the
    /// fetch belongs to. A metric already `Initializing` is refused, which
    /// keeps a single fetch in flight per metric.
    pub fn begin_initializing(&mut self, metric: &str) -> Result<u64, RegistryError> {
        self.transition(metric, MetricState::Initializing)?;
        Ok(self.entries[metric].generation)
    }

    /// True while `generation` is the live selection of `metric` and its
    /// history fetch has not completed yet.
    pub fn awaits_history(&self, metric: &str, generation: u64) -> bool {
        self.entries.get(metric).is_some_and(|info| {
            info.generation == generation && info.state == MetricState::Initializing
        })
    }

    /// Records the unit of a metric. The first recorded unit wins.
    pub fn set_unit(&mut self, metric: &str, unit: Unit) -> Result<(), RegistryError> {
        let info = self
            .entries
            .get_mut(metric)
            .ok_or_else(|| RegistryError::unknown(metric))?;
        if let Some(existing) = &info.unit {
            if *existing != unit {
                debug!(metric, %existing, ignored = %unit, "metric unit already recorded");
            }
            return Ok(());
        }
        info.unit = Some(unit);
        self.revision += 1;
        Ok(())
    }

    pub fn mark_removed(&mut self, metric: &str) -> Result<(), RegistryError> {
        self.transition(metric, MetricState::Removed)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricInfo)> {
        self.entries.iter()
    }

    /// Name and state of every entry, detached from the registry so the
    /// caller can mutate it while walking the list.
    pub fn snapshot(&self) -> Vec<(String, MetricState)> {
        self.entries
            .iter()
            .map(|(name, info)| (name.clone(), info.state))
            .collect()
    }

    pub fn count_in_state(&self, state: MetricState) -> usize {
        self.entries.values().filter(|info| info.state == state).count()
    }

    pub fn plotted_count(&self) -> usize {
        self.count_in_state(MetricState::Plotted)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
