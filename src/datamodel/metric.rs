use super::Unit;
use std::fmt;

/// Readiness stage of a selected metric.
///
/// Variants are declared in lifecycle order, so `PartialOrd` follows the
/// lifecycle: `Added < Initializing < Initialized < Plotted < Removed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricState {
    Added,
    Initializing,
    Initialized,
    Plotted,
    Removed,
}

impl MetricState {
    /// The only state a forward transition may reach from `self`.
    pub fn next(self) -> Option<MetricState> {
        match self {
            MetricState::Added => Some(MetricState::Initializing),
            MetricState::Initializing => Some(MetricState::Initialized),
            MetricState::Initialized => Some(MetricState::Plotted),
            MetricState::Plotted => Some(MetricState::Removed),
            MetricState::Removed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == MetricState::Removed
    }

    pub fn can_transition_to(self, to: MetricState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == MetricState::Removed || self.next() == Some(to)
    }
}

impl fmt::Display for MetricState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricState::Added => "Added",
            MetricState::Initializing => "Initializing",
            MetricState::Initialized => "Initialized",
            MetricState::Plotted => "Plotted",
            MetricState::Removed => "Removed",
        };
        write!(f, "{}", s)
    }
}

/// Registry entry for one selection of a metric.
///
/// `generation` identifies the selection: selecting a metric again after it
/// was removed creates an entry with a new generation, so completions that
/// belong to the old selection can be told apart.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricInfo {
    pub state: MetricState,
    pub unit: Option<Unit>,
    pub generation: u64,
}

impl MetricInfo {
    pub fn new(generation: u64) -> Self {
        Self {
            state: MetricState::Added,
            unit: None,
            generation,
        }
    }
}
