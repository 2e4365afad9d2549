use crate::datamodel::Measurement;

/// Everything that can change the dashboard state.
///
/// External triggers (selection edits, fetch and stream completions, the
/// cadence) are all queued as events and applied one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CatalogListed(Vec<String>),
    SelectionAdded(String),
    SelectionRemoved(String),
    HistoryLoaded {
        metric: String,
        // Selection the fetch was issued for
        generation: u64,
        measurements: Vec<Measurement>,
    },
    HistoryFailed {
        metric: String,
        generation: u64,
        error: String,
    },
    LiveMeasurement(Measurement),
    LiveFeedEnded,
    Tick,
    Unmount,
}
