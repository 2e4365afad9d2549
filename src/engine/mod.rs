pub mod event_loop;
pub mod history_loader;
pub mod live_fanin;
pub mod reconciler;
pub mod state;

pub use event_loop::{EngineOptions, EventLoop};
pub use history_loader::{HistoryLoader, HistoryOutcome};
pub use live_fanin::LiveFanIn;
pub use reconciler::{ChartReconciler, Effect};
pub use state::AppState;
