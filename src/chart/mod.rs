pub mod chart_surface;
pub mod memory_chart;

pub use chart_surface::{
    AxisHandle, AxisInfo, AxisKind, ChartSurface, SeriesHandle, SeriesInfo, SeriesSpec,
};
pub use memory_chart::MemoryChart;
