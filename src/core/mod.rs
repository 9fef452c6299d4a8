//! Core data structures: target periods and release-vintage panels.

pub mod panel;
pub mod period;

pub use panel::{is_missing, BenchmarkPanel, ReleasePanel, ReleasePanelBuilder};
pub use period::{month_range, Month};
