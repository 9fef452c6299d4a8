//! Derived series: revisions, errors, benchmark alignment, smoothed states.

pub mod align;
pub mod ews;
pub mod revisions;

pub use align::{align, AlignedPanel, JoinPolicy, JoinSummary};
pub use ews::{smooth_series, SmoothedState, SmoothingRule};
pub use revisions::{derive, DerivedPanel};
