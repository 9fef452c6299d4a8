//! # revcast
//!
//! Release-vintage revision analysis and real-time nowcast correction for
//! macroeconomic series.
//!
//! Takes a panel of data releases indexed by target period and release
//! horizon, derives revision and forecast-error series, runs a battery of
//! rationality regressions (bias, Mincer-Zarnowitz, encompassing, omnibus)
//! with Newey-West standard errors, and evaluates a real-time nowcast
//! correction scheme built on exponentially-smoothed release histories,
//! with strict train/evaluation separation, expanding-window forecast
//! combination, and relative-RMSE / Diebold-Mariano / encompassing
//! diagnostics.

pub mod config;
pub mod core;
pub mod derive;
pub mod error;
pub mod eval;
pub mod io;
pub mod nowcast;
pub mod pipeline;
pub mod rationality;
pub mod regress;
pub mod report;

pub use error::{Result, RevcastError};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{BenchmarkPanel, Month, ReleasePanel, ReleasePanelBuilder};
    pub use crate::derive::{align, derive, JoinPolicy, SmoothingRule};
    pub use crate::error::{Result, RevcastError};
    pub use crate::eval::{compare_forecasts, ForecastComparison};
    pub use crate::nowcast::{CorrectionModel, HorizonData, TrainEvalSplit};
    pub use crate::pipeline::{run_pipeline, PipelineOutput};
    pub use crate::rationality::{run_battery, BatteryReport, TestKind};
}
