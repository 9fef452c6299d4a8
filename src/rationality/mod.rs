//! Rationality test battery over revision and error series.

pub mod battery;

pub use battery::{run_battery, BatteryReport, SkippedUnit, TestKind, TestResult};
