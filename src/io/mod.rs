//! Long-format CSV ingestion of release and benchmark panels.
//!
//! The expected layout is one row per `(target_period, horizon)` key:
//!
//! ```csv
//! target_period,horizon,value
//! 2019-01,1,2.4
//! 2019-01,2,2.6
//! ```
//!
//! An empty `value` field is a missing cell. Duplicate keys are rejected.
//! How these tables are produced (database extraction, vintage scraping) is
//! outside this crate.

use crate::core::{BenchmarkPanel, Month, ReleasePanel};
use crate::error::{Result, RevcastError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PanelRow {
    target_period: String,
    horizon: usize,
    value: Option<f64>,
}

/// Parsed long-format rows as a dense period × horizon grid.
struct RawGrid {
    periods: Vec<Month>,
    columns: Vec<Vec<f64>>,
}

fn read_grid<R: Read>(reader: R) -> Result<RawGrid> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut cells: BTreeMap<(Month, usize), f64> = BTreeMap::new();
    let mut max_horizon = 0usize;

    for record in csv_reader.deserialize() {
        let row: PanelRow = record.map_err(|e| RevcastError::Input(e.to_string()))?;
        let period: Month = row.target_period.parse()?;
        if row.horizon == 0 {
            return Err(RevcastError::InvalidParameter(format!(
                "horizon must be positive at {period}"
            )));
        }
        max_horizon = max_horizon.max(row.horizon);
        let value = row.value.unwrap_or(f64::NAN);
        if cells.insert((period, row.horizon), value).is_some() {
            return Err(RevcastError::InvalidParameter(format!(
                "duplicate key ({period}, {})",
                row.horizon
            )));
        }
    }

    if cells.is_empty() {
        return Err(RevcastError::EmptyData);
    }

    let mut periods: Vec<Month> = cells.keys().map(|&(p, _)| p).collect();
    periods.dedup();

    let mut columns = vec![vec![f64::NAN; periods.len()]; max_horizon];
    for (&(period, horizon), &value) in &cells {
        let t = periods
            .binary_search(&period)
            .expect("period collected from the same map");
        columns[horizon - 1][t] = value;
    }

    log::debug!(
        "read panel: {} periods x {} horizons",
        periods.len(),
        max_horizon
    );
    Ok(RawGrid { periods, columns })
}

/// Read a release panel from long-format CSV.
pub fn read_release_panel<R: Read>(reader: R) -> Result<ReleasePanel> {
    let grid = read_grid(reader)?;
    ReleasePanel::new(grid.periods, grid.columns)
}

/// Read a release panel from a CSV file.
pub fn read_release_panel_path<P: AsRef<Path>>(path: P) -> Result<ReleasePanel> {
    let file = std::fs::File::open(path).map_err(|e| RevcastError::Input(e.to_string()))?;
    read_release_panel(file)
}

/// Read a benchmark-indicator panel from long-format CSV.
pub fn read_benchmark_panel<R: Read>(reader: R) -> Result<BenchmarkPanel> {
    let grid = read_grid(reader)?;
    BenchmarkPanel::new(grid.periods, grid.columns)
}

/// Read a benchmark-indicator panel from a CSV file.
pub fn read_benchmark_panel_path<P: AsRef<Path>>(path: P) -> Result<BenchmarkPanel> {
    let file = std::fs::File::open(path).map_err(|e| RevcastError::Input(e.to_string()))?;
    read_benchmark_panel(file)
}
