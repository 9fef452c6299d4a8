//! Plain-text rendering of coefficient tables, evaluation results, and the
//! skip/failure summary.
//!
//! Stars follow the usual convention: `*` at 0.10, `**` at 0.05, `***` at
//! 0.01.

use crate::eval::ForecastComparison;
use crate::pipeline::PipelineSkip;
use crate::rationality::{BatteryReport, TestResult};
use std::fmt::Write as _;

/// Significance stars for a p-value.
pub fn stars(p_value: f64) -> &'static str {
    if p_value.is_nan() {
        ""
    } else if p_value < 0.01 {
        "***"
    } else if p_value < 0.05 {
        "**"
    } else if p_value < 0.10 {
        "*"
    } else {
        ""
    }
}

/// Render one fitted specification as a coefficient table.
pub fn coefficient_table(result: &TestResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (horizon {}, n = {}, HAC lag {})",
        result.kind,
        result.horizon,
        result.fit.nobs(),
        result.fit.hac_lag()
    );
    let _ = writeln!(
        out,
        "{:<22} {:>10} {:>10} {:>8} {:>8}",
        "regressor", "coef", "se", "t", "p"
    );
    for (j, name) in result.fit.names().iter().enumerate() {
        let p = result.fit.p_values()[j];
        let _ = writeln!(
            out,
            "{:<22} {:>10.4} {:>10.4} {:>8.2} {:>8.3}{}",
            name,
            result.fit.coefficients()[j],
            result.fit.std_errors()[j],
            result.fit.t_stats()[j],
            p,
            stars(p)
        );
    }
    if let Some(joint) = &result.joint {
        let _ = writeln!(
            out,
            "joint chi2({}) = {:.3}, p = {:.3}{}",
            joint.df,
            joint.statistic,
            joint.p_value,
            stars(joint.p_value)
        );
    }
    out
}

/// Render every fitted specification of a battery report, horizon by
/// horizon, followed by the skip ledger.
pub fn battery_table(report: &BatteryReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        out.push_str(&coefficient_table(result));
        out.push('\n');
    }
    if !report.skipped.is_empty() {
        let _ = writeln!(out, "skipped units: {}", report.skipped.len());
        for skip in &report.skipped {
            match skip.kind {
                Some(kind) => {
                    let _ = writeln!(out, "  horizon {} {}: {}", skip.horizon, kind, skip.reason);
                }
                None => {
                    let _ = writeln!(out, "  horizon {}: {}", skip.horizon, skip.reason);
                }
            }
        }
    }
    out
}

/// Render the evaluation results table.
pub fn comparison_table(rows: &[ForecastComparison]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>7} {:>10} {:>8} {:>8} {:>10} {:>8} {:>5}",
        "horizon", "rel_rmse", "dm", "dm_p", "enc_beta", "enc_t", "n"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>7} {:>10.2} {:>8.2} {:>8.3}{:<3} {:>10.3} {:>8.2} {:>5}",
            row.horizon,
            row.relative_rmse,
            row.dm_stat,
            row.dm_p_value,
            stars(row.dm_p_value),
            row.encompassing_beta,
            row.encompassing_t_stat,
            row.nobs
        );
    }
    out
}

/// Render the pipeline's skipped/failed-unit summary that accompanies the
/// final output.
pub fn skip_summary(skipped: &[PipelineSkip]) -> String {
    if skipped.is_empty() {
        return "no skipped units\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "skipped units: {}", skipped.len());
    for skip in skipped {
        let _ = writeln!(
            out,
            "  {} at horizon {}: {}",
            skip.stage, skip.horizon, skip.reason
        );
    }
    out
}
