//! Output formatting and persistence for analysis results.
//!
//! Supports logging the report, JSON export, and CSV export of tidy records
//! and test results.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{AnalysisReport, TestResult};
use crate::records::TidyRecord;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Flat CSV row for a [`TestResult`].
#[derive(Debug, Serialize)]
struct TestResultRow<'a> {
    scope: String,
    metric: &'a str,
    peak_n: usize,
    peak_mean: Option<f64>,
    off_peak_n: usize,
    off_peak_mean: Option<f64>,
    mean_difference: Option<f64>,
    t_statistic: Option<f64>,
    degrees_of_freedom: Option<f64>,
    p_value: Option<f64>,
    ci_lower: Option<f64>,
    ci_upper: Option<f64>,
    effect_size: Option<f64>,
    verdict: String,
}

impl<'a> From<&'a TestResult> for TestResultRow<'a> {
    fn from(r: &'a TestResult) -> Self {
        Self {
            scope: r.scope.to_string(),
            metric: r.metric.name(),
            peak_n: r.peak.n,
            peak_mean: r.peak.mean,
            off_peak_n: r.off_peak.n,
            off_peak_mean: r.off_peak.mean,
            mean_difference: r.mean_difference,
            t_statistic: r.t_statistic,
            degrees_of_freedom: r.degrees_of_freedom,
            p_value: r.p_value,
            ci_lower: r.confidence_interval.map(|ci| ci.lower),
            ci_upper: r.confidence_interval.map(|ci| ci.upper),
            effect_size: r.effect_size,
            verdict: format!("{:?}", r.verdict).to_lowercase(),
        }
    }
}

/// Logs the report as pretty-printed JSON.
pub fn log_report(report: &AnalysisReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes the report as pretty-printed JSON, replacing any existing file.
pub fn write_report_json(path: impl AsRef<Path>, report: &AnalysisReport) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    debug!(path = %path.display(), "Wrote report JSON");
    Ok(())
}

/// Writes every tidy record as a CSV row, replacing any existing file.
pub fn write_tidy_csv(path: impl AsRef<Path>, records: &[TidyRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = records.len(), "Wrote tidy CSV");
    Ok(())
}

/// Appends test results as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_test_results(path: impl AsRef<Path>, results: &[TestResult]) -> Result<()> {
    let path = path.as_ref();
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending test results");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for result in results {
        writer.serialize(TestResultRow::from(result))?;
    }
    writer.flush()?;

    Ok(())
}
