//! Data types produced by the aggregation and testing stages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::analyzers::effect::{EffectClass, Verdict};
use crate::records::Metric;

/// Per-(line, station) sums used to rank stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStationSummary {
    pub line: String,
    pub station: String,
    pub boarding: f64,
    pub alighting: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn around(center: f64, half_width: f64) -> Self {
        Self {
            lower: center - half_width,
            upper: center + half_width,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Descriptive statistics of one metric within one group (a line or an hour).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub key: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub confidence_interval: Option<ConfidenceInterval>,
}

/// Which records a test covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "line")]
pub enum Scope {
    Overall,
    Line(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Overall => f.write_str("overall"),
            Scope::Line(line) => f.write_str(line),
        }
    }
}

/// Size, mean and sample variance of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSummary {
    pub n: usize,
    pub mean: Option<f64>,
    pub variance: Option<f64>,
}

/// Peak vs. non-peak comparison of one metric within one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub scope: Scope,
    pub metric: Metric,
    pub peak: SampleSummary,
    pub off_peak: SampleSummary,
    pub mean_difference: Option<f64>,
    pub standard_error: Option<f64>,
    pub t_statistic: Option<f64>,
    pub degrees_of_freedom: Option<f64>,
    pub p_value: Option<f64>,
    pub confidence_interval: Option<ConfidenceInterval>,
    pub effect_size: Option<f64>,
    pub effect: Option<EffectClass>,
    pub verdict: Verdict,
    /// Why the test is undetermined, when it is.
    pub note: Option<String>,
}

impl TestResult {
    pub fn record_count(&self) -> usize {
        self.peak.n + self.off_peak.n
    }
}

/// Everything one run derives from the tidy records.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub record_count: usize,
    pub top_stations: BTreeMap<String, Vec<String>>,
    pub line_totals: Vec<GroupStats>,
    pub hourly_boarding_ratio: Vec<GroupStats>,
    pub overall: Vec<TestResult>,
    pub per_line: Vec<TestResult>,
}
