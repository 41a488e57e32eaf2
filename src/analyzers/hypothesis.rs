//! Peak vs. non-peak comparison with Welch's two-sample t-test.
//!
//! Every p-value comes from the Welch test. The confidence interval of the
//! mean difference shares its standard error; only the multiplier differs
//! between [`IntervalMethod::Welch`] (t critical value at the Welch degrees
//! of freedom) and [`IntervalMethod::Fixed`].

use std::collections::BTreeSet;
use tracing::debug;

use crate::analyzers::distribution::{student_t_quantile, two_sided_p_value};
use crate::analyzers::effect::{Verdict, classify_effect, cohens_d, verdict};
use crate::analyzers::types::{ConfidenceInterval, SampleSummary, Scope, TestResult};
use crate::analyzers::utility::{mean, variance};
use crate::config::{AnalysisConfig, HourRange, IntervalMethod};
use crate::error::{AnalysisError, AnalysisResult};
use crate::records::{Metric, TidyRecord, metric_values};

/// Records of one scope split by peak-hour membership.
#[derive(Debug, Default)]
pub struct PeakPartition<'a> {
    pub peak: Vec<&'a TidyRecord>,
    pub off_peak: Vec<&'a TidyRecord>,
}

impl<'a> PeakPartition<'a> {
    pub fn split(
        records: impl IntoIterator<Item = &'a TidyRecord>,
        peak_hours: &[HourRange],
    ) -> Self {
        let (peak, off_peak): (Vec<&'a TidyRecord>, Vec<&'a TidyRecord>) = records
            .into_iter()
            .partition(|r| peak_hours.iter().any(|range| range.contains(r.hour)));
        Self { peak, off_peak }
    }

    pub fn len(&self) -> usize {
        self.peak.len() + self.off_peak.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Welch's unequal-variance t-test of `a` against `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchTest {
    pub mean_difference: f64,
    pub standard_error: f64,
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub confidence_interval: ConfidenceInterval,
}

/// Runs Welch's t-test on two samples.
///
/// # Errors
///
/// [`AnalysisError::InsufficientData`] when either sample has fewer than
/// two values or the combined standard error is zero.
pub fn welch_t_test(
    a: &[f64],
    b: &[f64],
    alpha: f64,
    interval: IntervalMethod,
) -> AnalysisResult<WelchTest> {
    if a.len() < 2 || b.len() < 2 {
        return Err(AnalysisError::insufficient_data(format!(
            "need at least two values per partition (got {} and {})",
            a.len(),
            b.len()
        )));
    }

    // Both samples are non-empty past the guard above.
    let (ma, mb) = (mean(a).unwrap_or_default(), mean(b).unwrap_or_default());
    let (va, vb) = (
        variance(a, ma).unwrap_or_default(),
        variance(b, mb).unwrap_or_default(),
    );
    let (na, nb) = (a.len() as f64, b.len() as f64);

    let (sa, sb) = (va / na, vb / nb);
    let standard_error = (sa + sb).sqrt();
    if !standard_error.is_finite() || standard_error == 0.0 {
        return Err(AnalysisError::insufficient_data(
            "both partitions have zero variance",
        ));
    }

    let mean_difference = ma - mb;
    let t_statistic = mean_difference / standard_error;
    let degrees_of_freedom =
        (sa + sb).powi(2) / (sa.powi(2) / (na - 1.0) + sb.powi(2) / (nb - 1.0));
    let p_value = two_sided_p_value(t_statistic, degrees_of_freedom);

    let critical = match interval {
        IntervalMethod::Welch => student_t_quantile(1.0 - alpha / 2.0, degrees_of_freedom),
        IntervalMethod::Fixed { z } => z,
    };

    Ok(WelchTest {
        mean_difference,
        standard_error,
        t_statistic,
        degrees_of_freedom,
        p_value,
        confidence_interval: ConfidenceInterval::around(mean_difference, critical * standard_error),
    })
}

fn summary(values: &[f64]) -> SampleSummary {
    let m = mean(values);
    SampleSummary {
        n: values.len(),
        mean: m,
        variance: m.and_then(|m| variance(values, m)),
    }
}

/// Compares two already-extracted samples. Never fails: a test that cannot
/// be computed yields [`Verdict::Undetermined`] with the reason in `note`.
pub fn compare_samples(
    scope: Scope,
    metric: Metric,
    peak: &[f64],
    off_peak: &[f64],
    config: &AnalysisConfig,
) -> TestResult {
    let peak_summary = summary(peak);
    let off_summary = summary(off_peak);

    let mean_difference = match (peak_summary.mean, off_summary.mean) {
        (Some(p), Some(o)) => Some(p - o),
        _ => None,
    };

    let effect_size = match (
        peak_summary.mean,
        peak_summary.variance,
        off_summary.mean,
        off_summary.variance,
    ) {
        (Some(mp), Some(vp), Some(mo), Some(vo)) => cohens_d(mp, vp, mo, vo),
        _ => None,
    };

    let mut result = TestResult {
        scope,
        metric,
        peak: peak_summary,
        off_peak: off_summary,
        mean_difference,
        standard_error: None,
        t_statistic: None,
        degrees_of_freedom: None,
        p_value: None,
        confidence_interval: None,
        effect_size,
        effect: effect_size.map(classify_effect),
        verdict: Verdict::Undetermined,
        note: None,
    };

    match welch_t_test(peak, off_peak, config.alpha, config.interval) {
        Ok(test) => {
            result.standard_error = Some(test.standard_error);
            result.t_statistic = Some(test.t_statistic);
            result.degrees_of_freedom = Some(test.degrees_of_freedom);
            result.p_value = Some(test.p_value);
            result.confidence_interval = Some(test.confidence_interval);
            result.verdict = verdict(Some(test.p_value), config.alpha);
        }
        Err(e) => {
            debug!(scope = %result.scope, metric = %metric, error = %e, "Test undetermined");
            result.note = Some(e.to_string());
        }
    }

    result
}

/// Partitions `records` by peak hour and compares `metric` across the two sets.
pub fn compare<'a>(
    records: impl IntoIterator<Item = &'a TidyRecord>,
    scope: Scope,
    metric: Metric,
    config: &AnalysisConfig,
) -> TestResult {
    let partition = PeakPartition::split(records, &config.peak_hours);
    let peak = metric_values(partition.peak.iter().copied(), metric);
    let off_peak = metric_values(partition.off_peak.iter().copied(), metric);
    compare_samples(scope, metric, &peak, &off_peak, config)
}

/// One overall comparison per count metric.
pub fn compare_overall(records: &[TidyRecord], config: &AnalysisConfig) -> Vec<TestResult> {
    Metric::COUNTS
        .iter()
        .map(|&metric| compare(records, Scope::Overall, metric, config))
        .collect()
}

/// One comparison of `metric` for every distinct line in `records`, by line name.
pub fn compare_per_line(
    records: &[TidyRecord],
    metric: Metric,
    config: &AnalysisConfig,
) -> Vec<TestResult> {
    let lines: BTreeSet<&str> = records.iter().map(|r| r.line.as_str()).collect();
    lines
        .into_iter()
        .map(|line| {
            compare(
                records.iter().filter(|r| r.line == line),
                Scope::Line(line.to_string()),
                metric,
                config,
            )
        })
        .collect()
}
