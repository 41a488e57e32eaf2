//! Run configuration.
//!
//! Every knob the pipeline uses lives here instead of as a literal at the
//! call site. The JSON file is optional and may set any subset of fields:
//!
//! ```json
//! {
//!   "page_size": 500,
//!   "peak_hours": [{ "start": 7, "end": 9 }],
//!   "interval": { "fixed": { "z": 2.0 } }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::records::Hour;

/// How the half-width of a confidence interval is sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalMethod {
    /// Student-t critical value for `1 - alpha` at the test's degrees of freedom.
    Welch,
    /// A fixed multiplier, e.g. `z = 2.0` for a two-sigma interval.
    Fixed { z: f64 },
}

/// Inclusive range of hours, e.g. 7..=9 for the morning commute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    pub fn contains(&self, hour: Hour) -> bool {
        (self.start..=self.end).contains(&hour.value())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub api_base_url: String,
    pub dataset: String,
    pub page_size: usize,
    pub request_delay_ms: u64,
    pub encodings: Vec<String>,
    pub lines: Vec<String>,
    pub peak_hours: Vec<HourRange>,
    pub top_k: usize,
    pub alpha: f64,
    pub interval: IntervalMethod,
    pub output_dir: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://openapi.seoul.go.kr:8088".to_string(),
            dataset: "CardSubwayTime".to_string(),
            page_size: 1000,
            request_delay_ms: 500,
            encodings: vec!["utf-8".into(), "cp949".into(), "euc-kr".into()],
            lines: (1..=9).map(|n| format!("{n}호선")).collect(),
            peak_hours: vec![
                HourRange { start: 7, end: 9 },
                HourRange { start: 17, end: 19 },
            ],
            top_k: 10,
            alpha: 0.05,
            interval: IntervalMethod::Welch,
            output_dir: ".".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`. Missing fields keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config '{path}'"))?;
        Ok(config)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn is_peak(&self, hour: Hour) -> bool {
        self.peak_hours.iter().any(|r| r.contains(hour))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_commute_windows() {
        let config = AnalysisConfig::default();
        assert_eq!(config.lines.len(), 9);
        assert_eq!(config.lines[0], "1호선");
        assert_eq!(config.lines[8], "9호선");
        assert!(config.is_peak(Hour::new(7).unwrap()));
        assert!(config.is_peak(Hour::new(19).unwrap()));
        assert!(!config.is_peak(Hour::new(10).unwrap()));
        assert!(!config.is_peak(Hour::new(20).unwrap()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "top_k": 3, "interval": { "fixed": { "z": 2.0 } } }"#)
                .unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.interval, IntervalMethod::Fixed { z: 2.0 });
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.alpha, 0.05);
    }

    #[test]
    fn test_interval_welch_from_string() {
        let config: AnalysisConfig = serde_json::from_str(r#"{ "interval": "welch" }"#).unwrap();
        assert_eq!(config.interval, IntervalMethod::Welch);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(AnalysisConfig::load("/definitely/not/here.json").is_err());
    }
}
