//! Row types shared by every pipeline stage.

use serde::{Serialize, Serializer};
use std::fmt;

/// Canonical hour labels in chronological order.
///
/// Sorting hour labels as strings would put `10시` before `2시`; anything that
/// orders hours goes through this table (or [`Hour`]'s `Ord`) instead.
pub const HOUR_LABELS: [&str; 24] = [
    "0시", "1시", "2시", "3시", "4시", "5시", "6시", "7시", "8시", "9시", "10시", "11시", "12시",
    "13시", "14시", "15시", "16시", "17시", "18시", "19시", "20시", "21시", "22시", "23시",
];

/// An hour of the day, 0 through 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hour(u8);

impl Hour {
    pub const ALL: [Hour; 24] = {
        let mut all = [Hour(0); 24];
        let mut i = 0;
        while i < 24 {
            all[i] = Hour(i as u8);
            i += 1;
        }
        all
    };

    pub fn new(value: u8) -> Option<Self> {
        (value < 24).then_some(Hour(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        HOUR_LABELS[self.0 as usize]
    }

    /// Parses a label such as `"7시"` or `"07시"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let digits = label.trim().strip_suffix('시')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Hour::new(digits.parse().ok()?)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Hour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One source row: raw cell text aligned with [`RawTable::columns`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub values: Vec<String>,
}

/// Wide table as delivered by a source, before any typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name.trim()))
    }

    pub fn push_row(&mut self, values: Vec<String>) {
        self.rows.push(RawRecord { values });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RawRecord {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }
}

/// One observation: a station's ridership during one hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyRecord {
    pub line: String,
    pub station: String,
    pub hour: Hour,
    pub boarding: f64,
    pub alighting: f64,
    pub total: f64,
}

impl TidyRecord {
    /// Builds a record; `total` is always derived from the two counts.
    pub fn new(line: &str, station: &str, hour: Hour, boarding: f64, alighting: f64) -> Self {
        Self {
            line: line.to_string(),
            station: station.to_string(),
            hour,
            boarding,
            alighting,
            total: boarding + alighting,
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Boarding => Some(self.boarding),
            Metric::Alighting => Some(self.alighting),
            Metric::Total => Some(self.total),
            Metric::BoardingRatio if self.alighting > 0.0 => Some(self.boarding / self.alighting),
            Metric::BoardingRatio => None,
        }
    }
}

/// Numeric quantity extracted from a [`TidyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Boarding,
    Alighting,
    Total,
    /// Boarding divided by alighting; undefined when nobody alighted.
    BoardingRatio,
}

impl Metric {
    pub const COUNTS: [Metric; 3] = [Metric::Boarding, Metric::Alighting, Metric::Total];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Boarding => "boarding",
            Metric::Alighting => "alighting",
            Metric::Total => "total",
            Metric::BoardingRatio => "boarding_ratio",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collects one metric over a set of records, skipping undefined values.
pub fn metric_values<'a>(
    records: impl IntoIterator<Item = &'a TidyRecord>,
    metric: Metric,
) -> Vec<f64> {
    records
        .into_iter()
        .filter_map(|r| r.metric(metric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_labels_are_chronological() {
        let mut hours: Vec<Hour> = ["10시", "2시", "23시", "0시"]
            .iter()
            .filter_map(|l| Hour::from_label(l))
            .collect();
        hours.sort();
        let labels: Vec<_> = hours.iter().map(|h| h.label()).collect();
        assert_eq!(labels, vec!["0시", "2시", "10시", "23시"]);
    }

    #[test]
    fn test_hour_from_label_accepts_padding() {
        assert_eq!(Hour::from_label("04시"), Hour::new(4));
        assert_eq!(Hour::from_label("24시"), None);
        assert_eq!(Hour::from_label("시"), None);
        assert_eq!(Hour::from_label("7"), None);
    }

    #[test]
    fn test_hour_all_covers_every_label() {
        assert_eq!(Hour::ALL.len(), 24);
        for (i, hour) in Hour::ALL.iter().enumerate() {
            assert_eq!(hour.value() as usize, i);
            assert_eq!(hour.label(), HOUR_LABELS[i]);
        }
    }

    #[test]
    fn test_total_is_derived() {
        let r = TidyRecord::new("1호선", "A", Hour::new(7).unwrap(), 100.0, 50.0);
        assert_eq!(r.total, 150.0);
        assert_eq!(r.metric(Metric::Total), Some(150.0));
    }

    #[test]
    fn test_ratio_undefined_without_alighting() {
        let r = TidyRecord::new("1호선", "A", Hour::new(3).unwrap(), 10.0, 0.0);
        assert_eq!(r.metric(Metric::BoardingRatio), None);
        let r = TidyRecord::new("1호선", "A", Hour::new(3).unwrap(), 10.0, 5.0);
        assert_eq!(r.metric(Metric::BoardingRatio), Some(2.0));
    }

    #[test]
    fn test_column_index_ignores_case() {
        let table = RawTable::new(vec!["line".into(), "HR_7_GET_ON".into()]);
        assert_eq!(table.column_index("LINE"), Some(0));
        assert_eq!(table.column_index("hr_7_get_on"), Some(1));
        assert_eq!(table.column_index("station"), None);
    }
}
