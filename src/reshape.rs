//! Wide-to-tidy conversion.
//!
//! Both sources deliver one row per station with one column per
//! (hour, direction) pair. Each value column is classified once, then every
//! row is melted into per-hour cells and the two directions are paired back
//! up on (line, station, hour).

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::records::{Hour, RawTable, TidyRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Boarding,
    Alighting,
}

/// Naming convention of a wide ridership table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnScheme {
    pub line_column: String,
    pub station_column: String,
    /// Text immediately before the hour digits (may be empty).
    pub hour_prefix: String,
    /// Text immediately after the hour digits.
    pub hour_suffix: String,
    pub boarding_marker: String,
    pub alighting_marker: String,
}

impl ColumnScheme {
    /// `SBWY_ROUT_LN_NM`, `STTN`, `HR_7_GET_ON_NOPE` / `HR_7_GET_OFF_NOPE`.
    pub fn open_api() -> Self {
        Self {
            line_column: "SBWY_ROUT_LN_NM".into(),
            station_column: "STTN".into(),
            hour_prefix: "HR_".into(),
            hour_suffix: "_".into(),
            boarding_marker: "GET_ON".into(),
            alighting_marker: "GET_OFF".into(),
        }
    }

    /// `호선명`, `지하철역`, `04시-05시 승차인원` / `04시-05시 하차인원`.
    pub fn card_csv() -> Self {
        Self {
            line_column: "호선명".into(),
            station_column: "지하철역".into(),
            hour_prefix: String::new(),
            hour_suffix: "시-".into(),
            boarding_marker: "승차".into(),
            alighting_marker: "하차".into(),
        }
    }

    /// Picks the preset whose line column is present, defaulting to the API layout.
    pub fn detect(table: &RawTable) -> Self {
        let csv = Self::card_csv();
        if table.column_index(&csv.line_column).is_some() {
            csv
        } else {
            Self::open_api()
        }
    }

    /// Classifies a value column as (hour, direction), if it is one.
    pub fn classify(&self, column: &str) -> Option<(Hour, Direction)> {
        let upper = column.trim().to_uppercase();
        let direction = if upper.contains(&self.alighting_marker.to_uppercase()) {
            Direction::Alighting
        } else if upper.contains(&self.boarding_marker.to_uppercase()) {
            Direction::Boarding
        } else {
            return None;
        };
        let hour = self.extract_hour(&upper)?;
        Some((hour, direction))
    }

    fn extract_hour(&self, column: &str) -> Option<Hour> {
        let prefix = self.hour_prefix.to_uppercase();
        let suffix = self.hour_suffix.to_uppercase();

        let start = column.find(&prefix)? + prefix.len();
        let rest = &column[start..];
        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 || !rest[digits_len..].starts_with(&suffix) {
            return None;
        }
        Hour::new(rest[..digits_len].parse().ok()?)
    }
}

/// Parses a ridership cell. Empty, non-numeric, non-finite or negative
/// values become zero; thousands separators are accepted.
pub fn coerce_count(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Melts `table` into tidy records, keeping only whitelisted lines.
///
/// Rows keep input order and hours within a row come out chronologically.
/// A repeated (line, station, hour) keeps its first values.
///
/// # Errors
///
/// [`AnalysisError::SchemaMismatch`] if the line or station column is
/// missing, or if no column carries an hour and direction.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn reshape(
    table: &RawTable,
    scheme: &ColumnScheme,
    lines: &[String],
) -> AnalysisResult<Vec<TidyRecord>> {
    let line_idx = table.column_index(&scheme.line_column).ok_or_else(|| {
        AnalysisError::schema_mismatch(format!(
            "missing line column '{}'. columns={:?}",
            scheme.line_column, table.columns
        ))
    })?;
    let station_idx = table.column_index(&scheme.station_column).ok_or_else(|| {
        AnalysisError::schema_mismatch(format!(
            "missing station column '{}'. columns={:?}",
            scheme.station_column, table.columns
        ))
    })?;

    let value_columns: Vec<(usize, Hour, Direction)> = table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| scheme.classify(name).map(|(h, d)| (idx, h, d)))
        .collect();
    if value_columns.is_empty() {
        return Err(AnalysisError::schema_mismatch(
            "no hour/direction value columns found",
        ));
    }
    debug!(value_columns = value_columns.len(), "Classified value columns");

    let mut seen: HashSet<(String, String, Hour)> = HashSet::new();
    let mut records = Vec::new();
    let mut dropped_rows = 0usize;
    let mut duplicates = 0usize;

    for row in &table.rows {
        let line = row.get(line_idx).unwrap_or("").trim();
        if !lines.iter().any(|l| l == line) {
            dropped_rows += 1;
            continue;
        }
        let station = row.get(station_idx).unwrap_or("").trim();

        let mut cells: BTreeMap<Hour, (f64, f64)> = BTreeMap::new();
        for &(idx, hour, direction) in &value_columns {
            let value = coerce_count(row.get(idx).unwrap_or(""));
            let cell = cells.entry(hour).or_insert((0.0, 0.0));
            match direction {
                Direction::Boarding => cell.0 = value,
                Direction::Alighting => cell.1 = value,
            }
        }

        for (hour, (boarding, alighting)) in cells {
            if !seen.insert((line.to_string(), station.to_string(), hour)) {
                duplicates += 1;
                continue;
            }
            records.push(TidyRecord::new(line, station, hour, boarding, alighting));
        }
    }

    info!(
        records = records.len(),
        dropped_rows, duplicates, "Reshaped wide table"
    );
    Ok(records)
}
