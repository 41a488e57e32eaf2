use chrono::Utc;
use tracing::info;

use crate::analyzers::aggregate::{GroupBy, group_stats, top_stations};
use crate::analyzers::hypothesis::{compare_overall, compare_per_line};
use crate::analyzers::types::AnalysisReport;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::records::{Metric, RawTable, TidyRecord};
use crate::reshape::{ColumnScheme, reshape};
use crate::services::ridership_source::{RidershipSource, SourceKind};

/// Tidy records plus the report derived from them.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub records: Vec<TidyRecord>,
    pub report: AnalysisReport,
}

/// Loads the raw table from `source` and analyzes it.
pub fn run(source: &dyn RidershipSource, config: &AnalysisConfig) -> AnalysisResult<Analysis> {
    let kind = source.kind();
    info!(source = %kind, "Loading ridership table");
    let table = source.load()?;
    analyze(&table, &kind, config)
}

/// Reshapes `table` and derives the full report.
///
/// # Errors
///
/// [`AnalysisError::SchemaMismatch`] from the reshape, or
/// [`AnalysisError::InsufficientData`] when no whitelisted record remains.
#[tracing::instrument(skip_all, fields(source = %source, rows = table.len()))]
pub fn analyze(
    table: &RawTable,
    source: &SourceKind,
    config: &AnalysisConfig,
) -> AnalysisResult<Analysis> {
    let scheme = ColumnScheme::detect(table);
    let records = reshape(table, &scheme, &config.lines)?;
    if records.is_empty() {
        return Err(AnalysisError::insufficient_data(format!(
            "no records for lines [{}]",
            config.lines.join(", ")
        )));
    }
    let report = build_report(&records, source, config);
    Ok(Analysis { records, report })
}

/// Aggregates and tests already-tidy records.
pub fn build_report(
    records: &[TidyRecord],
    source: &SourceKind,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let top = top_stations(records, config.top_k);
    let line_totals = group_stats(
        records,
        GroupBy::Line,
        Metric::Total,
        config.alpha,
        config.interval,
    );
    let hourly_boarding_ratio = group_stats(
        records,
        GroupBy::Hour,
        Metric::BoardingRatio,
        config.alpha,
        config.interval,
    );
    let overall = compare_overall(records, config);
    let per_line = compare_per_line(records, Metric::Total, config);

    info!(
        records = records.len(),
        lines = top.len(),
        tests = overall.len() + per_line.len(),
        "Analysis complete"
    );

    AnalysisReport {
        generated_at: Utc::now(),
        source: source.to_string(),
        record_count: records.len(),
        top_stations: top,
        line_totals,
        hourly_boarding_ratio,
        overall,
        per_line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::effect::Verdict;

    fn source() -> SourceKind {
        SourceKind::File {
            path: "memory.csv".into(),
        }
    }

    fn wide_table() -> RawTable {
        let mut columns = vec!["SBWY_ROUT_LN_NM".to_string(), "STTN".to_string()];
        for h in 0..24 {
            columns.push(format!("HR_{h}_GET_ON_NOPE"));
            columns.push(format!("HR_{h}_GET_OFF_NOPE"));
        }
        let mut table = RawTable::new(columns);
        for (line, station, base) in [("1호선", "서울역", 100), ("1호선", "시청", 80), ("2호선", "강남", 150)] {
            let mut row = vec![line.to_string(), station.to_string()];
            for h in 0..24u32 {
                let peak = matches!(h, 7..=9 | 17..=19);
                let on = if peak { base * 10 + h } else { base + h };
                row.push(on.to_string());
                row.push((on / 2).to_string());
            }
            table.push_row(row);
        }
        table.push_row(vec!["경춘선".into(), "춘천".into()]);
        table
    }

    #[test]
    fn test_analyze_end_to_end() {
        let config = AnalysisConfig::default();
        let table = wide_table();

        let analysis = analyze(&table, &source(), &config).unwrap();

        assert_eq!(analysis.records.len(), 3 * 24);
        assert_eq!(analysis.report.record_count, 72);
        assert_eq!(analysis.report.top_stations["1호선"], vec!["서울역", "시청"]);
        assert_eq!(analysis.report.line_totals.len(), 2);
        assert_eq!(analysis.report.overall.len(), 3);
        assert_eq!(analysis.report.per_line.len(), 2);
        assert_eq!(analysis.report.overall[2].verdict, Verdict::Significant);
    }

    #[test]
    fn test_analyze_without_whitelisted_rows() {
        let config = AnalysisConfig {
            lines: vec!["10호선".into()],
            ..Default::default()
        };
        let err = analyze(&wide_table(), &source(), &config).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }
}
