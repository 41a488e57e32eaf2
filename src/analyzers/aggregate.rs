use std::collections::{BTreeMap, HashMap};

use crate::analyzers::distribution::student_t_quantile;
use crate::analyzers::types::{ConfidenceInterval, GroupStats, LineStationSummary};
use crate::analyzers::utility::{mean, stddev};
use crate::config::IntervalMethod;
use crate::records::{Hour, Metric, TidyRecord};

/// Grouping key for [`group_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Line,
    Hour,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Line(String),
    Hour(Hour),
}

impl GroupKey {
    fn label(&self) -> String {
        match self {
            GroupKey::Line(line) => line.clone(),
            GroupKey::Hour(hour) => hour.label().to_string(),
        }
    }
}

/// Sums boarding, alighting and total per (line, station), in order of first appearance.
pub fn station_summaries(records: &[TidyRecord]) -> Vec<LineStationSummary> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut summaries: Vec<LineStationSummary> = Vec::new();

    for r in records {
        let idx = *index
            .entry((r.line.as_str(), r.station.as_str()))
            .or_insert_with(|| {
                summaries.push(LineStationSummary {
                    line: r.line.clone(),
                    station: r.station.clone(),
                    boarding: 0.0,
                    alighting: 0.0,
                    total: 0.0,
                });
                summaries.len() - 1
            });

        let s = &mut summaries[idx];
        s.boarding += r.boarding;
        s.alighting += r.alighting;
        s.total += r.total;
    }

    summaries
}

/// Top `k` station names per line by total traffic, busiest first.
///
/// The sort is stable, so stations with equal totals keep their input order.
pub fn top_stations(records: &[TidyRecord], k: usize) -> BTreeMap<String, Vec<String>> {
    let mut by_line: BTreeMap<String, Vec<LineStationSummary>> = BTreeMap::new();
    for s in station_summaries(records) {
        by_line.entry(s.line.clone()).or_default().push(s);
    }

    by_line
        .into_iter()
        .map(|(line, mut stations)| {
            stations.sort_by(|a, b| b.total.total_cmp(&a.total));
            let names = stations.into_iter().take(k).map(|s| s.station).collect();
            (line, names)
        })
        .collect()
}

/// Mean, sample standard deviation, count and confidence interval of the
/// mean of `metric` per group. Lines come out in lexical order, hours
/// chronologically. Records where the metric is undefined are skipped.
pub fn group_stats(
    records: &[TidyRecord],
    group_by: GroupBy,
    metric: Metric,
    alpha: f64,
    interval: IntervalMethod,
) -> Vec<GroupStats> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for r in records {
        let Some(value) = r.metric(metric) else {
            continue;
        };
        let key = match group_by {
            GroupBy::Line => GroupKey::Line(r.line.clone()),
            GroupBy::Hour => GroupKey::Hour(r.hour),
        };
        groups.entry(key).or_default().push(value);
    }

    groups
        .into_iter()
        .map(|(key, values)| summarize(key.label(), &values, alpha, interval))
        .collect()
}

fn summarize(key: String, values: &[f64], alpha: f64, interval: IntervalMethod) -> GroupStats {
    let m = mean(values);
    let sd = m.and_then(|m| stddev(values, m));

    let confidence_interval = match (m, sd) {
        (Some(m), Some(sd)) => {
            let n = values.len() as f64;
            let critical = match interval {
                IntervalMethod::Welch => student_t_quantile(1.0 - alpha / 2.0, n - 1.0),
                IntervalMethod::Fixed { z } => z,
            };
            Some(ConfidenceInterval::around(m, critical * sd / n.sqrt()))
        }
        _ => None,
    };

    GroupStats {
        key,
        count: values.len(),
        mean: m,
        std_dev: sd,
        confidence_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(line: &str, station: &str, hour: u8, on: f64, off: f64) -> TidyRecord {
        TidyRecord::new(line, station, Hour::new(hour).unwrap(), on, off)
    }

    #[test]
    fn test_station_summaries_sum_per_station() {
        let records = vec![
            rec("1호선", "A", 7, 10.0, 5.0),
            rec("1호선", "B", 7, 1.0, 1.0),
            rec("1호선", "A", 8, 20.0, 5.0),
        ];
        let summaries = station_summaries(&records);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].station, "A");
        assert_eq!(summaries[0].boarding, 30.0);
        assert_eq!(summaries[0].alighting, 10.0);
        assert_eq!(summaries[0].total, 40.0);
    }

    #[test]
    fn test_top_stations_ranks_and_truncates() {
        let records = vec![
            rec("2호선", "low", 8, 1.0, 0.0),
            rec("2호선", "high", 8, 100.0, 0.0),
            rec("2호선", "mid", 8, 50.0, 0.0),
            rec("1호선", "only", 8, 5.0, 5.0),
        ];
        let top = top_stations(&records, 2);

        assert_eq!(top["2호선"], vec!["high", "mid"]);
        assert_eq!(top["1호선"], vec!["only"]);
    }

    #[test]
    fn test_top_stations_ties_keep_input_order() {
        let records = vec![
            rec("3호선", "first", 8, 10.0, 0.0),
            rec("3호선", "second", 8, 10.0, 0.0),
            rec("3호선", "third", 8, 10.0, 0.0),
        ];
        let top = top_stations(&records, 10);
        assert_eq!(top["3호선"], vec!["first", "second", "third"]);
    }

    #[test]
    fn test_group_by_hour_is_chronological() {
        let records = vec![
            rec("1호선", "A", 10, 1.0, 1.0),
            rec("1호선", "A", 2, 1.0, 1.0),
            rec("1호선", "B", 10, 3.0, 3.0),
        ];
        let stats = group_stats(&records, GroupBy::Hour, Metric::Total, 0.05, IntervalMethod::Welch);

        let keys: Vec<_> = stats.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["2시", "10시"]);
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].mean, Some(4.0));
    }

    #[test]
    fn test_group_stats_single_value_has_no_interval() {
        let records = vec![rec("1호선", "A", 7, 4.0, 2.0)];
        let stats = group_stats(&records, GroupBy::Line, Metric::Total, 0.05, IntervalMethod::Welch);

        assert_eq!(stats[0].mean, Some(6.0));
        assert_eq!(stats[0].std_dev, None);
        assert_eq!(stats[0].confidence_interval, None);
    }

    #[test]
    fn test_group_stats_fixed_multiplier() {
        let records = vec![
            rec("1호선", "A", 7, 2.0, 0.0),
            rec("1호선", "B", 7, 4.0, 0.0),
        ];
        let stats = group_stats(
            &records,
            GroupBy::Line,
            Metric::Boarding,
            0.05,
            IntervalMethod::Fixed { z: 2.0 },
        );
        // sd = sqrt(2), se = 1, half-width = 2.
        let ci = stats[0].confidence_interval.unwrap();
        assert!((ci.lower - 1.0).abs() < 1e-12);
        assert!((ci.upper - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_skips_records_without_alighting() {
        let records = vec![rec("1호선", "A", 5, 4.0, 0.0), rec("1호선", "B", 5, 4.0, 2.0)];
        let stats = group_stats(
            &records,
            GroupBy::Hour,
            Metric::BoardingRatio,
            0.05,
            IntervalMethod::Welch,
        );
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].mean, Some(2.0));
    }
}
