//! Per-line charts for the busiest stations.
//!
//! Each line gets a time-series chart and a heatmap, both with boarding on
//! top and alighting below. The hour axis always follows [`Hour::ALL`].

use anyhow::Result;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::records::{Hour, Metric, TidyRecord};

const CHART_SIZE: (u32, u32) = (1500, 1000);
const HEATMAP_SIZE: (u32, u32) = (1500, 1200);

/// One row per station, 24 chronological hourly values each. Hours with no
/// record are 0.
pub fn hourly_matrix(
    records: &[TidyRecord],
    line: &str,
    stations: &[String],
    metric: Metric,
) -> Vec<[f64; 24]> {
    stations
        .iter()
        .map(|station| {
            let mut row = [0.0; 24];
            for r in records
                .iter()
                .filter(|r| r.line == line && &r.station == station)
            {
                row[r.hour.value() as usize] = r.metric(metric).unwrap_or(0.0);
            }
            row
        })
        .collect()
}

pub fn time_series_path(dir: &Path, line: &str) -> PathBuf {
    dir.join(format!("subway_time_stats_{line}.svg"))
}

pub fn heatmap_path(dir: &Path, line: &str) -> PathBuf {
    dir.join(format!("subway_time_heatmap_{line}.svg"))
}

/// Renders both charts for every line that has records and top stations.
/// Returns the written paths.
pub fn render_all(
    records: &[TidyRecord],
    top_stations: &BTreeMap<String, Vec<String>>,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for (line, stations) in top_stations {
        if stations.is_empty() || !records.iter().any(|r| &r.line == line) {
            debug!(line = %line, "No data for line, skipping charts");
            continue;
        }

        let series = time_series_path(dir, line);
        render_time_series(records, line, stations, &series)?;
        written.push(series);

        let heatmap = heatmap_path(dir, line);
        render_heatmap(records, line, stations, &heatmap)?;
        written.push(heatmap);

        info!(line = %line, stations = stations.len(), "Charts written");
    }

    Ok(written)
}

fn hour_label(x: &u32) -> String {
    Hour::new(*x as u8)
        .map(|h| h.label().to_string())
        .unwrap_or_default()
}

fn max_value(rows: &[[f64; 24]]) -> f64 {
    rows.iter()
        .flat_map(|r| r.iter().copied())
        .fold(0.0, f64::max)
        .max(1.0)
}

pub fn render_time_series(
    records: &[TidyRecord],
    line: &str,
    stations: &[String],
    path: &Path,
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(CHART_SIZE.1 / 2);

    for (area, metric, title) in [
        (&upper, Metric::Boarding, "승차 인원"),
        (&lower, Metric::Alighting, "하차 인원"),
    ] {
        let rows = hourly_matrix(records, line, stations, metric);
        let y_max = max_value(&rows) * 1.05;

        let mut chart = ChartBuilder::on(area)
            .caption(
                format!("{line} 상위 {}개 역의 시간대별 {title}", stations.len()),
                ("sans-serif", 22),
            )
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .right_y_label_area_size(10)
            .build_cartesian_2d(0u32..23u32, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_labels(24)
            .x_label_formatter(&hour_label)
            .x_desc("시간")
            .y_desc(title)
            .draw()?;

        for (i, (station, row)) in stations.iter().zip(&rows).enumerate() {
            let style = Palette99::pick(i).stroke_width(2);
            chart
                .draw_series(LineSeries::new(
                    Hour::ALL.iter().map(|h| (h.value() as u32, row[h.value() as usize])),
                    style,
                ))?
                .label(station.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Yellow → orange → red ramp over `t` in [0, 1].
fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    if t < 0.5 {
        let t = t * 2.0;
        RGBColor(lerp(255, 253, t), lerp(255, 141, t), lerp(204, 60, t))
    } else {
        let t = (t - 0.5) * 2.0;
        RGBColor(lerp(253, 189, t), lerp(141, 0, t), lerp(60, 38, t))
    }
}

pub fn render_heatmap(
    records: &[TidyRecord],
    line: &str,
    stations: &[String],
    path: &Path,
) -> Result<()> {
    let root = SVGBackend::new(path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(HEATMAP_SIZE.1 / 2);
    let n = stations.len() as u32;

    let station_label = |y: &u32| {
        stations
            .get(*y as usize)
            .cloned()
            .unwrap_or_default()
    };

    for (area, metric, title) in [
        (&upper, Metric::Boarding, "승차 인원"),
        (&lower, Metric::Alighting, "하차 인원"),
    ] {
        let rows = hourly_matrix(records, line, stations, metric);
        let max = max_value(&rows);

        let mut chart = ChartBuilder::on(area)
            .caption(
                format!("{line} 상위 {n}개 역의 시간대별 {title} 히트맵"),
                ("sans-serif", 22),
            )
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(120)
            .build_cartesian_2d(0u32..24u32, 0u32..n)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(24)
            .y_labels(n as usize)
            .x_label_formatter(&hour_label)
            .y_label_formatter(&station_label)
            .x_desc("시간")
            .y_desc("역명")
            .draw()?;

        chart.draw_series(rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, v)| {
                let (x, y) = (x as u32, y as u32);
                Rectangle::new([(x, y), (x + 1, y + 1)], heat_color(v / max).filled())
            })
        }))?;
    }

    root.present()?;
    Ok(())
}
