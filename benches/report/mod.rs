#![allow(dead_code)]

//! Reads criterion's estimates back from `target/criterion` and plots them.

use plotters::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Deserialize)]
struct Estimates {
    mean: Stats,
}

#[derive(Deserialize)]
struct Stats {
    point_estimate: f64,
    confidence_interval: ConfidenceInterval,
}

#[derive(Deserialize)]
struct ConfidenceInterval {
    lower_bound: f64,
    upper_bound: f64,
}

/// (parameter, mean, lower, upper), times in ms.
pub type Series = Vec<(usize, f64, f64, f64)>;

pub const COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, MAGENTA, CYAN];

/// Mean and confidence interval of every `group/method/param` run found on disk.
pub fn load_series(
    group: &str,
    methods: &[&str],
    params: &[usize],
) -> Result<BTreeMap<String, Series>, Box<dyn std::error::Error>> {
    let root = Path::new("target/criterion").join(group);
    let mut data = BTreeMap::new();
    if !root.exists() {
        return Ok(data);
    }

    for &method in methods {
        let mut points = Vec::new();
        for &param in params {
            let path = root.join(method).join(param.to_string()).join("base/estimates.json");
            if !path.exists() {
                continue;
            }
            let reader = BufReader::new(File::open(&path)?);
            let estimates: Estimates = serde_json::from_reader(reader)?;
            points.push((
                param,
                estimates.mean.point_estimate / 1_000_000.0,
                estimates.mean.confidence_interval.lower_bound / 1_000_000.0,
                estimates.mean.confidence_interval.upper_bound / 1_000_000.0,
            ));
        }
        if !points.is_empty() {
            points.sort_by_key(|k| k.0);
            data.insert(method.to_string(), points);
        }
    }
    Ok(data)
}

/// `benches/results/<name>_<git hash>.png`, creating the directory if needed.
pub fn output_file(name: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let out_dir = Path::new("benches/results");
    std::fs::create_dir_all(out_dir)?;

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(out_dir.join(format!("{}_{}.png", name, git_hash)))
}

/// Confidence band, mean line and markers for every method.
pub fn draw_methods<'a, DB, X, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<X, Y>>,
    data: &BTreeMap<String, Series>,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    for (i, (method, points)) in data.iter().enumerate() {
        let color = COLORS[i % COLORS.len()];

        let band: Vec<(f64, f64)> = points
            .iter()
            .map(|&(x, _, _, u)| (x as f64, u))
            .chain(points.iter().rev().map(|&(x, _, l, _)| (x as f64, l)))
            .collect();
        chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))?;

        chart
            .draw_series(LineSeries::new(points.iter().map(|&(x, y, _, _)| (x as f64, y)), &color))?
            .label(method.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

        chart.draw_series(PointSeries::of_element(
            points.iter().map(|&(x, y, _, _)| (x as f64, y)),
            5,
            &color,
            &|c, s, st| EmptyElement::at(c) + Circle::new((0, 0), s, st.filled()),
        ))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}
