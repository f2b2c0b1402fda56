//! Merged chart dataset
//!
//! Combines the per-file series into one render-ready value. Merging is a
//! pure read over ingest state: it projects samples under the current axis
//! modes, disambiguates display labels, computes shared axis bounds, and
//! downsamples each trace to the configured budget. Nothing here writes
//! back, so the display side can rebuild the dataset as often as it likes
//! (axis toggles between refreshes included) without disturbing tailing.

use crate::downsample::downsample;
use crate::types::{DisplayOptions, FileHealth, FileSeries, PlotPoint, TraceColor, XAxis, YAxis};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

/// One trace of the merged dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedSeries {
    /// Display label, unique within the dataset
    pub label: String,
    pub color: TraceColor,
    pub health: FileHealth,
    /// Projected points after downsampling
    pub points: Vec<PlotPoint>,
    /// Series length before downsampling
    pub raw_len: usize,
}

/// Render-ready dataset across all tracked files.
///
/// Rebuilt from scratch on every request; axis bounds cover the full data
/// before downsampling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedDataset {
    pub x_axis: XAxis,
    pub y_axis: YAxis,
    /// One trace per tracked file, in first-seen order
    pub series: Vec<MergedSeries>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Merge per-file series into a dataset under the given display options.
pub fn merge(
    inputs: &[(&FileSeries, FileHealth)],
    options: &DisplayOptions,
    max_points: usize,
) -> MergedDataset {
    let mut label_counts: HashMap<&str, usize> = HashMap::new();
    for (series, _) in inputs {
        *label_counts.entry(series.label.as_str()).or_insert(0) += 1;
    }

    let mut x_max = 0.0_f64;
    let mut y_max = 0.0_f64;
    let mut merged = Vec::with_capacity(inputs.len());

    for (series, health) in inputs {
        let label = if label_counts[series.label.as_str()] > 1 {
            format!("{} ({})", series.label, path_suffix(&series.path))
        } else {
            series.label.clone()
        };

        let projected: Vec<PlotPoint> = series
            .points
            .iter()
            .map(|point| PlotPoint {
                x: point.x(options.x_axis),
                y: point.y(options.y_axis),
                phase_start: point.phase_start,
                potfile: series
                    .phases
                    .get(point.phase)
                    .map(|phase| phase.potfile)
                    .unwrap_or(false),
            })
            .collect();

        for point in &projected {
            x_max = x_max.max(point.x);
            y_max = y_max.max(point.y);
        }

        let raw_len = projected.len();
        merged.push(MergedSeries {
            label,
            color: series.color,
            health: health.clone(),
            points: downsample(&projected, max_points),
            raw_len,
        });
    }

    MergedDataset {
        x_axis: options.x_axis,
        y_axis: options.y_axis,
        series: merged,
        x_bounds: [0.0, if x_max > 0.0 { x_max } else { 1.0 }],
        y_bounds: [0.0, if y_max > 0.0 { y_max } else { 1.0 }],
    }
}

/// Deterministic short suffix for label collisions, derived from the path.
fn path_suffix(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..4])
}
