//! Core domain types for crackplot
//!
//! These types form the canonical data model between ingestion and display.
//! Ingestion folds decoded status records into per-file [`FileSeries`]
//! values; display asks for a projection of those series under a pair of
//! axis modes. The two sides only meet through the types in this module.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Sample** | One decoded status record from a cracking session log |
//! | **Series** | The accumulated samples of one file, in ingest order |
//! | **Phase** | One attack within a session (wordlist + rule, mask, ...) |
//! | **Potfile phase** | A phase replaying previously recovered plaintexts |
//! | **Work units** | The producer's cumulative count of candidates tested |
//!
//! Samples carry both axis quantities at once. Switching the chart between
//! work units and elapsed time, or between recovered count and percentage,
//! is a pure re-projection and never goes back to the input files.

use serde::Serialize;
use std::path::PathBuf;

// ============================================
// Axis modes
// ============================================

/// X-axis interpretation for projected points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    /// Cumulative candidates tested (the producer calls these guesses)
    WorkUnits,
    /// Seconds since the session started
    Time,
}

impl XAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            XAxis::WorkUnits => "guesses",
            XAxis::Time => "time",
        }
    }

    /// Axis title shown on the chart
    pub fn title(&self) -> &'static str {
        match self {
            XAxis::WorkUnits => "Number of hashes tested",
            XAxis::Time => "Time (seconds)",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            XAxis::WorkUnits => XAxis::Time,
            XAxis::Time => XAxis::WorkUnits,
        }
    }
}

impl std::str::FromStr for XAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guesses" | "work-units" | "work_units" => Ok(XAxis::WorkUnits),
            "time" => Ok(XAxis::Time),
            _ => Err(format!("unknown x axis: {} (expected guesses|time)", s)),
        }
    }
}

/// Y-axis interpretation for projected points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxis {
    /// Recovered hashes as a percentage of the target set
    Percentage,
    /// Absolute recovered hash count
    Count,
}

impl YAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            YAxis::Percentage => "percentage",
            YAxis::Count => "count",
        }
    }

    /// Axis title shown on the chart
    pub fn title(&self) -> &'static str {
        match self {
            YAxis::Percentage => "Cracked passwords (%)",
            YAxis::Count => "Cracked passwords (count)",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            YAxis::Percentage => YAxis::Count,
            YAxis::Count => YAxis::Percentage,
        }
    }
}

impl std::str::FromStr for YAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" | "percent" => Ok(YAxis::Percentage),
            "count" => Ok(YAxis::Count),
            _ => Err(format!("unknown y axis: {} (expected percentage|count)", s)),
        }
    }
}

/// Display-side options; changing these never touches ingest state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub x_axis: XAxis,
    pub y_axis: YAxis,
    /// Overlay potfile phases in a contrasting color
    pub potfile_highlight: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            x_axis: XAxis::WorkUnits,
            y_axis: YAxis::Percentage,
            potfile_highlight: true,
        }
    }
}

// ============================================
// Trace colors
// ============================================

/// Fixed palette assigned to files in first-seen order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceColor {
    Blue,
    Red,
    Green,
    Orange,
    Purple,
    Brown,
    Pink,
    Gray,
}

impl TraceColor {
    pub const PALETTE: [TraceColor; 8] = [
        TraceColor::Blue,
        TraceColor::Red,
        TraceColor::Green,
        TraceColor::Orange,
        TraceColor::Purple,
        TraceColor::Brown,
        TraceColor::Pink,
        TraceColor::Gray,
    ];

    /// Color for the nth file seen; wraps when the palette runs out
    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TraceColor::Blue => "blue",
            TraceColor::Red => "red",
            TraceColor::Green => "green",
            TraceColor::Orange => "orange",
            TraceColor::Purple => "purple",
            TraceColor::Brown => "brown",
            TraceColor::Pink => "pink",
            TraceColor::Gray => "gray",
        }
    }

    /// RGB triple for terminal rendering
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            TraceColor::Blue => (31, 119, 180),
            TraceColor::Red => (214, 39, 40),
            TraceColor::Green => (44, 160, 44),
            TraceColor::Orange => (255, 127, 14),
            TraceColor::Purple => (148, 103, 189),
            TraceColor::Brown => (140, 86, 75),
            TraceColor::Pink => (227, 119, 194),
            TraceColor::Gray => (127, 127, 127),
        }
    }
}

// ============================================
// File health
// ============================================

/// Ingestion health of one tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileHealth {
    /// Polled every refresh and decoding normally
    Live,
    /// Still polled, but recent refreshes read bytes without yielding points
    Stalled,
    /// Dropped from polling after an unrecoverable error
    Failed(String),
}

impl FileHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileHealth::Live => "live",
            FileHealth::Stalled => "stalled",
            FileHealth::Failed(_) => "failed",
        }
    }
}

// ============================================
// Series
// ============================================

/// One attack phase observed in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseInfo {
    /// Short display label (basenames of wordlist and rule)
    pub label: String,
    /// True when this phase replays previously recovered plaintexts
    pub potfile: bool,
}

/// One accumulated sample in a file's series
///
/// Both axis quantities are carried so projection is a field lookup.
/// `phase` indexes into the owning [`FileSeries::phases`] table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Seconds since the session epoch, derived from sample position
    pub elapsed_secs: f64,
    /// Cumulative candidates tested across all phases so far
    pub work_units: u64,
    /// Recovered hashes at this sample
    pub recovered: u64,
    /// Total hashes under attack at this sample
    pub total: u64,
    /// Index into the phase table
    pub phase: usize,
    /// First sample of a new phase
    pub phase_start: bool,
}

impl SeriesPoint {
    /// Recovered fraction as a percentage; an empty target set reads as 0
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.recovered as f64 / self.total as f64 * 100.0
        }
    }

    /// Projected x under the given axis mode
    pub fn x(&self, mode: XAxis) -> f64 {
        match mode {
            XAxis::WorkUnits => self.work_units as f64,
            XAxis::Time => self.elapsed_secs,
        }
    }

    /// Projected y under the given axis mode
    pub fn y(&self, mode: YAxis) -> f64 {
        match mode {
            YAxis::Percentage => self.percentage(),
            YAxis::Count => self.recovered as f64,
        }
    }
}

/// Accumulated series of one input file plus ingest bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSeries {
    /// Source path the series was built from
    pub path: PathBuf,
    /// Display label (file stem; the merger disambiguates collisions)
    pub label: String,
    /// Palette color assigned when the file was first seen
    pub color: TraceColor,
    /// Samples in ingest order; x and y are monotonically non-decreasing
    pub points: Vec<SeriesPoint>,
    /// Phase table indexed by [`SeriesPoint::phase`]
    pub phases: Vec<PhaseInfo>,
    /// Session start epoch from the first decoded record
    pub session_start: Option<i64>,
    /// Bytes of the file consumed so far, including any pending fragment
    pub bytes_consumed: u64,
    /// Complete lines that failed to decode
    pub decode_errors: u64,
    /// Most recent status code reported by the producer
    pub last_status: Option<i64>,
}

// ============================================
// Projected points
// ============================================

/// A point projected for the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    /// Carried through so downsampling can protect phase transitions
    pub phase_start: bool,
    /// True when the point belongs to a potfile phase
    pub potfile: bool,
}
