//! Application state for the crackplot TUI.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crackplot_core::ingest::decode;
use crackplot_core::{
    Config, DisplayOptions, FileHealth, MergedDataset, RefreshOutcome, TailCoordinator, TraceColor,
};
use crossterm::event::{KeyCode, KeyEvent};

/// Bounds for the operator-adjustable refresh interval, in seconds.
const MIN_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 300;

/// Step for the +/- interval keys, in seconds.
const INTERVAL_STEP_SECS: i64 = 5;

/// One row of the per-file summary table.
pub struct FileRow {
    /// Display label, matching the chart legend
    pub label: String,
    pub color: TraceColor,
    pub health: FileHealth,
    /// Points drawn after downsampling
    pub sampled: usize,
    /// Points accumulated in the series
    pub raw: usize,
    pub recovered: u64,
    pub total: u64,
    pub percentage: f64,
    /// Label of the attack phase the file is currently in
    pub phase: String,
    /// Producer status name from the most recent record
    pub status: String,
    pub decode_errors: u64,
}

/// Top-level application state.
pub struct App {
    /// Tailing coordinator over the input files
    coordinator: TailCoordinator,
    /// Current display options
    pub options: DisplayOptions,
    /// Render-ready dataset for the current options
    pub dataset: MergedDataset,
    /// Per-file summary rows, in chart order
    pub file_rows: Vec<FileRow>,
    /// Seconds between refresh passes
    pub interval: Duration,
    /// Monotonic anchor of the last refresh
    last_refresh: Option<Instant>,
    /// Wall-clock time of the last refresh, for the header
    pub last_refresh_at: Option<DateTime<Local>>,
    /// Outcome of the last refresh pass
    pub last_outcome: Option<RefreshOutcome>,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl App {
    pub fn new(coordinator: TailCoordinator, options: DisplayOptions, config: &Config) -> Self {
        let dataset = coordinator.dataset(&options);
        let mut app = Self {
            coordinator,
            options,
            dataset,
            file_rows: Vec::new(),
            interval: Duration::from_secs(config.refresh.interval_secs),
            last_refresh: None,
            last_refresh_at: None,
            last_outcome: None,
            should_quit: false,
        };
        app.rebuild();
        app
    }

    /// Refresh if the interval has elapsed. The anchor is reset to "now"
    /// after the pass, so ticks missed while a pass was running coalesce
    /// into the next one instead of queueing.
    pub fn maybe_refresh(&mut self) {
        let due = self
            .last_refresh
            .map_or(true, |at| at.elapsed() >= self.interval);
        if due {
            self.refresh();
        }
    }

    /// Poll all files and rebuild the dataset.
    pub fn refresh(&mut self) {
        let outcome = self.coordinator.refresh();
        self.last_refresh = Some(Instant::now());
        self.last_refresh_at = Some(Local::now());
        self.last_outcome = Some(outcome);
        self.rebuild();
    }

    /// Re-project the dataset and summary rows under the current options.
    /// Never goes back to the input files.
    fn rebuild(&mut self) {
        self.dataset = self.coordinator.dataset(&self.options);
        self.file_rows = self
            .dataset
            .series
            .iter()
            .zip(self.coordinator.series())
            .map(|(merged, (series, health))| {
                let latest = series.points.last();
                FileRow {
                    label: merged.label.clone(),
                    color: series.color,
                    health: health.clone(),
                    sampled: merged.points.len(),
                    raw: merged.raw_len,
                    recovered: latest.map(|p| p.recovered).unwrap_or(0),
                    total: latest.map(|p| p.total).unwrap_or(0),
                    percentage: latest.map(|p| p.percentage()).unwrap_or(0.0),
                    phase: series
                        .phases
                        .last()
                        .map(|phase| phase.label.clone())
                        .unwrap_or_else(|| "-".to_string()),
                    status: series
                        .last_status
                        .map(|code| decode::status_name(code).to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    decode_errors: series.decode_errors,
                }
            })
            .collect();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('x') => {
                self.options.x_axis = self.options.x_axis.toggle();
                self.rebuild();
            }
            KeyCode::Char('y') => {
                self.options.y_axis = self.options.y_axis.toggle();
                self.rebuild();
            }
            KeyCode::Char('p') => {
                self.options.potfile_highlight = !self.options.potfile_highlight;
                self.rebuild();
            }
            KeyCode::Char('r') => {
                self.refresh();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.adjust_interval(INTERVAL_STEP_SECS);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                self.adjust_interval(-INTERVAL_STEP_SECS);
            }
            _ => {}
        }
    }

    fn adjust_interval(&mut self, delta_secs: i64) {
        let secs = (self.interval.as_secs() as i64 + delta_secs)
            .clamp(MIN_INTERVAL_SECS as i64, MAX_INTERVAL_SECS as i64);
        self.interval = Duration::from_secs(secs as u64);
        tracing::debug!(interval_secs = secs, "Refresh interval adjusted");
    }

    /// Number of tracked files.
    pub fn file_count(&self) -> usize {
        self.coordinator.file_count()
    }
}
