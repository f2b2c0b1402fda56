//! Ingestion layer for tailing status files
//!
//! This module turns growing `--status-json` files into per-file series
//! that the dataset layer can project for rendering.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────┐     ┌───────────────┐
//! │ Status files │ ──► │ TailCoordinator │ ──► │ MergedDataset │
//! │  (*.json)    │     │                 │     │  (chart data) │
//! └──────────────┘     └─────────────────┘     └───────────────┘
//!                              │
//!                              ▼
//!                      ┌───────────────┐
//!                      │ SeriesBuilder │  one per file
//!                      │  └─ decode    │
//!                      └───────────────┘
//! ```
//!
//! The coordinator polls each tracked file on demand: stat, compare
//! against the consumed offset, read whatever was appended, and hand the
//! bytes to that file's [`SeriesBuilder`]. Files never rewind. A file
//! whose length drops below the consumed offset was truncated or replaced
//! under us; its accumulated series would be a lie, so the file is marked
//! failed and left out of future polls while the others carry on.
//!
//! Everything here runs on the caller's thread. One refresh pass is
//! strictly sequential over the files, so series updates never race the
//! dataset reads between them.

pub mod decode;
mod series;

pub use series::{IngestStats, SeriesBuilder};

use crate::config::Config;
use crate::dataset::{self, MergedDataset};
use crate::error::{Error, Result};
use crate::types::{DisplayOptions, FileHealth, FileSeries, TraceColor};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Consecutive refreshes that read bytes, grew the decode-error count, and
/// produced no points before a file is reported stalled.
const STALL_TICKS: u32 = 10;

/// Result of one refresh pass across all tracked files.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    /// Files that had appended bytes to read
    pub files_polled: usize,
    /// Files skipped (no new content, or already failed)
    pub files_skipped: usize,
    /// Points appended across all series
    pub points_added: usize,
    /// Lines that failed to decode across all files
    pub decode_errors: usize,
    /// Warnings raised this pass (stall transitions)
    pub warnings: Vec<String>,
    /// Files that failed this pass (file path → error message)
    pub errors: Vec<(PathBuf, String)>,
}

/// One tracked file: its builder plus refresh health.
struct TrackedFile {
    builder: SeriesBuilder,
    health: FileHealth,
    /// Consecutive unproductive refreshes (bytes read, errors grew, no
    /// points)
    stall_ticks: u32,
}

impl TrackedFile {
    /// Read appended bytes and fold them into the series. `None` means the
    /// file had nothing new.
    fn poll(&mut self) -> Result<Option<IngestStats>> {
        let path = self.builder.series().path.clone();
        let consumed = self.builder.bytes_consumed();

        let mut file = File::open(&path)?;
        let len = file.metadata()?.len();

        if len < consumed {
            return Err(Error::Truncated {
                path: path.display().to_string(),
                consumed,
                len,
            });
        }
        if len == consumed {
            return Ok(None);
        }

        file.seek(SeekFrom::Start(consumed))?;
        let mut appended = Vec::with_capacity((len - consumed) as usize);
        // Bounded read: bytes appended after the stat belong to the next
        // refresh.
        file.take(len - consumed).read_to_end(&mut appended)?;

        Ok(Some(self.builder.ingest(&appended)))
    }
}

/// Coordinates offset-based tailing across the input files.
///
/// The file set is fixed at construction; discovery happens once at
/// startup via [`discover_inputs`]. Each file gets a palette color in
/// first-seen order and keeps it for the whole session.
pub struct TailCoordinator {
    files: Vec<TrackedFile>,
    max_points: usize,
}

impl TailCoordinator {
    /// Start tracking the given files.
    ///
    /// Files that cannot be opened are logged and dropped so one bad path
    /// does not take down a multi-file session. With zero readable files
    /// there is nothing to chart and this fails with [`Error::NoInput`].
    pub fn open(paths: &[PathBuf], config: &Config) -> Result<Self> {
        let mut files: Vec<TrackedFile> = Vec::new();

        for path in paths {
            match File::open(path) {
                Ok(_) => {
                    files.push(TrackedFile {
                        builder: SeriesBuilder::new(
                            path.clone(),
                            TraceColor::for_index(files.len()),
                            config.refresh.status_timer_secs,
                        ),
                        health: FileHealth::Live,
                        stall_ticks: 0,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Input file is not readable, skipping"
                    );
                }
            }
        }

        if files.is_empty() {
            return Err(Error::NoInput);
        }

        tracing::info!(count = files.len(), "Tracking input files");
        Ok(Self {
            files,
            max_points: config.chart.max_points,
        })
    }

    /// Poll every live file once and fold appended bytes into its series.
    pub fn refresh(&mut self) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();

        for tracked in &mut self.files {
            if matches!(tracked.health, FileHealth::Failed(_)) {
                outcome.files_skipped += 1;
                continue;
            }

            match tracked.poll() {
                Ok(Some(stats)) => {
                    outcome.files_polled += 1;
                    outcome.points_added += stats.points;
                    outcome.decode_errors += stats.decode_errors;
                    Self::track_stall(tracked, &stats, &mut outcome);
                }
                Ok(None) => {
                    outcome.files_skipped += 1;
                }
                Err(e) => {
                    let path = tracked.builder.series().path.clone();
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "File failed, no longer polled"
                    );
                    tracked.health = FileHealth::Failed(e.to_string());
                    outcome.errors.push((path, e.to_string()));
                }
            }
        }

        tracing::debug!(
            polled = outcome.files_polled,
            skipped = outcome.files_skipped,
            points = outcome.points_added,
            decode_errors = outcome.decode_errors,
            "Refresh pass complete"
        );
        outcome
    }

    /// Update stall bookkeeping for one polled file.
    fn track_stall(tracked: &mut TrackedFile, stats: &IngestStats, outcome: &mut RefreshOutcome) {
        if stats.points > 0 {
            tracked.stall_ticks = 0;
            if tracked.health == FileHealth::Stalled {
                tracked.health = FileHealth::Live;
                tracing::info!(
                    path = %tracked.builder.series().path.display(),
                    "File recovered from stall"
                );
            }
        } else if stats.decode_errors > 0 {
            tracked.stall_ticks += 1;
            if tracked.stall_ticks == STALL_TICKS && tracked.health == FileHealth::Live {
                tracked.health = FileHealth::Stalled;
                let message = format!(
                    "{}: {} consecutive refreshes decoded nothing, is this a status file?",
                    tracked.builder.series().path.display(),
                    tracked.stall_ticks
                );
                tracing::warn!(
                    path = %tracked.builder.series().path.display(),
                    ticks = tracked.stall_ticks,
                    "File looks stalled"
                );
                outcome.warnings.push(message);
            }
        }
    }

    /// Build the render-ready dataset under the given display options.
    ///
    /// Pure read over ingest state; safe to call between refreshes when
    /// the operator toggles an axis.
    pub fn dataset(&self, options: &DisplayOptions) -> MergedDataset {
        let inputs: Vec<(&FileSeries, FileHealth)> = self
            .files
            .iter()
            .map(|tracked| (tracked.builder.series(), tracked.health.clone()))
            .collect();
        dataset::merge(&inputs, options, self.max_points)
    }

    /// Per-file series and health, in first-seen order.
    pub fn series(&self) -> impl Iterator<Item = (&FileSeries, &FileHealth)> {
        self.files
            .iter()
            .map(|tracked| (tracked.builder.series(), &tracked.health))
    }

    /// Number of tracked files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Expand explicit paths and glob patterns into a concrete input list.
///
/// Runs once at startup; the tracked set never changes afterwards.
/// Patterns that match nothing are logged, not fatal, so a rig that has
/// not started writing yet does not abort a multi-pattern invocation.
pub fn discover_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let literal = Path::new(pattern);
        if literal.exists() {
            paths.push(literal.to_path_buf());
            continue;
        }

        let mut matched = false;
        for entry in glob::glob(pattern)?.flatten() {
            matched = true;
            paths.push(entry);
        }
        if !matched {
            tracing::warn!(pattern = %pattern, "Input pattern matched no files");
        }
    }

    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));
    Ok(paths)
}
