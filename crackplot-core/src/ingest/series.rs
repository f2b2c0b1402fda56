//! Incremental series builder
//!
//! Folds raw bytes from one status file into a [`FileSeries`]. Input
//! arrives in arbitrary chunks: whatever the tail read returned, cut
//! wherever the read happened to stop. The builder owns the line
//! discipline so callers never worry about chunk boundaries:
//!
//! - Only `\n`-terminated lines are decoded. An unterminated tail fragment
//!   is held back and completed by the next chunk, so a record the
//!   producer was still writing mid-read yields exactly one sample once
//!   its terminator arrives.
//!
//! - Decode failures are counted and skipped; one bad line never poisons
//!   the series.
//!
//! - The series is kept monotonic. A decoded sample that would move the
//!   curve backward on either axis (producer clock skew, replayed lines)
//!   is discarded rather than corrupting the plot.
//!
//! Feeding the same bytes in different chunkings produces byte-identical
//! series, which is what makes refresh timing invisible in the output.

use crate::ingest::decode::{self, DecodeFailure};
use crate::types::{FileSeries, PhaseInfo, SeriesPoint, TraceColor};
use std::path::PathBuf;

/// Counters for one ingest call.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    /// Complete lines examined
    pub lines: usize,
    /// Points appended to the series
    pub points: usize,
    /// Lines that failed to decode
    pub decode_errors: usize,
    /// Decoded samples discarded to keep the series monotonic
    pub clamped: usize,
}

/// Identity of an attack phase; a new run of the same attack is a new phase.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PhaseKey {
    time_start: i64,
    base: String,
    modifier: Option<String>,
}

/// Builds one file's series incrementally from appended bytes.
pub struct SeriesBuilder {
    series: FileSeries,
    /// Unterminated tail bytes held back for the next chunk
    pending: Vec<u8>,
    /// Session-start stamp of the run the tail of the file belongs to
    run_epoch: Option<i64>,
    /// 1-based sample position within the current run
    run_ticks: u64,
    /// Cumulative work units; the producer's counter restarts per phase
    work_units: u64,
    /// Identity of the phase currently being appended to
    phase_key: Option<PhaseKey>,
    /// A phase boundary whose first sample was discarded; the marker moves
    /// to the next appended point
    pending_phase_start: bool,
    /// Seconds between producer samples
    status_timer: f64,
}

impl SeriesBuilder {
    /// Create a builder for one input file. The color is fixed here and
    /// never reassigned, so a trace keeps its color for the whole session.
    pub fn new(path: PathBuf, color: TraceColor, status_timer_secs: u64) -> Self {
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            series: FileSeries {
                path,
                label,
                color,
                points: Vec::new(),
                phases: Vec::new(),
                session_start: None,
                bytes_consumed: 0,
                decode_errors: 0,
                last_status: None,
            },
            pending: Vec::new(),
            run_epoch: None,
            run_ticks: 0,
            work_units: 0,
            phase_key: None,
            pending_phase_start: false,
            status_timer: status_timer_secs as f64,
        }
    }

    /// The accumulated series.
    pub fn series(&self) -> &FileSeries {
        &self.series
    }

    /// Bytes accepted so far, including any held-back fragment. This is
    /// the offset the next read should start from.
    pub fn bytes_consumed(&self) -> u64 {
        self.series.bytes_consumed
    }

    /// True when a partial line is waiting for its terminator.
    pub fn has_pending_fragment(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Fold a chunk of appended bytes into the series.
    pub fn ingest(&mut self, bytes: &[u8]) -> IngestStats {
        let mut stats = IngestStats::default();
        self.series.bytes_consumed += bytes.len() as u64;

        let joined: Vec<u8>;
        let input: &[u8] = if self.pending.is_empty() {
            bytes
        } else {
            let mut buf = std::mem::take(&mut self.pending);
            buf.extend_from_slice(bytes);
            joined = buf;
            &joined
        };

        let mut rest = input;
        while let Some(newline) = rest.iter().position(|&b| b == b'\n') {
            let (line, tail) = rest.split_at(newline);
            rest = &tail[1..];
            stats.lines += 1;
            self.consume_line(line, &mut stats);
        }
        self.pending = rest.to_vec();

        stats
    }

    fn consume_line(&mut self, line: &[u8], stats: &mut IngestStats) {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(_) => {
                self.series.decode_errors += 1;
                stats.decode_errors += 1;
                return;
            }
        };

        match decode::decode_line(text) {
            Ok(record) => self.apply(record, stats),
            Err(DecodeFailure::Empty) => {}
            Err(failure) => {
                self.series.decode_errors += 1;
                stats.decode_errors += 1;
                tracing::debug!(
                    path = %self.series.path.display(),
                    failure = failure.as_str(),
                    "Skipped undecodable line"
                );
            }
        }
    }

    fn apply(&mut self, record: decode::StatusRecord, stats: &mut IngestStats) {
        let epoch = *self.series.session_start.get_or_insert(record.time_start);

        // The producer restarts its counters for each run; run position
        // restarts when the session-start stamp changes.
        if self.run_epoch != Some(record.time_start) {
            self.run_epoch = Some(record.time_start);
            self.run_ticks = 0;
        }
        self.run_ticks += 1;
        self.work_units = self.work_units.saturating_add(record.progress);

        // Records carry no clock of their own, so elapsed time is derived:
        // run offset from the epoch plus sample position times the sample
        // interval.
        let elapsed_secs =
            (record.time_start - epoch) as f64 + self.run_ticks as f64 * self.status_timer;

        let (base, modifier, potfile, label) = match &record.phase {
            Some(phase) => (
                phase.base.clone(),
                phase.modifier.clone(),
                phase.is_potfile(),
                phase.label(),
            ),
            None => ("unknown".to_string(), None, false, "unknown".to_string()),
        };
        let key = PhaseKey {
            time_start: record.time_start,
            base,
            modifier,
        };
        let mut phase_start = self.phase_key.as_ref() != Some(&key);
        if phase_start {
            self.series.phases.push(PhaseInfo { label, potfile });
            self.phase_key = Some(key);
            tracing::debug!(
                path = %self.series.path.display(),
                phase = self.series.phases.len(),
                "New attack phase"
            );
        }
        phase_start = phase_start || self.pending_phase_start;
        let phase = self.series.phases.len() - 1;

        let candidate = SeriesPoint {
            elapsed_secs,
            work_units: self.work_units,
            recovered: record.recovered,
            total: record.total,
            phase,
            phase_start,
        };

        if let Some(last) = self.series.points.last() {
            let regresses = candidate.elapsed_secs < last.elapsed_secs
                || candidate.work_units < last.work_units
                || candidate.recovered < last.recovered
                || candidate.percentage() < last.percentage();
            if regresses {
                stats.clamped += 1;
                self.pending_phase_start = phase_start;
                tracing::debug!(
                    path = %self.series.path.display(),
                    "Discarded sample that would move the curve backward"
                );
                return;
            }
        }

        self.pending_phase_start = false;
        self.series.points.push(candidate);
        self.series.last_status = Some(record.status);
        stats.points += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{XAxis, YAxis};

    fn line(progress: u64, recovered: u64, total: u64, time_start: i64, base: &str) -> String {
        format!(
            r#"{{"status": 3, "progress": [{progress}, 14344384], "recovered_hashes": [{recovered}, {total}], "time_start": {time_start}, "guess": {{"guess_base": "{base}", "guess_mod": null}}}}"#
        ) + "\n"
    }

    fn builder() -> SeriesBuilder {
        SeriesBuilder::new(PathBuf::from("/logs/session.json"), TraceColor::Blue, 1)
    }

    #[test]
    fn test_two_samples_accumulate() {
        let mut b = builder();
        let mut bytes = line(100, 10, 100, 1000, "wl/rockyou.txt");
        bytes.push_str(&line(150, 30, 100, 1000, "wl/rockyou.txt"));

        let stats = b.ingest(bytes.as_bytes());
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.points, 2);
        assert_eq!(stats.decode_errors, 0);

        let points = &b.series().points;
        assert_eq!(points.len(), 2);

        assert_eq!(points[0].elapsed_secs, 1.0);
        assert_eq!(points[0].work_units, 100);
        assert_eq!(points[0].y(YAxis::Count), 10.0);
        assert_eq!(points[0].y(YAxis::Percentage), 10.0);
        assert!(points[0].phase_start);

        assert_eq!(points[1].elapsed_secs, 2.0);
        assert_eq!(points[1].work_units, 250);
        assert_eq!(points[1].y(YAxis::Count), 30.0);
        assert_eq!(points[1].y(YAxis::Percentage), 30.0);
        assert!(!points[1].phase_start);

        assert_eq!(b.series().session_start, Some(1000));
        assert_eq!(b.series().last_status, Some(3));
    }

    #[test]
    fn test_chunking_is_invisible() {
        let mut bytes = String::new();
        for i in 0..20u64 {
            bytes.push_str(&line(100 + i, i, 100, 1000, "wl/rockyou.txt"));
        }

        let mut whole = builder();
        whole.ingest(bytes.as_bytes());

        let mut trickle = builder();
        for byte in bytes.as_bytes() {
            trickle.ingest(std::slice::from_ref(byte));
        }

        assert_eq!(whole.series(), trickle.series());
        assert_eq!(whole.bytes_consumed(), bytes.len() as u64);
    }

    #[test]
    fn test_fragment_held_until_terminated() {
        let complete = line(100, 10, 100, 1000, "wl/rockyou.txt");
        let second = line(200, 20, 100, 1000, "wl/rockyou.txt");
        let (head, tail) = second.split_at(30);

        let mut b = builder();
        let stats = b.ingest(format!("{complete}{head}").as_bytes());
        assert_eq!(stats.points, 1);
        assert_eq!(stats.decode_errors, 0);
        assert!(b.has_pending_fragment());
        assert_eq!(b.bytes_consumed(), (complete.len() + head.len()) as u64);

        // Completing the fragment yields exactly one more sample.
        let stats = b.ingest(tail.as_bytes());
        assert_eq!(stats.points, 1);
        assert!(!b.has_pending_fragment());
        assert_eq!(b.series().points.len(), 2);
        assert_eq!(b.series().points[1].work_units, 300);
    }

    #[test]
    fn test_bad_lines_counted_and_skipped() {
        let mut bytes = String::from("hashcat (v6.2.6) starting...\n");
        bytes.push('\n');
        bytes.push_str(&line(100, 10, 100, 1000, "wl/rockyou.txt"));
        bytes.push_str("{\"status\": 3}\n");
        bytes.push_str(&line(200, 20, 100, 1000, "wl/rockyou.txt"));

        let mut b = builder();
        let stats = b.ingest(bytes.as_bytes());

        assert_eq!(stats.lines, 5);
        assert_eq!(stats.points, 2);
        // Banner and incomplete record count; the blank line does not.
        assert_eq!(stats.decode_errors, 2);
        assert_eq!(b.series().decode_errors, 2);
        assert_eq!(b.series().points.len(), 2);
    }

    #[test]
    fn test_invalid_utf8_counted_as_error() {
        let mut bytes = line(100, 10, 100, 1000, "wl/rockyou.txt").into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe, 0x80, b'\n']);

        let mut b = builder();
        let stats = b.ingest(&bytes);
        assert_eq!(stats.points, 1);
        assert_eq!(stats.decode_errors, 1);
    }

    #[test]
    fn test_regressing_sample_discarded() {
        let mut bytes = line(100, 30, 100, 1000, "wl/rockyou.txt");
        bytes.push_str(&line(150, 10, 100, 1000, "wl/rockyou.txt"));
        bytes.push_str(&line(200, 35, 100, 1000, "wl/rockyou.txt"));

        let mut b = builder();
        let stats = b.ingest(bytes.as_bytes());

        assert_eq!(stats.points, 2);
        assert_eq!(stats.clamped, 1);
        let points = &b.series().points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].recovered, 30);
        assert_eq!(points[1].recovered, 35);
        // x keeps every decoded tick, so the curve stays monotonic.
        assert!(points[1].elapsed_secs > points[0].elapsed_secs);
    }

    #[test]
    fn test_percentage_regression_discarded() {
        // Same recovered count against a grown target set drops the
        // percentage, which must not render as a dip.
        let mut bytes = line(100, 50, 100, 1000, "wl/rockyou.txt");
        bytes.push_str(&line(150, 50, 200, 1000, "wl/rockyou.txt"));

        let mut b = builder();
        let stats = b.ingest(bytes.as_bytes());
        assert_eq!(stats.points, 1);
        assert_eq!(stats.clamped, 1);
    }

    #[test]
    fn test_phase_transition_marks_boundary() {
        let mut bytes = line(100, 10, 100, 1000, "wl/rockyou.txt");
        bytes.push_str(&line(150, 12, 100, 1000, "wl/rockyou.txt"));
        bytes.push_str(&line(40, 15, 100, 1001, "masks/8digits.hcmask"));

        let mut b = builder();
        b.ingest(bytes.as_bytes());

        let series = b.series();
        assert_eq!(series.phases.len(), 2);
        assert_eq!(series.phases[0].label, "rockyou.txt");
        assert_eq!(series.phases[1].label, "8digits.hcmask");

        let points = &series.points;
        assert!(points[0].phase_start);
        assert!(!points[1].phase_start);
        assert!(points[2].phase_start);
        assert_eq!(points[2].phase, 1);
        // Work units accumulate across the phase boundary.
        assert_eq!(points[2].work_units, 100 + 150 + 40);
    }

    #[test]
    fn test_rerun_of_same_attack_is_new_phase() {
        let mut bytes = line(100, 10, 100, 1000, "wl/rockyou.txt");
        bytes.push_str(&line(100, 20, 100, 2000, "wl/rockyou.txt"));

        let mut b = builder();
        b.ingest(bytes.as_bytes());
        assert_eq!(b.series().phases.len(), 2);
        assert!(b.series().points[1].phase_start);
    }

    #[test]
    fn test_elapsed_spans_run_gap() {
        let mut bytes = line(100, 10, 100, 1000, "wl/rockyou.txt");
        bytes.push_str(&line(100, 20, 100, 2000, "wl/rockyou.txt"));

        let mut b = builder();
        b.ingest(bytes.as_bytes());

        let points = &b.series().points;
        assert_eq!(points[0].elapsed_secs, 1.0);
        // Second run starts 1000s after the epoch.
        assert_eq!(points[1].elapsed_secs, 1001.0);
        assert_eq!(points[0].x(XAxis::Time), 1.0);
    }

    #[test]
    fn test_status_timer_scales_elapsed() {
        let mut b = SeriesBuilder::new(PathBuf::from("/logs/s.json"), TraceColor::Red, 10);
        let mut bytes = line(100, 1, 10, 1000, "wl/a.txt");
        bytes.push_str(&line(100, 2, 10, 1000, "wl/a.txt"));
        b.ingest(bytes.as_bytes());

        assert_eq!(b.series().points[0].elapsed_secs, 10.0);
        assert_eq!(b.series().points[1].elapsed_secs, 20.0);
    }

    #[test]
    fn test_discarded_boundary_marker_moves_forward() {
        let mut bytes = line(100, 30, 100, 1000, "wl/rockyou.txt");
        // First sample of the next phase regresses and is discarded.
        bytes.push_str(&line(10, 10, 100, 1001, "wl/darkweb2017.txt"));
        bytes.push_str(&line(20, 30, 100, 1001, "wl/darkweb2017.txt"));

        let mut b = builder();
        let stats = b.ingest(bytes.as_bytes());

        assert_eq!(stats.clamped, 1);
        let points = &b.series().points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].phase, 1);
        assert!(points[1].phase_start);
    }

    #[test]
    fn test_potfile_phase_flagged() {
        let mut bytes = line(100, 10, 100, 1000, "wl/rockyou.txt");
        bytes.push_str(&line(50, 12, 100, 1001, "/tmp/autocat_new_cracked_potfile"));

        let mut b = builder();
        b.ingest(bytes.as_bytes());

        let series = b.series();
        assert!(!series.phases[0].potfile);
        assert!(series.phases[1].potfile);
        assert_eq!(series.phases[1].label, "potfile");
    }

    #[test]
    fn test_record_without_guess_gets_unknown_phase() {
        let bytes =
            r#"{"status": 3, "progress": [10], "recovered_hashes": [0, 5], "time_start": 1000}"#
                .to_string()
                + "\n";

        let mut b = builder();
        b.ingest(bytes.as_bytes());
        assert_eq!(b.series().phases.len(), 1);
        assert_eq!(b.series().phases[0].label, "unknown");
    }

    #[test]
    fn test_label_from_file_stem() {
        let b = SeriesBuilder::new(
            PathBuf::from("/var/log/cracking/gpu-rig-2.json"),
            TraceColor::Green,
            1,
        );
        assert_eq!(b.series().label, "gpu-rig-2");
        assert_eq!(b.series().color, TraceColor::Green);
    }
}
