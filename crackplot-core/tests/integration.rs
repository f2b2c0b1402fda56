//! Integration tests for the crackplot ingestion and dataset pipeline
//!
//! These tests drive the full flow against real files in a temp directory:
//! status records appended over time, refreshed through the coordinator,
//! and projected into merged datasets.

use crackplot_core::{
    discover_inputs, Config, DisplayOptions, FileHealth, TailCoordinator, XAxis, YAxis,
};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Build one status line the way hashcat `--status-json` emits it.
fn status_line(
    status: i64,
    progress: u64,
    recovered: u64,
    total: u64,
    time_start: i64,
    base: &str,
    modifier: Option<&str>,
) -> String {
    let guess_mod = match modifier {
        Some(m) => format!(r#""{m}""#),
        None => "null".to_string(),
    };
    format!(
        r#"{{"session": "autocat", "status": {status}, "target": "hashes.txt", "progress": [{progress}, 14344384], "restore_point": 0, "recovered_hashes": [{recovered}, {total}], "recovered_salts": [0, 1], "rejected": 0, "time_start": {time_start}, "estimated_stop": 0, "guess": {{"guess_base": "{base}", "guess_base_count": 1, "guess_mod": {guess_mod}}}}}"#
    ) + "\n"
}

fn append(path: &Path, content: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

/// Write a steadily progressing single-phase session of `count` records.
fn write_session(path: &Path, count: usize, total: u64) {
    let mut content = String::new();
    for i in 0..count {
        content.push_str(&status_line(
            3,
            100,
            (i as u64) / 10,
            total,
            1_695_892_800,
            "wordlists/rockyou.txt",
            Some("rules/best64.rule"),
        ));
    }
    append(path, &content);
}

// ============================================
// End-to-end ingestion
// ============================================

#[test]
fn test_single_session_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rig-a.json");
    append(
        &path,
        &status_line(3, 100, 10, 100, 1000, "wordlists/rockyou.txt", None),
    );
    append(
        &path,
        &status_line(3, 150, 30, 100, 1000, "wordlists/rockyou.txt", None),
    );

    let config = Config::default();
    let mut coordinator = TailCoordinator::open(&[path], &config).unwrap();
    let outcome = coordinator.refresh();
    assert_eq!(outcome.points_added, 2);
    assert_eq!(outcome.decode_errors, 0);

    // Work-unit x accumulates the per-record progress counters.
    let dataset = coordinator.dataset(&DisplayOptions {
        x_axis: XAxis::WorkUnits,
        y_axis: YAxis::Percentage,
        potfile_highlight: true,
    });
    let points = &dataset.series[0].points;
    assert_eq!(points[0].x, 100.0);
    assert_eq!(points[0].y, 10.0);
    assert_eq!(points[1].x, 250.0);
    assert_eq!(points[1].y, 30.0);

    // Time x is derived from sample position at the producer's cadence.
    let dataset = coordinator.dataset(&DisplayOptions {
        x_axis: XAxis::Time,
        y_axis: YAxis::Count,
        potfile_highlight: true,
    });
    let points = &dataset.series[0].points;
    assert_eq!(points[0].x, 1.0);
    assert_eq!(points[0].y, 10.0);
    assert_eq!(points[1].x, 2.0);
    assert_eq!(points[1].y, 30.0);

    assert_eq!(dataset.series[0].label, "rig-a");
}

#[test]
fn test_refresh_timing_is_invisible_in_output() {
    let dir = TempDir::new().unwrap();
    let tailed = dir.path().join("tailed.json");
    let whole = dir.path().join("whole.json");

    let config = Config::default();
    append(&tailed, &status_line(3, 100, 0, 500, 1000, "wl/a.txt", None));
    let mut incremental = TailCoordinator::open(&[tailed.clone()], &config).unwrap();

    // One coordinator refreshes after every appended record.
    incremental.refresh();
    for i in 1..30u64 {
        append(
            &tailed,
            &status_line(3, 100, i, 500, 1000, "wl/a.txt", None),
        );
        incremental.refresh();
    }

    // The other reads the identical content in a single pass.
    let mut content = String::new();
    for i in 0..30u64 {
        content.push_str(&status_line(3, 100, i, 500, 1000, "wl/a.txt", None));
    }
    append(&whole, &content);
    let mut single = TailCoordinator::open(&[whole], &config).unwrap();
    single.refresh();

    let (tailed_series, _) = incremental.series().next().unwrap();
    let (whole_series, _) = single.series().next().unwrap();

    assert_eq!(tailed_series.points, whole_series.points);
    assert_eq!(tailed_series.phases, whole_series.phases);
    assert_eq!(tailed_series.decode_errors, whole_series.decode_errors);
}

// ============================================
// Merging and downsampling
// ============================================

#[test]
fn test_mixed_size_files_share_one_dataset() {
    let dir = TempDir::new().unwrap();
    let small = dir.path().join("small.json");
    let medium = dir.path().join("medium.json");
    let large = dir.path().join("large.json");
    write_session(&small, 50, 10_000);
    write_session(&medium, 2_500, 10_000);
    write_session(&large, 5_000, 10_000);

    let config = Config::default();
    let mut coordinator =
        TailCoordinator::open(&[small, medium, large], &config).unwrap();
    coordinator.refresh();

    let dataset = coordinator.dataset(&DisplayOptions::default());
    assert_eq!(dataset.series.len(), 3);

    // Small series pass through; long ones land on the budget.
    assert_eq!(dataset.series[0].points.len(), 50);
    assert_eq!(dataset.series[1].points.len(), 1000);
    assert_eq!(dataset.series[2].points.len(), 1000);
    assert_eq!(dataset.series[2].raw_len, 5_000);

    // Every trace keeps its first and last point.
    for series in &dataset.series {
        assert_eq!(series.points.first().unwrap().x, 100.0);
        assert_eq!(
            series.points.last().unwrap().x,
            (series.raw_len as f64) * 100.0
        );
    }

    // Bounds cover the longest trace.
    assert_eq!(dataset.x_bounds, [0.0, 500_000.0]);

    let labels: Vec<&str> = dataset.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["small", "medium", "large"]);
}

#[test]
fn test_axis_toggles_never_touch_ingest_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rig.json");
    write_session(&path, 200, 1_000);

    let config = Config::default();
    let mut coordinator = TailCoordinator::open(&[path], &config).unwrap();
    coordinator.refresh();

    let before: Vec<_> = coordinator.series().map(|(s, _)| s.clone()).collect();

    for x_axis in [XAxis::WorkUnits, XAxis::Time] {
        for y_axis in [YAxis::Percentage, YAxis::Count] {
            let dataset = coordinator.dataset(&DisplayOptions {
                x_axis,
                y_axis,
                potfile_highlight: true,
            });
            assert_eq!(dataset.x_axis, x_axis);
            assert_eq!(dataset.y_axis, y_axis);
            assert_eq!(dataset.series[0].raw_len, 200);
        }
    }

    let after: Vec<_> = coordinator.series().map(|(s, _)| s.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_phase_markers_survive_heavy_downsampling() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("autocat.json");

    let mut content = String::new();
    let phases: [(&str, Option<&str>); 3] = [
        ("wordlists/rockyou.txt", Some("rules/best64.rule")),
        ("/tmp/autocat_new_cracked_potfile", None),
        ("masks/8digit.hcmask", None),
    ];
    for (run, (base, modifier)) in phases.iter().enumerate() {
        for i in 0..400u64 {
            // Each run starts when the previous 400-sample run finished.
            content.push_str(&status_line(
                3,
                50,
                run as u64 * 100 + i / 4,
                10_000,
                1000 + run as i64 * 400,
                base,
                *modifier,
            ));
        }
    }
    append(&path, &content);

    let mut config = Config::default();
    config.chart.max_points = 50;
    let mut coordinator = TailCoordinator::open(&[path], &config).unwrap();
    coordinator.refresh();

    let (series, _) = coordinator.series().next().unwrap();
    assert_eq!(series.phases.len(), 3);
    assert_eq!(series.phases[0].label, "rockyou.txt + best64.rule");
    assert_eq!(series.phases[1].label, "potfile");
    assert!(series.phases[1].potfile);
    assert_eq!(series.phases[2].label, "8digit.hcmask");

    let dataset = coordinator.dataset(&DisplayOptions::default());
    let points = &dataset.series[0].points;
    assert!(points.len() <= 50);

    // All three phase boundaries are still in the sampled trace.
    assert_eq!(points.iter().filter(|p| p.phase_start).count(), 3);
    // And the potfile run is still flagged for the highlight overlay.
    assert!(points.iter().any(|p| p.potfile));
}

// ============================================
// Session restarts
// ============================================

#[test]
fn test_restarted_session_appends_monotonic_curve() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("restarted.json");

    // First run ends exhausted; a later run appends to the same file.
    append(
        &path,
        &status_line(3, 1000, 40, 200, 1_000, "wl/rockyou.txt", None),
    );
    append(
        &path,
        &status_line(5, 2000, 55, 200, 1_000, "wl/rockyou.txt", None),
    );
    append(
        &path,
        &status_line(3, 500, 55, 200, 4_600, "wl/rockyou.txt", None),
    );
    append(
        &path,
        &status_line(6, 800, 90, 200, 4_600, "wl/rockyou.txt", None),
    );

    let config = Config::default();
    let mut coordinator = TailCoordinator::open(&[path], &config).unwrap();
    coordinator.refresh();

    let (series, health) = coordinator.series().next().unwrap();
    assert_eq!(*health, FileHealth::Live);
    assert_eq!(series.points.len(), 4);
    // The rerun is a distinct phase even though the attack is the same.
    assert_eq!(series.phases.len(), 2);
    assert_eq!(series.session_start, Some(1_000));
    assert_eq!(series.last_status, Some(6));

    // The gap between runs shows up in elapsed time.
    let elapsed: Vec<f64> = series.points.iter().map(|p| p.elapsed_secs).collect();
    assert_eq!(elapsed, vec![1.0, 2.0, 3601.0, 3602.0]);

    // Both axes stay monotonic across the restart.
    for pair in series.points.windows(2) {
        assert!(pair[1].work_units >= pair[0].work_units);
        assert!(pair[1].recovered >= pair[0].recovered);
    }
}

// ============================================
// Input discovery
// ============================================

#[test]
fn test_discover_then_open_round_trip() {
    let dir = TempDir::new().unwrap();
    write_session(&dir.path().join("rig-a.json"), 5, 100);
    write_session(&dir.path().join("rig-b.json"), 5, 100);
    append(&dir.path().join("README.txt"), "not a status file\n");

    let pattern = format!("{}/*.json", dir.path().display());
    let paths = discover_inputs(&[pattern]).unwrap();
    assert_eq!(paths.len(), 2);

    let config = Config::default();
    let mut coordinator = TailCoordinator::open(&paths, &config).unwrap();
    let outcome = coordinator.refresh();
    assert_eq!(outcome.files_polled, 2);
    assert_eq!(outcome.points_added, 10);
}

#[test]
fn test_same_stem_files_get_distinct_labels() {
    let dir = TempDir::new().unwrap();
    let rig_a = dir.path().join("rig-a");
    let rig_b = dir.path().join("rig-b");
    std::fs::create_dir_all(&rig_a).unwrap();
    std::fs::create_dir_all(&rig_b).unwrap();

    let a = rig_a.join("session.json");
    let b = rig_b.join("session.json");
    write_session(&a, 5, 100);
    write_session(&b, 5, 100);

    let config = Config::default();
    let mut coordinator = TailCoordinator::open(&[a, b], &config).unwrap();
    coordinator.refresh();

    let dataset = coordinator.dataset(&DisplayOptions::default());
    assert_ne!(dataset.series[0].label, dataset.series[1].label);

    // Labels are derived from the path, so they survive a rebuild.
    let again = coordinator.dataset(&DisplayOptions::default());
    assert_eq!(dataset.series[0].label, again.series[0].label);
    assert_eq!(dataset.series[1].label, again.series[1].label);
}
