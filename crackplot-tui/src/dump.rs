//! crackplot-dump - one-shot snapshot of cracking progress
//!
//! Reads the given status files once and prints a per-file summary, or
//! the full merged dataset as JSON for scripting. Useful over SSH where a
//! live chart is unwanted, and as a quick sanity check that a status file
//! decodes at all.

use anyhow::{bail, Context, Result};
use clap::Parser;
use crackplot_core::ingest::decode;
use crackplot_core::{
    discover_inputs, format, Config, DisplayOptions, TailCoordinator, XAxis, YAxis,
};

#[derive(Parser)]
#[command(name = "crackplot-dump")]
#[command(about = "One-shot summary of hashcat --status-json logs")]
#[command(version)]
struct Args {
    /// Status file paths or glob patterns
    #[arg(required = true)]
    files: Vec<String>,

    /// Print the merged dataset as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// X axis for the JSON projection: "guesses" or "time"
    #[arg(short = 'x', long, default_value = "guesses")]
    x_axis: XAxis,

    /// Y axis for the JSON projection: "percentage" or "count"
    #[arg(short = 'y', long, default_value = "percentage")]
    y_axis: YAxis,

    /// Per-series point budget
    #[arg(long)]
    max_points: Option<usize>,

    /// Seconds between producer samples (hashcat --status-timer)
    #[arg(long)]
    status_timer: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(max_points) = args.max_points {
        config.chart.max_points = max_points;
    }
    if let Some(timer) = args.status_timer {
        config.refresh.status_timer_secs = timer;
    }
    config.validate().context("invalid configuration")?;

    let _log_guard =
        crackplot_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let paths = discover_inputs(&args.files).context("failed to resolve input files")?;
    if paths.is_empty() {
        bail!("no input files matched {:?}", args.files);
    }

    let mut coordinator =
        TailCoordinator::open(&paths, &config).context("failed to open input files")?;
    let outcome = coordinator.refresh();

    if args.json {
        let dataset = coordinator.dataset(&DisplayOptions {
            x_axis: args.x_axis,
            y_axis: args.y_axis,
            potfile_highlight: true,
        });
        println!("{}", serde_json::to_string_pretty(&dataset)?);
        return Ok(());
    }

    println!(
        "Read {} file(s): {} points, {} undecodable line(s)",
        outcome.files_polled, outcome.points_added, outcome.decode_errors
    );
    println!();

    for (series, health) in coordinator.series() {
        println!("{} [{}]", series.label, health.as_str());
        println!("  path:     {}", series.path.display());
        if let Some(epoch) = series.session_start {
            println!("  started:  {}", format::format_epoch(epoch));
        }
        if let Some(point) = series.points.last() {
            println!("  elapsed:  {}", format::format_elapsed(point.elapsed_secs));
            println!(
                "  tested:   {} candidates",
                format::format_count(point.work_units as f64)
            );
            println!(
                "  cracked:  {}/{} ({:.1}%)",
                point.recovered,
                point.total,
                point.percentage()
            );
        }
        println!("  points:   {}", series.points.len());
        if let Some(phase) = series.phases.last() {
            println!("  phase:    {} of {}", phase.label, series.phases.len());
        }
        if let Some(code) = series.last_status {
            println!("  status:   {}", decode::status_name(code));
        }
        if series.decode_errors > 0 {
            println!("  bad:      {} line(s)", series.decode_errors);
        }
        println!();
    }

    for warning in &outcome.warnings {
        eprintln!("Warning: {}", warning);
    }
    for (path, error) in &outcome.errors {
        eprintln!("Error: {}: {}", path.display(), error);
    }

    Ok(())
}
