//! crackplot - live password-cracking progress charts
//!
//! Terminal chart for hashcat `--status-json` logs: tails one or more
//! status files and plots recovery progress per file, refreshing on a
//! timer while the cracking rigs keep writing.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crackplot_core::{discover_inputs, Config, DisplayOptions, TailCoordinator, XAxis, YAxis};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

#[derive(Parser)]
#[command(name = "crackplot")]
#[command(about = "Live progress charts for hashcat --status-json logs")]
#[command(version)]
struct Args {
    /// Status file paths or glob patterns (expanded once at startup)
    #[arg(required = true)]
    files: Vec<String>,

    /// Refresh interval in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=300))]
    interval: Option<u64>,

    /// Seconds between producer samples (hashcat --status-timer)
    #[arg(long)]
    status_timer: Option<u64>,

    /// Per-series point budget for rendering
    #[arg(long)]
    max_points: Option<usize>,

    /// Initial x axis: "guesses" or "time"
    #[arg(short = 'x', long, default_value = "guesses")]
    x_axis: XAxis,

    /// Initial y axis: "percentage" or "count"
    #[arg(short = 'y', long, default_value = "percentage")]
    y_axis: YAxis,

    /// Do not overlay potfile phases
    #[arg(long)]
    no_potfile_highlight: bool,

    /// Use an alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    // Load configuration, then let flags override it
    let mut config = match &args.config {
        Some(path) => Config::load_from(path).context("failed to load configuration")?,
        None => Config::load().context("failed to load configuration")?,
    };
    if let Some(interval) = args.interval {
        config.refresh.interval_secs = interval;
    }
    if let Some(timer) = args.status_timer {
        config.refresh.status_timer_secs = timer;
    }
    if let Some(max_points) = args.max_points {
        config.chart.max_points = max_points;
    }
    if args.no_potfile_highlight {
        config.chart.potfile_highlight = false;
    }
    config.validate().context("invalid configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        crackplot_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("crackplot starting up");

    // Resolve the input set once; the tracked files never change afterwards
    let paths = discover_inputs(&args.files).context("failed to resolve input files")?;
    if paths.is_empty() {
        bail!("no input files matched {:?}", args.files);
    }
    tracing::info!(count = paths.len(), "Resolved input files");

    let coordinator =
        TailCoordinator::open(&paths, &config).context("failed to open input files")?;

    let options = DisplayOptions {
        x_axis: args.x_axis,
        y_axis: args.y_axis,
        potfile_highlight: config.chart.potfile_highlight,
    };

    // Create app and run the initial ingest before taking the terminal,
    // so a large backlog never renders as an empty chart
    let mut app = App::new(coordinator, options, &config);
    app.refresh();

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("crackplot shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Refresh when the interval has elapsed; late ticks coalesce into
        // one pass instead of queueing
        app.maybe_refresh();

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        if event::poll(std::time::Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
