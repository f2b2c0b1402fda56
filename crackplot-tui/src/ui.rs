//! UI rendering for the TUI.

use crackplot_core::format::{format_count, format_elapsed};
use crackplot_core::{FileHealth, TraceColor, XAxis, YAxis};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, BorderType, Borders, Cell, Chart, Dataset, GraphType, LegendPosition,
        Paragraph, Row, Table,
    },
    Frame,
};

use crate::app::App;

/// Overlay color for potfile phases. The dashboards this replaces drew
/// them black on white; on a dark terminal the neutral equivalent is
/// white.
const POTFILE_OVERLAY: Color = Color::White;
/// Axis line and label color
const AXIS_COLOR: Color = Color::Gray;
/// Key hint color in the footer
const HINT_KEY: Color = Color::Yellow;
/// Secondary text color
const DIM: Color = Color::DarkGray;

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Reserve one line per file plus table chrome, within reason
    let table_height = (app.file_rows.len() as u16 + 3).min(area.height / 3);

    let chunks = Layout::vertical([
        Constraint::Length(2),            // Header
        Constraint::Min(8),               // Chart
        Constraint::Length(table_height), // Per-file table
        Constraint::Length(1),            // Footer
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_file_table(frame, app, chunks[2]);
    render_footer(frame, chunks[3]);
}

fn trace_color(color: TraceColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

fn health_style(health: &FileHealth) -> Style {
    match health {
        FileHealth::Live => Style::default().fg(Color::Green),
        FileHealth::Stalled => Style::default().fg(Color::Yellow),
        FileHealth::Failed(_) => Style::default().fg(Color::Red),
    }
}

/// Render the header: app name, file count, refresh cadence.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" crackplot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("│ {} file(s) ", app.file_count()),
            Style::default().fg(DIM),
        ),
        Span::styled(
            format!("│ every {}s ", app.interval.as_secs()),
            Style::default().fg(DIM),
        ),
    ];

    if let Some(at) = app.last_refresh_at {
        spans.push(Span::styled(
            format!("│ updated {} ", at.format("%H:%M:%S")),
            Style::default().fg(DIM),
        ));
    }
    if let Some(outcome) = &app.last_outcome {
        if outcome.points_added > 0 {
            spans.push(Span::styled(
                format!("│ +{} pts ", outcome.points_added),
                Style::default().fg(Color::Green),
            ));
        }
        if outcome.decode_errors > 0 {
            spans.push(Span::styled(
                format!("│ {} bad line(s) ", outcome.decode_errors),
                Style::default().fg(Color::Yellow),
            ));
        }
        if !outcome.errors.is_empty() {
            spans.push(Span::styled(
                format!("│ {} file(s) failed ", outcome.errors.len()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
    }

    let header =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

/// Render the progress chart with one trace per file.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let merged = &app.dataset;

    // Point buffers outlive the datasets that borrow them
    let mut series_data: Vec<Vec<(f64, f64)>> = Vec::with_capacity(merged.series.len());
    let mut overlay_data: Vec<Vec<(f64, f64)>> = Vec::with_capacity(merged.series.len());
    for series in &merged.series {
        series_data.push(series.points.iter().map(|p| (p.x, p.y)).collect());
        if app.options.potfile_highlight {
            overlay_data.push(
                series
                    .points
                    .iter()
                    .filter(|p| p.potfile)
                    .map(|p| (p.x, p.y))
                    .collect(),
            );
        } else {
            overlay_data.push(Vec::new());
        }
    }

    let mut datasets: Vec<Dataset> = Vec::new();
    for (index, series) in merged.series.iter().enumerate() {
        datasets.push(
            Dataset::default()
                .name(series.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(trace_color(series.color)))
                .data(&series_data[index]),
        );
        // Unnamed so the overlay stays out of the legend
        if !overlay_data[index].is_empty() {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(POTFILE_OVERLAY))
                    .data(&overlay_data[index]),
            );
        }
    }

    let x_labels = axis_labels(merged.x_bounds[1], |v| match merged.x_axis {
        XAxis::WorkUnits => format_count(v),
        XAxis::Time => format_elapsed(v),
    });
    let y_labels = axis_labels(merged.y_bounds[1], |v| match merged.y_axis {
        YAxis::Percentage => format!("{:.1}%", v),
        YAxis::Count => format_count(v),
    });

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Recovery Progress "),
        )
        .x_axis(
            Axis::default()
                .title(merged.x_axis.title())
                .style(Style::default().fg(AXIS_COLOR))
                .bounds(merged.x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(merged.y_axis.title())
                .style(Style::default().fg(AXIS_COLOR))
                .bounds(merged.y_bounds)
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopLeft));

    frame.render_widget(chart, area);
}

/// Three evenly spaced labels for an axis from zero to `max`.
fn axis_labels(max: f64, fmt: impl Fn(f64) -> String) -> Vec<Span<'static>> {
    vec![
        Span::raw(fmt(0.0)),
        Span::raw(fmt(max / 2.0)),
        Span::raw(fmt(max)),
    ]
}

/// Render the per-file summary table.
fn render_file_table(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .file_rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(Span::styled(
                    "──",
                    Style::default().fg(trace_color(row.color)),
                )),
                Cell::from(row.label.clone()),
                Cell::from(Span::styled(row.health.as_str(), health_style(&row.health))),
                Cell::from(format!(
                    "{}/{} ({:.1}%)",
                    row.recovered, row.total, row.percentage
                )),
                Cell::from(format!("{}/{}", row.sampled, row.raw)),
                Cell::from(row.phase.clone()),
                Cell::from(row.status.clone()),
                Cell::from(if row.decode_errors > 0 {
                    row.decode_errors.to_string()
                } else {
                    String::new()
                }),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),  // Color swatch
            Constraint::Min(12),    // Label
            Constraint::Length(7),  // Health
            Constraint::Length(18), // Cracked
            Constraint::Length(11), // Points
            Constraint::Min(14),    // Phase
            Constraint::Length(10), // Status
            Constraint::Length(5),  // Errors
        ],
    )
    .header(
        Row::new(vec![
            "", "file", "state", "cracked", "points", "phase", "status", "errs",
        ])
        .style(Style::default().fg(DIM).add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Files "),
    );

    frame.render_widget(table, area);
}

/// Render the key hint footer.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Line::from(vec![
        Span::styled(" x", Style::default().fg(HINT_KEY)),
        Span::raw(" axis  "),
        Span::styled("y", Style::default().fg(HINT_KEY)),
        Span::raw(" axis  "),
        Span::styled("p", Style::default().fg(HINT_KEY)),
        Span::raw(" potfile  "),
        Span::styled("r", Style::default().fg(HINT_KEY)),
        Span::raw(" refresh  "),
        Span::styled("+/-", Style::default().fg(HINT_KEY)),
        Span::raw(" interval  "),
        Span::styled("q", Style::default().fg(HINT_KEY)),
        Span::raw(" quit"),
    ]);
    frame.render_widget(Paragraph::new(footer).style(Style::default().fg(DIM)), area);
}
