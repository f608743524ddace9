//! Terminal rendering and persistence of line counts.
//!
//! Supports the text chart and table, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::app::View;
use crate::present::DisplayRow;
use crate::stats::{LineCount, total};

pub const FETCH_WARNING: &str = "Could not load vehicle data. Try refreshing in a moment.";

const BAR: char = '█';

/// Horizontal bar chart of vehicles per line, bars scaled to `width`.
pub fn render_chart(counts: &[LineCount], width: usize) -> String {
    let mut out = String::from("Vehicles per line\n");
    let Some(max) = counts.iter().map(|c| c.count).max() else {
        out.push_str("  (no vehicles)\n");
        return out;
    };
    let all = total(counts);
    let label_w = counts
        .iter()
        .map(|c| label(&c.line).chars().count())
        .max()
        .unwrap_or(0);

    for c in counts {
        let len = (c.count * width).div_ceil(max.max(1));
        let _ = writeln!(
            out,
            "  {:>label_w$} │{:<width$} {:>4}  ({:.1}%)",
            label(&c.line),
            BAR.to_string().repeat(len),
            c.count,
            c.share_pct(all),
        );
    }
    out
}

fn label(line: &str) -> &str {
    if line.is_empty() { "-" } else { line }
}

/// The vehicle table, preceded by the number of matching vehicles.
pub fn render_table(rows: &[DisplayRow]) -> String {
    const HEADERS: [&str; 3] = ["Brigade", "Course", "Fleet number"];

    let mut widths = HEADERS.map(|h| h.chars().count());
    for r in rows {
        for (w, cell) in widths.iter_mut().zip(cells(r)) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = format!("Found {} vehicles.\n", rows.len());
    if rows.is_empty() {
        return out;
    }
    let [bw, cw, fw] = widths;
    let _ = writeln!(out, "  {:<bw$}  {:<cw$}  {:<fw$}", HEADERS[0], HEADERS[1], HEADERS[2]);
    let _ = writeln!(out, "  {}  {}  {}", "─".repeat(bw), "─".repeat(cw), "─".repeat(fw));
    for r in rows {
        let [b, c, f] = cells(r);
        let _ = writeln!(out, "  {b:<bw$}  {c:<cw$}  {f:<fw$}");
    }
    out
}

fn cells(r: &DisplayRow) -> [&str; 3] {
    [&r.brigade, &r.course_number, &r.fleet_number]
}

/// The user-facing notice for a failed fetch, with the failure reason.
pub fn render_warning(reason: &str) -> String {
    format!("{FETCH_WARNING}\n  ({reason})\n")
}

/// Full screen for one view: warning, or chart followed by table.
pub fn render_view(view: &View, chart_width: usize) -> String {
    if let Some(warning) = &view.warning {
        return render_warning(warning);
    }
    let mut out = String::new();
    if let Some(at) = view.fetched_at {
        let _ = writeln!(out, "Snapshot taken {}\n", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    out.push_str(&render_chart(&view.counts, chart_width));
    out.push('\n');
    if !view.filter.trim().is_empty() {
        let _ = writeln!(out, "Lines: {}", view.filter.trim());
    }
    out.push_str(&render_table(&view.rows));
    out
}

/// Serializes a view as pretty-printed JSON.
pub fn view_json(view: &View) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

#[derive(Debug, Serialize)]
struct CountRecord<'a> {
    timestamp: DateTime<Utc>,
    line: &'a str,
    count: usize,
}

/// Appends one row per line to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_counts(path: &str, timestamp: DateTime<Utc>, counts: &[LineCount]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = counts.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for c in counts {
        writer.serialize(CountRecord {
            timestamp,
            line: &c.line,
            count: c.count,
        })?;
    }
    writer.flush()?;

    Ok(())
}
