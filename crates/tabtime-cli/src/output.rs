//! Table writers and cell formatting.

use std::io::{self, Write};

use chrono::Duration;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab separated cells.
    #[default]
    Tsv,
    /// Comma separated cells with quoting.
    Csv,
    /// A single pretty-printed JSON document.
    Json,
}

/// Row-oriented table output.
pub trait TableWriter {
    fn line(&mut self, cells: &[String]) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

/// Tab separated rows. Tabs and newlines inside cells become spaces.
pub struct Tsv<W: Write> {
    out: W,
}

impl<W: Write> Tsv<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> TableWriter for Tsv<W> {
    fn line(&mut self, cells: &[String]) -> io::Result<()> {
        let cells: Vec<String> = cells
            .iter()
            .map(|c| c.replace(['\t', '\n', '\r'], " "))
            .collect();
        writeln!(self.out, "{}", cells.join("\t"))
    }

    fn close(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Comma separated rows; cells with quotes, commas or newlines are quoted.
pub struct Csv<W: Write> {
    out: io::BufWriter<W>,
}

impl<W: Write> Csv<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: io::BufWriter::new(out),
        }
    }

    fn cell(value: &str) -> String {
        if value.contains(['"', ',', '\n', '\r']) {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl<W: Write> TableWriter for Csv<W> {
    fn line(&mut self, cells: &[String]) -> io::Result<()> {
        let cells: Vec<String> = cells.iter().map(|c| Self::cell(c)).collect();
        writeln!(self.out, "{}", cells.join(","))
    }

    fn close(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Cuts `text` to at most `limit` characters, marking the cut with `...`.
/// A limit of zero disables truncation.
pub fn truncate(text: &str, limit: usize) -> String {
    if limit == 0 {
        return text.to_string();
    }
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Formats a duration as `1h05m`, adding seconds only when present.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);

    if seconds == 0 {
        format!("{sign}{hours}h{minutes:02}m")
    } else {
        format!("{sign}{hours}h{minutes:02}m{seconds:02}s")
    }
}
