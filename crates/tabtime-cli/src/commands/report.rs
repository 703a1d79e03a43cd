//! Report command for summarizing a timesheet.
//!
//! This module implements `tabtime report` with table (TSV, CSV) and JSON
//! output. Overlaps and coding conflicts are returned as warnings so the
//! caller can print them after the report.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use num_rational::BigRational;
use serde::Serialize;
use tabtime_core::{
    BreakoutCoder, CalendarCoder, Coder, HOURS_PLACES, Parsed, SumLine, format_fixed, summarize,
};

use crate::Config;
use crate::commands::util::{load_timesheet, parse_rate_option};
use crate::output::{Csv, OutputFormat, TableWriter, Tsv, format_duration, truncate};

const HEADER: [&str; 6] = [
    "Name",
    "Duration",
    "Hours",
    "Amount",
    "References",
    "Description",
];

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Timesheet file to read.
    pub file: PathBuf,

    /// Hourly rate, overriding the file's @rate directive.
    #[arg(long)]
    pub rate: Option<String>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Maximum description width; 0 disables truncation.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Ignore @breakout declarations and bucket by calendar only.
    #[arg(long)]
    pub calendar_only: bool,

    /// Fail if any warnings are reported.
    #[arg(long)]
    pub strict: bool,
}

/// Resolved rendering options.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Rate that takes precedence over the file's `@rate`.
    pub rate: Option<BigRational>,
    /// Rate used when neither an override nor `@rate` is present.
    pub fallback_rate: Option<BigRational>,
    pub format: OutputFormat,
    pub limit: usize,
    pub calendar_only: bool,
}

impl ReportOptions {
    /// Combines command-line arguments with configuration.
    pub fn resolve(args: &ReportArgs, config: &Config) -> Result<Self> {
        Ok(Self {
            rate: parse_rate_option(args.rate.as_deref(), "--rate")?,
            fallback_rate: parse_rate_option(config.rate.as_deref(), "configured")?,
            format: args.format.unwrap_or(config.format),
            limit: args.limit.unwrap_or(config.description_limit),
            calendar_only: args.calendar_only,
        })
    }
}

/// JSON representation of a report.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub title: String,
    pub rate: Option<String>,
    pub rows: Vec<ReportRow>,
}

/// One bucket of the report.
#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub duration: String,
    pub hours: String,
    pub amount: Option<String>,
    pub references: Vec<String>,
    pub descriptions: Vec<String>,
}

impl ReportRow {
    fn from_sum(sum: &mut SumLine, rate: Option<&BigRational>) -> Self {
        let hours = format_fixed(sum.compute_hours(), HOURS_PLACES);
        let amount = rate.map(|r| format_fixed(sum.compute_amount(r), 2));
        Self {
            name: sum.name.clone(),
            duration: format_duration(sum.duration),
            hours,
            amount,
            references: sum.references.clone(),
            descriptions: sum.descriptions.clone(),
        }
    }

    fn cells(&self, limit: usize) -> Vec<String> {
        vec![
            self.name.clone(),
            self.duration.clone(),
            self.hours.clone(),
            self.amount.clone().unwrap_or_default(),
            self.references.join(" "),
            truncate(&self.descriptions.join(" "), limit),
        ]
    }
}

/// Runs the report command, returning warnings for the caller to print.
pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<Vec<String>> {
    let options = ReportOptions::resolve(args, config)?;
    let parsed = load_timesheet(&args.file)?;
    render(writer, parsed, &options)
}

/// Summarizes a parsed timesheet and writes it in the chosen format.
pub fn render<W: Write>(
    writer: &mut W,
    parsed: Parsed,
    options: &ReportOptions,
) -> Result<Vec<String>> {
    let Parsed { file, overlaps } = parsed;

    let coder: Box<dyn Coder> = if options.calendar_only {
        Box::new(CalendarCoder)
    } else {
        Box::new(BreakoutCoder::new(&file.breakout))
    };
    let mut summary = summarize(&file.lines, coder.as_ref());

    let rate = options
        .rate
        .as_ref()
        .or(file.rate.as_ref())
        .or(options.fallback_rate.as_ref());
    tracing::debug!(has_rate = rate.is_some(), buckets = summary.sums.len(), "rendering report");

    let data = ReportData {
        title: file.title.clone(),
        rate: rate.map(|r| format_fixed(r, 2)),
        rows: summary
            .sums
            .iter_mut()
            .map(|sum| ReportRow::from_sum(sum, rate))
            .collect(),
    };

    match options.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &data)?;
            writeln!(writer)?;
        }
        OutputFormat::Tsv => write_table(&mut Tsv::new(&mut *writer), &data, options.limit)?,
        OutputFormat::Csv => write_table(&mut Csv::new(&mut *writer), &data, options.limit)?,
    }

    let warnings = overlaps
        .iter()
        .map(ToString::to_string)
        .chain(summary.errors.iter().map(ToString::to_string))
        .collect();
    Ok(warnings)
}

fn write_table<T: TableWriter>(table: &mut T, data: &ReportData, limit: usize) -> Result<()> {
    table.line(&["Report".to_string(), data.title.clone()])?;
    table.line(&HEADER.map(String::from))?;
    for row in &data.rows {
        table.line(&row.cells(limit))?;
    }
    table.close()?;
    Ok(())
}
