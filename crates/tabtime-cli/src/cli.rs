//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::check::CheckArgs;
use crate::commands::report::ReportArgs;

/// Tab separated timesheet reports.
///
/// Reads a plain-text timesheet, validates that entries do not overlap and
/// totals time by day, ISO week, month, year and declared breakout task.
#[derive(Debug, Parser)]
#[command(name = "tabtime", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize a timesheet into buckets with hours and amounts.
    Report(ReportArgs),

    /// Parse and validate a timesheet without summarizing it.
    Check(CheckArgs),
}
