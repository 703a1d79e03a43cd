//! Shared utilities for CLI commands.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use num_rational::BigRational;
use tabtime_core::{Parsed, parse, parse_rate};

/// Reads and parses a timesheet file.
pub fn load_timesheet(path: &Path) -> Result<Parsed> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "read timesheet");
    parse(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parses an optional rate given on the command line or in configuration.
pub fn parse_rate_option(value: Option<&str>, origin: &str) -> Result<Option<BigRational>> {
    value
        .map(|v| parse_rate(v).with_context(|| format!("invalid {origin} rate {v:?}")))
        .transpose()
}

/// Writes warnings after normal output; fails in strict mode if any exist.
pub fn emit_warnings<W: Write>(writer: &mut W, warnings: &[String], strict: bool) -> Result<()> {
    for warning in warnings {
        writeln!(writer, "warning: {warning}")?;
    }
    if strict && !warnings.is_empty() {
        bail!("{} warning(s) reported in strict mode", warnings.len());
    }
    Ok(())
}
