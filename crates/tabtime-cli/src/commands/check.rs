//! Check command for validating a timesheet without summarizing it.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tabtime_core::{Parsed, format_fixed};

use crate::commands::util::load_timesheet;
use crate::output::format_duration;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Timesheet file to read.
    pub file: PathBuf,

    /// Fail if any overlaps are reported.
    #[arg(long)]
    pub strict: bool,
}

/// Runs the check command, returning overlap warnings.
pub fn run<W: Write>(writer: &mut W, args: &CheckArgs) -> Result<Vec<String>> {
    let parsed = load_timesheet(&args.file)?;
    describe(writer, &parsed)?;
    Ok(parsed.overlaps.iter().map(ToString::to_string).collect())
}

/// Writes a short overview of a parsed timesheet.
pub fn describe<W: Write>(writer: &mut W, parsed: &Parsed) -> Result<()> {
    let file = &parsed.file;

    writeln!(writer, "Title:     {}", file.title)?;
    writeln!(writer, "Entries:   {}", file.lines.len())?;
    if let Some((first, last)) = file.date_range() {
        writeln!(writer, "Dates:     {first} to {last}")?;
    }
    writeln!(writer, "Total:     {}", format_duration(file.total_duration()))?;
    if !file.breakout.is_empty() {
        let names: Vec<&str> = file
            .breakout
            .iter()
            .map(|t| {
                if t.reference.is_empty() {
                    t.description.as_str()
                } else {
                    t.reference.as_str()
                }
            })
            .collect();
        writeln!(writer, "Breakouts: {}", names.join(", "))?;
    }
    if let Some(rate) = &file.rate {
        writeln!(writer, "Rate:      {}", format_fixed(rate, 2))?;
    }
    if parsed.overlaps.is_empty() {
        writeln!(writer, "No overlaps.")?;
    } else {
        writeln!(writer, "Overlaps:  {}", parsed.overlaps.len())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabtime_core::parse;

    #[test]
    fn describes_a_clean_timesheet() {
        let input = "August\n\
            @rate\t255/2\n\
            @breakout\t[A] Alpha. [B] Beta\n\
            @breakout\tAdmin\n\
            2023-08-02\t8:00\t9:00\n\
            2023-08-01\t8:00\t8:45:30\n";
        let parsed = parse(input.as_bytes()).unwrap();
        let mut out = Vec::new();
        describe(&mut out, &parsed).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Title:     August\n\
             Entries:   2\n\
             Dates:     2023-08-01 to 2023-08-02\n\
             Total:     1h45m30s\n\
             Breakouts: A, B, Admin\n\
             Rate:      127.50\n\
             No overlaps.\n"
        );
    }

    #[test]
    fn run_returns_overlaps_as_warnings() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sheet.tsv");
        std::fs::write(&path, "2023-08-01\t08:00\t09:00\n2023-08-01\t09:00\t10:00\n").unwrap();

        let mut out = Vec::new();
        let warnings = run(
            &mut out,
            &CheckArgs {
                file: path,
                strict: false,
            },
        )
        .unwrap();
        assert_eq!(
            warnings,
            ["line 1 overlaps line 2, ensure start and stop are not the same"]
        );
        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("Title:     \n"));
        assert!(output.ends_with("Overlaps:  1\n"));
    }
}
