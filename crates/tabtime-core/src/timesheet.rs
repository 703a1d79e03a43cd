//! Timesheet parsing and overlap validation.
//!
//! # Format
//!
//! ```text
//! Client X, August
//! @rate<TAB>120
//! @breakout<TAB>[X-12] Database migration. [X-14] Onboarding
//! 2023-08-01<TAB>8:00<TAB>12:30<TAB>[X-12] Schema draft. Standup.
//! @rem<TAB>anything
//! ```
//!
//! The first line is the title only when it has no tab. Data lines are `date<TAB>start<TAB>stop[<TAB>description]`. Structural
//! problems abort parsing with a [`ParseError`]; overlapping entries are
//! reported through [`Parsed::overlaps`] without discarding the file.

use chrono::{Duration, NaiveDate};
use num_rational::BigRational;
use thiserror::Error;

use crate::clock::{self, TimeError, TimeOfDay};
use crate::errors::ErrorList;
use crate::rate::{RateError, parse_rate};
use crate::task::{STOP, StopPolicy, Task, split_description};

/// Longest span a single entry may cover before it is assumed to be a typo.
pub const MAX_LINE_HOURS: i64 = 10;

/// Fatal structural errors. Each carries the 1-based source line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },

    #[error("line {line}: unknown command {command}")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: missing expected breakout description")]
    MissingBreakout { line: usize },

    #[error("line {line}: breakout reference {reference:?} declared more than once")]
    DuplicateBreakout { line: usize, reference: String },

    #[error("line {line}: multiple rates per file not allowed")]
    DuplicateRate { line: usize },

    #[error("line {line}: missing rate value")]
    MissingRate { line: usize },

    #[error("line {line}: parse rate failed: {error}")]
    InvalidRate { line: usize, error: RateError },

    #[error("line {line}: incomplete line, expected date, start and stop")]
    Incomplete { line: usize },

    #[error("line {line}: invalid date {value:?}: {error}")]
    InvalidDate {
        line: usize,
        value: String,
        error: chrono::ParseError,
    },

    #[error("line {line}: start time {error}")]
    Start { line: usize, error: TimeError },

    #[error("line {line}: stop time {error}")]
    Stop { line: usize, error: TimeError },

    #[error("line {line}: duration negative, stop time before start time")]
    NegativeDuration { line: usize },

    #[error("line {line}: duration larger than {max}h, this must be a mistake", max = MAX_LINE_HOURS)]
    TooLong { line: usize },
}

impl ParseError {
    /// The 1-based source line the error refers to.
    pub const fn line(&self) -> usize {
        match self {
            Self::InvalidUtf8 { line }
            | Self::UnknownCommand { line, .. }
            | Self::MissingBreakout { line }
            | Self::DuplicateBreakout { line, .. }
            | Self::DuplicateRate { line }
            | Self::MissingRate { line }
            | Self::InvalidRate { line, .. }
            | Self::Incomplete { line }
            | Self::InvalidDate { line, .. }
            | Self::Start { line, .. }
            | Self::Stop { line, .. }
            | Self::NegativeDuration { line }
            | Self::TooLong { line } => *line,
        }
    }
}

/// Two entries on the same date whose times touch or cross.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("line {previous} overlaps line {next}, ensure start and stop are not the same")]
pub struct OverlapError {
    pub previous: usize,
    pub next: usize,
}

/// One validated time entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based source line.
    pub number: usize,
    pub date: NaiveDate,
    /// Inclusive.
    pub start: TimeOfDay,
    /// Inclusive.
    pub stop: TimeOfDay,
    pub duration: Duration,
    pub description: String,
    pub tasks: Vec<Task>,
}

impl Line {
    /// Chronological ordering key.
    pub const fn sort_key(&self) -> (NaiveDate, TimeOfDay, TimeOfDay) {
        (self.date, self.start, self.stop)
    }
}

/// A fully parsed timesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    pub title: String,
    /// Entries in chronological order.
    pub lines: Vec<Line>,
    /// Declared breakout tasks in declaration order. References are unique
    /// where present.
    pub breakout: Vec<Task>,
    pub rate: Option<BigRational>,
}

impl File {
    /// Sum of all entry durations.
    pub fn total_duration(&self) -> Duration {
        self.lines
            .iter()
            .fold(Duration::zero(), |acc, line| acc + line.duration)
    }

    /// First and last date covered, if there are any entries.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.lines.first()?.date, self.lines.last()?.date))
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub file: File,
    /// Non-fatal overlap violations, in chronological order.
    pub overlaps: ErrorList<OverlapError>,
}

/// Parses a timesheet document.
pub fn parse(data: &[u8]) -> Result<Parsed, ParseError> {
    let mut file = File::default();

    for (i, raw) in data.split(|&b| b == b'\n').enumerate() {
        let number = i + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let text =
            std::str::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8 { line: number })?;

        if i == 0 && !text.contains('\t') {
            file.title = text.trim().to_string();
            continue;
        }
        if text.trim().is_empty() {
            continue;
        }

        let cells: Vec<&str> = text.split('\t').collect();
        if let Some((first, rest)) = cells.split_first() {
            if first.starts_with('@') {
                apply_directive(&mut file, number, first, rest)?;
                continue;
            }
        }

        file.lines.push(parse_line(number, &cells)?);
    }

    file.lines.sort_by_key(Line::sort_key);
    let overlaps = find_overlaps(&file.lines);

    tracing::debug!(
        lines = file.lines.len(),
        breakouts = file.breakout.len(),
        has_rate = file.rate.is_some(),
        overlaps = overlaps.len(),
        "parsed timesheet"
    );

    Ok(Parsed { file, overlaps })
}

/// Reports every adjacent pair on the same date where the earlier entry
/// stops at or after the later one starts. Expects chronological order.
#[expect(
    clippy::suspicious_operation_groupings,
    reason = "touching entries overlap, so stop is compared against the next start"
)]
pub fn find_overlaps(lines: &[Line]) -> ErrorList<OverlapError> {
    lines
        .windows(2)
        .filter_map(|pair| match pair {
            [prev, next] if prev.date == next.date && prev.stop >= next.start => {
                Some(OverlapError {
                    previous: prev.number,
                    next: next.number,
                })
            }
            _ => None,
        })
        .collect()
}

fn apply_directive(
    file: &mut File,
    line: usize,
    first: &str,
    rest: &[&str],
) -> Result<(), ParseError> {
    let (command, argument) = directive_parts(first, rest);
    tracing::trace!(line, command, "directive");

    match command {
        "@rem" => {}
        "@breakout" => {
            let tasks = argument
                .map(|text| split_description(text, STOP, StopPolicy::Strip))
                .unwrap_or_default();
            if tasks.is_empty() {
                return Err(ParseError::MissingBreakout { line });
            }
            for task in tasks {
                let duplicate = !task.reference.is_empty()
                    && file.breakout.iter().any(|b| b.reference == task.reference);
                if duplicate {
                    return Err(ParseError::DuplicateBreakout {
                        line,
                        reference: task.reference,
                    });
                }
                file.breakout.push(task);
            }
        }
        "@rate" => {
            if file.rate.is_some() {
                return Err(ParseError::DuplicateRate { line });
            }
            let value = argument.ok_or(ParseError::MissingRate { line })?;
            let rate = parse_rate(value).map_err(|error| ParseError::InvalidRate { line, error })?;
            file.rate = Some(rate);
        }
        _ => {
            return Err(ParseError::UnknownCommand {
                line,
                command: command.to_string(),
            });
        }
    }
    Ok(())
}

/// Splits a directive into its command and single argument.
///
/// The argument is the second cell, or the rest of the first cell when the
/// command is separated by a space (`@rate 120`).
fn directive_parts<'a>(first: &'a str, rest: &[&'a str]) -> (&'a str, Option<&'a str>) {
    if let Some((command, tail)) = first.split_once(char::is_whitespace) {
        let tail = tail.trim();
        let argument = (rest.is_empty() && !tail.is_empty()).then_some(tail);
        return (command, argument);
    }
    let argument = match rest {
        [argument] => Some(*argument),
        _ => None,
    };
    (first, argument)
}

fn parse_line(number: usize, cells: &[&str]) -> Result<Line, ParseError> {
    let [date, start, stop, extra @ ..] = cells else {
        return Err(ParseError::Incomplete { line: number });
    };

    let date = date.trim();
    let date =
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|error| ParseError::InvalidDate {
            line: number,
            value: date.to_string(),
            error,
        })?;
    let start = clock::parse_time(start.trim()).map_err(|error| ParseError::Start {
        line: number,
        error,
    })?;
    let stop = clock::parse_time(stop.trim()).map_err(|error| ParseError::Stop {
        line: number,
        error,
    })?;

    let duration = clock::span(start, stop);
    if duration < Duration::zero() {
        return Err(ParseError::NegativeDuration { line: number });
    }
    if duration > Duration::hours(MAX_LINE_HOURS) {
        return Err(ParseError::TooLong { line: number });
    }

    let description = extra.first().map_or_else(String::new, |d| (*d).to_string());
    let tasks = split_description(&description, STOP, StopPolicy::Ensure);

    Ok(Line {
        number,
        date,
        start,
        stop,
        duration,
        description,
        tasks,
    })
}
