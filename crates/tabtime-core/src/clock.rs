//! Time-of-day cells.
//!
//! Timesheet times are written as `H`, `H:M` or `H:M:S` with unpadded
//! integer parts. Missing parts default to zero. Parts are converted field
//! by field into an offset from midnight without range checks, so `24:00`
//! is the end of the day.

use std::num::ParseIntError;

use chrono::Duration;
use thiserror::Error;

/// Errors from parsing a time-of-day cell.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// The cell was empty.
    #[error("empty time")]
    Empty,

    /// A colon separated part was not an integer.
    #[error("time part {index} in {input:?}: {source}")]
    Part {
        index: usize,
        input: String,
        #[source]
        source: ParseIntError,
    },

    /// More than hour, minute and second were given.
    #[error("too many time parts in {input:?}, expected H[:M[:S]]")]
    TooManyParts { input: String },
}

/// A time cell as whole seconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(i64);

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self(0);

    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Self {
        Self(i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second))
    }

    /// Offset from midnight.
    pub fn since_midnight(self) -> Duration {
        Duration::seconds(self.0)
    }
}

/// Parses `H[:M[:S]]` into an offset from midnight.
pub fn parse_time(input: &str) -> Result<TimeOfDay, TimeError> {
    if input.is_empty() {
        return Err(TimeError::Empty);
    }

    let mut fields = [0u32; 3];
    for (i, part) in input.split(':').enumerate() {
        let Some(field) = fields.get_mut(i) else {
            return Err(TimeError::TooManyParts {
                input: input.to_string(),
            });
        };
        *field = part.trim().parse().map_err(|source| TimeError::Part {
            index: i + 1,
            input: input.to_string(),
            source,
        })?;
    }

    let [hour, minute, second] = fields;
    Ok(TimeOfDay::from_hms(hour, minute, second))
}

/// Field-wise difference `stop - start`; negative when stop is earlier.
pub fn span(start: TimeOfDay, stop: TimeOfDay) -> Duration {
    stop.since_midnight() - start.since_midnight()
}
