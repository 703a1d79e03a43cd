//! Core timesheet logic.
//!
//! This crate turns a tab separated timesheet into validated entries and
//! aggregates them into buckets:
//! - Parsing: title, directives (`@rem`, `@rate`, `@breakout`) and entries
//! - Validation: entries on the same date must not touch or overlap
//! - Coding: pluggable strategies mapping an entry to buckets
//! - Summaries: per-bucket durations, annotations and exact billing

mod clock;
mod coder;
mod errors;
mod rate;
mod summary;
mod task;
mod timesheet;

pub use clock::{TimeError, TimeOfDay, parse_time};
pub use coder::{BreakoutCoder, CalendarCoder, Code, CodeError, Coder, Split, kind};
pub use errors::ErrorList;
pub use rate::{RateError, format_fixed, hours, parse_rate, round_half_even};
pub use summary::{HOURS_PLACES, SumError, SumLine, Summary, summarize};
pub use task::{STOP, StopPolicy, Task, sort_dedup, split_description};
pub use timesheet::{
    File, Line, MAX_LINE_HOURS, OverlapError, ParseError, Parsed, find_overlaps, parse,
};
