//! Bucket classification strategies.
//!
//! A [`Coder`] decides which aggregation buckets a time entry contributes
//! to and how each bucket is labelled. Two strategies are provided:
//!
//! - [`CalendarCoder`]: grand total plus day, ISO week, month and year.
//! - [`BreakoutCoder`]: routes entries tagged with a declared breakout
//!   reference into a dedicated bucket, falling back to another coder for
//!   everything else.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::task::Task;

/// Bucket kinds used by the bundled coders. Custom coders may use others.
pub mod kind {
    pub const DAY: i32 = 1;
    pub const WEEK: i32 = 2;
    pub const MONTH: i32 = 3;
    pub const YEAR: i32 = 4;
    pub const TOTAL: i32 = 5;
    pub const BREAKOUT: i32 = 6;
}

/// Aggregation bucket key. Orders by kind, then value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code {
    pub kind: i32,
    pub value: i64,
}

impl Code {
    /// The grand-total bucket.
    pub const TOTAL: Self = Self::new(kind::TOTAL, 0);

    pub const fn new(kind: i32, value: i64) -> Self {
        Self { kind, value }
    }
}

/// Non-fatal classification problems.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error(
        "multiple different breakout references on same time line cannot be split: [{first}] and [{other}]"
    )]
    MultipleBreakouts { first: String, other: String },
}

/// Buckets for one entry, plus an optional conflict report.
///
/// A conflict does not discard the codes; the entry is still counted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Split {
    pub codes: Vec<Code>,
    pub error: Option<CodeError>,
}

impl From<Vec<Code>> for Split {
    fn from(codes: Vec<Code>) -> Self {
        Self { codes, error: None }
    }
}

/// Classifies entries into buckets and labels buckets.
pub trait Coder {
    /// Every bucket an entry on `date` with `tasks` contributes to.
    fn split(&self, date: NaiveDate, tasks: &[Task]) -> Split;

    /// Human label for a bucket.
    fn describe(&self, code: Code) -> String;
}

/// Grand total plus day, ISO week, month and year buckets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarCoder;

impl CalendarCoder {
    /// Calendar buckets for a date.
    ///
    /// Weeks use the ISO week-numbering year, months and years the
    /// calendar year.
    pub fn codes(date: NaiveDate) -> Vec<Code> {
        let year = i64::from(date.year());
        let month = i64::from(date.month());
        let week = date.iso_week();

        vec![
            Code::TOTAL,
            Code::new(kind::DAY, year * 10_000 + month * 100 + i64::from(date.day())),
            Code::new(
                kind::WEEK,
                i64::from(week.year()) * 100 + i64::from(week.week()),
            ),
            Code::new(kind::MONTH, year * 100 + month),
            Code::new(kind::YEAR, year),
        ]
    }
}

impl Coder for CalendarCoder {
    fn split(&self, date: NaiveDate, _tasks: &[Task]) -> Split {
        Self::codes(date).into()
    }

    fn describe(&self, code: Code) -> String {
        let v = code.value;
        match code.kind {
            kind::TOTAL => "Sum".to_string(),
            kind::DAY => format!("{:04}-{:02}-{:02}", v / 10_000, v / 100 % 100, v % 100),
            kind::WEEK => format!("{:04}-wk{:02}", v / 100, v % 100),
            kind::MONTH => format!("{:04}-mo{:02}", v / 100, v % 100),
            kind::YEAR => format!("{v:04}"),
            other => format!("unknown code {other}:{v}"),
        }
    }
}

/// Routes entries that reference a declared breakout task into that task's
/// bucket instead of the fallback coder's buckets.
#[derive(Debug, Clone)]
pub struct BreakoutCoder<C = CalendarCoder> {
    fallback: C,
    ordinals: HashMap<String, i64>,
    tasks: HashMap<i64, Task>,
}

impl BreakoutCoder<CalendarCoder> {
    /// Breakout coder falling back to calendar buckets.
    pub fn new(breakout: &[Task]) -> Self {
        Self::with_fallback(CalendarCoder, breakout)
    }
}

impl<C: Coder> BreakoutCoder<C> {
    /// Assigns ordinals `1..` to `breakout` in declaration order.
    ///
    /// Tasks without a reference can never match and are skipped; a
    /// repeated reference keeps its first ordinal.
    pub fn with_fallback(fallback: C, breakout: &[Task]) -> Self {
        let mut ordinals = HashMap::new();
        let mut tasks = HashMap::new();
        let mut next = 1;
        for task in breakout.iter().filter(|t| !t.reference.is_empty()) {
            if ordinals.contains_key(&task.reference) {
                continue;
            }
            ordinals.insert(task.reference.clone(), next);
            tasks.insert(next, task.clone());
            next += 1;
        }
        Self {
            fallback,
            ordinals,
            tasks,
        }
    }

    /// Ordinal assigned to a breakout reference.
    pub fn ordinal(&self, reference: &str) -> Option<i64> {
        self.ordinals.get(reference).copied()
    }
}

impl<C: Coder> Coder for BreakoutCoder<C> {
    fn split(&self, date: NaiveDate, tasks: &[Task]) -> Split {
        let mut chosen: Option<(&str, i64)> = None;
        let mut error = None;

        for task in tasks {
            let Some(ordinal) = self.ordinal(&task.reference) else {
                continue;
            };
            match chosen {
                None => chosen = Some((&task.reference, ordinal)),
                Some((first, existing)) if existing != ordinal && error.is_none() => {
                    tracing::debug!(first, other = %task.reference, "conflicting breakout references");
                    error = Some(CodeError::MultipleBreakouts {
                        first: first.to_string(),
                        other: task.reference.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        match chosen {
            Some((_, ordinal)) => Split {
                codes: vec![Code::TOTAL, Code::new(kind::BREAKOUT, ordinal)],
                error,
            },
            None => self.fallback.split(date, tasks),
        }
    }

    fn describe(&self, code: Code) -> String {
        if code.kind != kind::BREAKOUT {
            return self.fallback.describe(code);
        }
        match self.tasks.get(&code.value) {
            Some(task) if task.description.is_empty() => format!("[{}]", task.reference),
            Some(task) => format!("[{}] {}", task.reference, task.description),
            None => format!("unknown breakout code {}", code.value),
        }
    }
}
