//! Aggregation of time entries into buckets.

use std::collections::HashMap;

use chrono::Duration;
use num_rational::BigRational;
use thiserror::Error;

use crate::coder::{Code, CodeError, Coder};
use crate::errors::ErrorList;
use crate::rate::{self, round_half_even};
use crate::task::sort_dedup;
use crate::timesheet::Line;

/// Decimal places hours are rounded to before billing.
pub const HOURS_PLACES: u32 = 2;

/// A coding problem attributed to a source line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("sum line {line}: {error}")]
pub struct SumError {
    pub line: usize,
    pub error: CodeError,
}

/// Accumulated totals for one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumLine {
    pub code: Code,
    pub name: String,
    pub duration: Duration,
    /// Set by [`SumLine::compute_hours`].
    pub hours: Option<BigRational>,
    /// Set by [`SumLine::compute_amount`].
    pub amount: Option<BigRational>,
    /// Distinct task references, sorted.
    pub references: Vec<String>,
    /// Distinct task descriptions, sorted.
    pub descriptions: Vec<String>,
}

impl SumLine {
    const fn new(code: Code, name: String) -> Self {
        Self {
            code,
            name,
            duration: Duration::zero(),
            hours: None,
            amount: None,
            references: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    /// Duration as hours, rounded half-to-even to two decimals.
    pub fn compute_hours(&mut self) -> &BigRational {
        let duration = self.duration;
        self.hours
            .get_or_insert_with(|| round_half_even(&rate::hours(duration), HOURS_PLACES))
    }

    /// Exact `rate * hours`, computing hours first when needed.
    pub fn compute_amount(&mut self, rate: &BigRational) -> &BigRational {
        let amount = rate * self.compute_hours();
        self.amount.insert(amount)
    }
}

/// Aggregation output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Buckets ordered by code.
    pub sums: Vec<SumLine>,
    /// Non-fatal coding problems, in line order.
    pub errors: ErrorList<SumError>,
}

/// Groups `lines` into the buckets chosen by `coder`.
///
/// Bucket names come from [`Coder::describe`] when a bucket is first seen.
/// Coding errors are collected and do not stop aggregation.
pub fn summarize<C: Coder + ?Sized>(lines: &[Line], coder: &C) -> Summary {
    let mut buckets: HashMap<Code, SumLine> = HashMap::new();
    let mut errors = ErrorList::new();

    for line in lines {
        let split = coder.split(line.date, &line.tasks);
        if let Some(error) = split.error {
            errors.push(SumError {
                line: line.number,
                error,
            });
        }

        for code in split.codes {
            let sum = buckets
                .entry(code)
                .or_insert_with(|| SumLine::new(code, coder.describe(code)));
            sum.duration += line.duration;
            for task in &line.tasks {
                if !task.description.is_empty() {
                    sum.descriptions.push(task.description.clone());
                }
                if !task.reference.is_empty() {
                    sum.references.push(task.reference.clone());
                }
            }
        }
    }

    let mut sums: Vec<SumLine> = buckets
        .into_values()
        .map(|mut sum| {
            sum.references = sort_dedup(std::mem::take(&mut sum.references));
            sum.descriptions = sort_dedup(std::mem::take(&mut sum.descriptions));
            sum
        })
        .collect();
    sums.sort_by_key(|sum| sum.code);

    tracing::debug!(
        lines = lines.len(),
        buckets = sums.len(),
        errors = errors.len(),
        "summarized timesheet"
    );

    Summary { sums, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::{BreakoutCoder, CalendarCoder, kind};
    use crate::task::Task;
    use crate::timesheet::parse;
    use crate::clock::TimeOfDay;
    use chrono::NaiveDate;
    use num_bigint::BigInt;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn line(number: usize, day: u32, minutes: i64, tasks: Vec<Task>) -> Line {
        let start = TimeOfDay::from_hms(8, 0, 0);
        let stop = TimeOfDay::from_hms(8, u32::try_from(minutes).unwrap(), 0);
        Line {
            number,
            date: NaiveDate::from_ymd_opt(2023, 8, day).unwrap(),
            start,
            stop,
            duration: Duration::minutes(minutes),
            description: String::new(),
            tasks,
        }
    }

    fn find(summary: &Summary, code: Code) -> &SumLine {
        summary
            .sums
            .iter()
            .find(|s| s.code == code)
            .expect("bucket should exist")
    }

    fn total_of_kind(summary: &Summary, k: i32) -> Duration {
        summary
            .sums
            .iter()
            .filter(|s| s.code.kind == k)
            .fold(Duration::zero(), |acc, s| acc + s.duration)
    }

    #[test]
    fn day_buckets_add_up_to_total() {
        let input = "Week\n\
            2023-07-31\t8:00\t12:00\tPlanning.\n\
            2023-08-01\t8:00\t9:15\tReview.\n\
            2023-08-01\t13:00\t17:45\tBuild.\n\
            2023-08-07\t9:00\t10:00\n";
        let parsed = parse(input.as_bytes()).unwrap();
        assert!(parsed.overlaps.is_empty());

        let summary = summarize(&parsed.file.lines, &CalendarCoder);
        assert!(summary.errors.is_empty());
        let total = find(&summary, Code::TOTAL).duration;
        assert_eq!(total, parsed.file.total_duration());
        assert_eq!(total_of_kind(&summary, kind::DAY), total);
        assert_eq!(total_of_kind(&summary, kind::WEEK), total);
        assert_eq!(total_of_kind(&summary, kind::MONTH), total);
        assert_eq!(total_of_kind(&summary, kind::YEAR), total);
    }

    #[test]
    fn buckets_are_sorted_and_named() {
        let lines = [
            line(2, 2, 60, vec![]),
            line(3, 1, 30, vec![]),
        ];
        let summary = summarize(&lines, &CalendarCoder);
        let names: Vec<&str> = summary.sums.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["2023-08-01", "2023-08-02", "2023-wk31", "2023-mo08", "2023", "Sum"]
        );
        let codes: Vec<Code> = summary.sums.iter().map(|s| s.code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
        assert!(
            summary
                .sums
                .iter()
                .all(|s| s.hours.is_none() && s.amount.is_none())
        );
    }

    #[test]
    fn annotations_are_deduplicated_and_sorted() {
        let lines = [
            line(2, 1, 60, vec![Task::new("9", "Zeta."), Task::new("", "Alpha.")]),
            line(3, 1, 60, vec![Task::new("9", "Alpha."), Task::new("1", "")]),
        ];
        let summary = summarize(&lines, &CalendarCoder);
        let day = find(&summary, Code::new(kind::DAY, 2023 * 10_000 + 8 * 100 + 1));
        assert_eq!(day.duration, Duration::hours(2));
        assert_eq!(day.references, ["1", "9"]);
        assert_eq!(day.descriptions, ["Alpha.", "Zeta."]);
    }

    #[test]
    fn breakout_lines_skip_calendar_buckets() {
        let breakout = [Task::new("A", "Alpha"), Task::new("B", "Beta")];
        let coder = BreakoutCoder::new(&breakout);
        let lines = [
            line(2, 1, 60, vec![Task::new("A", "Migrate.")]),
            line(3, 2, 30, vec![Task::new("", "Email.")]),
        ];
        let summary = summarize(&lines, &coder);

        let total = find(&summary, Code::TOTAL);
        assert_eq!(total.duration, Duration::minutes(90));
        let alpha = find(&summary, Code::new(kind::BREAKOUT, 1));
        assert_eq!(alpha.name, "[A] Alpha");
        assert_eq!(alpha.duration, Duration::hours(1));
        assert_eq!(total_of_kind(&summary, kind::DAY), Duration::minutes(30));
        assert!(summary.sums.iter().all(|s| s.code != Code::new(kind::BREAKOUT, 2)));
    }

    #[test]
    fn breakout_conflict_counts_once_and_reports() {
        let breakout = [Task::new("A", "Alpha"), Task::new("B", "Beta")];
        let coder = BreakoutCoder::new(&breakout);
        let lines = [line(
            7,
            1,
            45,
            vec![Task::new("A", "One."), Task::new("B", "Two.")],
        )];
        let summary = summarize(&lines, &coder);

        assert_eq!(find(&summary, Code::TOTAL).duration, Duration::minutes(45));
        let breakout_buckets: Vec<&SumLine> = summary
            .sums
            .iter()
            .filter(|s| s.code.kind == kind::BREAKOUT)
            .collect();
        assert_eq!(breakout_buckets.len(), 1);
        assert_eq!(breakout_buckets[0].code.value, 1);
        assert_eq!(breakout_buckets[0].duration, Duration::minutes(45));

        assert_eq!(summary.errors.len(), 1);
        assert_eq!(
            summary.errors.to_string(),
            "sum line 7: multiple different breakout references on same time line cannot be split: [A] and [B]"
        );
    }

    #[test]
    fn hours_round_half_even() {
        let lines = [line(2, 1, 90, vec![])];
        let mut summary = summarize(&lines, &CalendarCoder);
        let total = summary
            .sums
            .iter_mut()
            .find(|s| s.code == Code::TOTAL)
            .unwrap();
        assert_eq!(total.compute_hours(), &ratio(3, 2));
        assert_eq!(rate::format_fixed(total.hours.as_ref().unwrap(), 2), "1.50");

        // 18 seconds is 0.005h, a tie that goes down to the even 0.00.
        let mut tie = SumLine::new(Code::TOTAL, String::new());
        tie.duration = Duration::seconds(18);
        assert_eq!(tie.compute_hours(), &ratio(0, 1));
        // 54 seconds is 0.015h, a tie that goes up to the even 0.02.
        let mut tie = SumLine::new(Code::TOTAL, String::new());
        tie.duration = Duration::seconds(54);
        assert_eq!(tie.compute_hours(), &ratio(2, 100));
        // 90 seconds is 0.025h, a tie that goes down to the even 0.02.
        let mut tie = SumLine::new(Code::TOTAL, String::new());
        tie.duration = Duration::seconds(90);
        assert_eq!(tie.compute_hours(), &ratio(2, 100));
    }

    #[test]
    fn amount_uses_rounded_hours() {
        let mut sum = SumLine::new(Code::TOTAL, String::new());
        // 20 minutes is 0.3333h, rounded to 0.33h.
        sum.duration = Duration::minutes(20);
        let amount = sum.compute_amount(&ratio(100, 1)).clone();
        assert_eq!(amount, ratio(33, 1));
        assert_eq!(sum.hours, Some(ratio(33, 100)));
        assert_eq!(sum.amount, Some(ratio(33, 1)));
        assert_eq!(rate::format_fixed(&amount, 2), "33.00");
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let summary = summarize(&[], &CalendarCoder);
        assert!(summary.sums.is_empty());
        assert!(summary.errors.is_empty());
    }
}
