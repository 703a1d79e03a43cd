//! Task annotations embedded in free-text descriptions.
//!
//! A description like `[123] Fixed login. Reviewed docs.` is split on the
//! stop marker into sentence chunks, each optionally led by a bracketed
//! reference.

/// Sentence terminator used to segment descriptions.
pub const STOP: &str = ".";

/// One annotated sentence of a line description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Task {
    /// Bracketed code without the brackets, empty when absent.
    pub reference: String,
    pub description: String,
}

impl Task {
    pub fn new(reference: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            description: description.into(),
        }
    }
}

/// How the trailing stop marker of each task description is normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Append the marker when missing.
    Ensure,
    /// Strip any trailing markers.
    Strip,
    /// Leave the text as written.
    Keep,
}

/// Splits `text` into tasks on `stop`, in order of appearance.
pub fn split_description(text: &str, stop: &str, policy: StopPolicy) -> Vec<Task> {
    if stop.is_empty() {
        return split_segment(text, stop, policy).into_iter().collect();
    }
    text.split_inclusive(stop)
        .filter_map(|segment| split_segment(segment, stop, policy))
        .collect()
}

fn split_segment(segment: &str, stop: &str, policy: StopPolicy) -> Option<Task> {
    let segment = segment.trim();
    if segment.is_empty() {
        return None;
    }

    let (reference, rest) = match segment
        .strip_prefix('[')
        .and_then(|inner| inner.split_once(']'))
    {
        Some((reference, rest)) => (reference.trim(), rest.trim()),
        None => ("", segment),
    };
    let description = if stop.is_empty() || rest.is_empty() {
        rest.to_string()
    } else {
        match policy {
            StopPolicy::Ensure if rest.ends_with(stop) => rest.to_string(),
            StopPolicy::Ensure => format!("{rest}{stop}"),
            StopPolicy::Strip => rest.trim_end_matches(stop).trim_end().to_string(),
            StopPolicy::Keep => rest.to_string(),
        }
    };

    if reference.is_empty() && description.is_empty() {
        return None;
    }
    Some(Task::new(reference, description))
}

/// Sorts, removes duplicates and drops empty strings.
pub fn sort_dedup(mut values: Vec<String>) -> Vec<String> {
    values.retain(|v| !v.is_empty());
    values.sort_unstable();
    values.dedup();
    values
}
