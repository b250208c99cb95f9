/*! Filename patterns composed from a prefix, a timestamp and a suffix.

Every dataset family names its files as `prefix + timestamp + suffix`, with exactly one capture
group around the timestamp. Implementors of [`FilenameConvention`] supply the three pieces and the
date format; [`FilenameMatcher`] compiles them once and answers both "is this one of ours?" and
"when was it taken?".
*/
use crate::error::{GoesDlError, Result};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

pub trait FilenameConvention {
    fn prefix(&self) -> String;

    /// Must contain exactly one capture group, around the timestamp itself.
    fn timestamp_pattern(&self) -> String;

    fn suffix(&self) -> String;

    fn timestamp_format(&self) -> TimestampFormat;

    fn filename_pattern(&self) -> String {
        format!(
            "{}{}{}",
            self.prefix(),
            self.timestamp_pattern(),
            self.suffix()
        )
    }
}

/// A chrono format string plus a count of trailing fraction-of-second digits.
///
/// Timestamps are always interpreted as UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampFormat {
    format: &'static str,
    fraction_digits: usize,
}

impl TimestampFormat {
    pub const fn new(format: &'static str) -> Self {
        Self {
            format,
            fraction_digits: 0,
        }
    }

    /// The last `digits` digits of a timestamp are a decimal fraction of a second.
    pub const fn with_fraction_digits(mut self, digits: usize) -> Self {
        self.fraction_digits = digits;
        self
    }

    pub fn format(&self) -> &'static str {
        self.format
    }

    pub fn parse(&self, timestamp: &str) -> Result<DateTime<Utc>> {
        let invalid = |reason: &dyn std::fmt::Display| {
            GoesDlError::input(format!(
                "Invalid timestamp '{}' for format '{}': {}",
                timestamp, self.format, reason
            ))
        };

        if !timestamp.is_ascii() || timestamp.len() <= self.fraction_digits {
            return Err(invalid(&"too short"));
        }
        let (whole, fraction) = timestamp.split_at(timestamp.len() - self.fraction_digits);

        // chrono cannot build a time of day without minutes
        let naive = if self.format.contains("%M") {
            NaiveDateTime::parse_from_str(whole, self.format)
        } else {
            NaiveDateTime::parse_from_str(&format!("{}00", whole), &format!("{}%M", self.format))
        }
        .map_err(|err| invalid(&err))?;

        let mut nanos: i64 = 0;
        if !fraction.is_empty() {
            let value: i64 = fraction.parse().map_err(|err| invalid(&err))?;
            let scale = 10_i64.pow(9_u32.saturating_sub(fraction.len() as u32));
            nanos = value * scale;
        }

        Ok(Utc.from_utc_datetime(&naive) + Duration::nanoseconds(nanos))
    }
}

/// Compiled form of a [`FilenameConvention`].
#[derive(Clone, Debug)]
pub struct FilenameMatcher {
    pattern: String,
    exact: Regex,
    search: Regex,
    timestamp_format: TimestampFormat,
}

impl FilenameMatcher {
    pub fn new<C>(convention: &C) -> Result<Self>
    where
        C: FilenameConvention + ?Sized,
    {
        let pattern = convention.filename_pattern();
        let compile = |source: &str| {
            Regex::new(source).map_err(|err| {
                GoesDlError::config(format!("Invalid filename pattern '{}': {}", pattern, err))
            })
        };

        let exact = compile(&format!("^(?:{})$", pattern))?;
        let search = compile(&pattern)?;

        Ok(Self {
            exact,
            search,
            timestamp_format: convention.timestamp_format(),
            pattern,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True iff the whole filename follows the pattern. The embedded date is not validated.
    pub fn matches(&self, filename: &str) -> bool {
        self.exact.is_match(filename)
    }

    pub fn datetime(&self, filename: &str) -> Result<DateTime<Utc>> {
        let mut timestamps = self
            .search
            .captures_iter(filename)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

        match (timestamps.next(), timestamps.count()) {
            (Some(timestamp), 0) => self.timestamp_format.parse(timestamp),
            (None, _) => Err(GoesDlError::input(format!(
                "Expected 1 timestamp field, found 0 fields in '{}'",
                filename
            ))),
            (Some(_), rest) => Err(GoesDlError::input(format!(
                "Expected 1 timestamp field, found {} fields in '{}'",
                rest + 1,
                filename
            ))),
        }
    }
}

/// Regex alternation over the sorted values, e.g. `(?:C08|C13)`. Empty for no values.
pub(crate) fn alternation<S: AsRef<str>>(values: &[S]) -> String {
    if values.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<String> = values
        .iter()
        .map(|v| regex::escape(v.as_ref()))
        .collect();
    sorted.sort();
    format!("(?:{})", sorted.join("|"))
}

fn quoted_sorted<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = values.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejects a value outside `available`, listing the valid ones in sorted order.
pub(crate) fn validate_entity(kind: &str, value: &str, available: &[&str]) -> Result<()> {
    if available.contains(&value) {
        Ok(())
    } else {
        Err(GoesDlError::config(format!(
            "Invalid {kind} ID: '{value}'. Available {kind} IDs: {ids}",
            kind = kind,
            value = value,
            ids = quoted_sorted(available.iter().copied())
        )))
    }
}

/// Like [`validate_entity`], but for a table of typed identifiers.
pub(crate) fn parse_entity<E>(kind: &str, value: &str, available: &[E]) -> Result<E>
where
    E: Copy + Into<&'static str>,
{
    available
        .iter()
        .copied()
        .find(|&entity| {
            let id: &'static str = entity.into();
            id == value
        })
        .ok_or_else(|| {
            GoesDlError::config(format!(
                "Invalid {kind} ID: '{value}'. Available {kind} IDs: {ids}",
                kind = kind,
                value = value,
                ids = quoted_sorted(available.iter().map(|&e| -> &'static str { e.into() }))
            ))
        })
}

/// Rejects any of `values` outside `available`, listing both sets in sorted order.
pub(crate) fn validate_set<S: AsRef<str>>(kind: &str, values: &[S], available: &[&str]) -> Result<()> {
    let invalid: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref())
        .filter(|v| !available.contains(v))
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(GoesDlError::config(format!(
            "Invalid {kind} IDs: {invalid}. Available {kind} IDs: {ids}",
            kind = kind,
            invalid = quoted_sorted(invalid),
            ids = quoted_sorted(available.iter().copied())
        )))
    }
}
