use crate::error::{GoesDlError, Result};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

const OFFSET_DIRECTIVES: &[&str] = &["%z", "%:z", "%#z"];

/// An inclusive, UTC-normalized window of time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(GoesDlError::input(format!(
                "End time {} is before start time {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }

        Ok(Self { start, end })
    }

    /**
     * Parse a user supplied range. `end` defaults to `start` when absent or empty.
     *
     * A `format` with an offset directive converts the timestamps to UTC; one without is read as
     * UTC directly.
     */
    pub fn parse(start: &str, end: Option<&str>, format: &str) -> Result<Self> {
        if start.trim().is_empty() {
            return Err(GoesDlError::input("Start time is required"));
        }

        let start = parse_timestamp(start, format)?;
        let end = match end.filter(|end| !end.trim().is_empty()) {
            Some(end) => parse_timestamp(end, format)?,
            None => start,
        };

        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Pad both ends by `tolerance`. Fails if either end leaves the representable range.
    pub fn widen(&self, tolerance: Duration) -> Result<Self> {
        let start = self.start.checked_sub_signed(tolerance);
        let end = self.end.checked_add_signed(tolerance);

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(GoesDlError::input(format!(
                "Time range {} to {} cannot be padded by {} seconds",
                self.start.to_rfc3339(),
                self.end.to_rfc3339(),
                tolerance.num_seconds()
            ))),
        }
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time <= self.end
    }
}

fn parse_timestamp(value: &str, format: &str) -> Result<DateTime<Utc>> {
    let invalid = |err: chrono::ParseError| {
        GoesDlError::input(format!(
            "Invalid timestamp '{}' for format '{}': {}",
            value, format, err
        ))
    };

    if OFFSET_DIRECTIVES.iter().any(|d| format.contains(d)) {
        DateTime::parse_from_str(value, format)
            .map(|time| time.with_timezone(&Utc))
            .map_err(invalid)
    } else {
        NaiveDateTime::parse_from_str(value, format)
            .map(|time| Utc.from_utc_datetime(&time))
            .map_err(invalid)
    }
}
