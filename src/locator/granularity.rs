use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Timelike, Utc};

/// The time unit a dataset partitions its directory tree by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    Hour,
    Month,
    Year,
}

impl Granularity {
    /// Truncate down to the start of the unit containing `time`.
    pub fn truncate(self, time: DateTime<Utc>) -> DateTime<Utc> {
        let (month, day, hour) = match self {
            Granularity::Hour => (time.month(), time.day(), time.hour()),
            Granularity::Month => (time.month(), 1, 0),
            Granularity::Year => (1, 1, 0),
        };

        Utc.with_ymd_and_hms(time.year(), month, day, hour, 0, 0)
            .single()
            .unwrap_or(time)
    }

    /// One unit later, or `None` past the end of representable time.
    pub fn next(self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Granularity::Hour => time.checked_add_signed(Duration::hours(1)),
            Granularity::Month => time.checked_add_months(Months::new(1)),
            Granularity::Year => time
                .with_year(time.year() + 1)
                .or_else(|| time.checked_add_months(Months::new(12))),
        }
    }
}

/**
 * Format one directory path per granularity unit from the unit holding `start` through the unit
 * holding `end`, inclusive, in chronological order.
 *
 * Each path is `prefix + time.format(path_format) + "/"`.
 */
pub(crate) fn walk_paths(
    granularity: Granularity,
    prefix: &str,
    path_format: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<String> {
    let end = granularity.truncate(end);
    let mut current = Some(granularity.truncate(start));
    let mut paths = vec![];

    while let Some(time) = current.filter(|time| *time <= end) {
        paths.push(format!("{}{}/", prefix, time.format(path_format)));
        current = granularity.next(time);
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn same_unit_gives_one_path() {
        let t = utc(2020, 8, 23, 14, 37);
        for gran in [Granularity::Hour, Granularity::Month, Granularity::Year] {
            assert_eq!(walk_paths(gran, "", "%Y/%m/%d/%H", t, t).len(), 1);
        }
    }

    #[test]
    fn hourly_walk_crosses_day_boundary() {
        let paths = walk_paths(
            Granularity::Hour,
            "",
            "%Y/%j/%H",
            utc(2020, 12, 31, 22, 59),
            utc(2021, 1, 1, 1, 0),
        );

        assert_eq!(
            paths,
            vec!["2020/366/22/", "2020/366/23/", "2021/001/00/", "2021/001/01/"]
        );
    }

    #[test]
    fn hourly_walk_counts_units() {
        let start = utc(2020, 8, 1, 0, 0);
        let end = utc(2020, 8, 3, 5, 0);
        let paths = walk_paths(Granularity::Hour, "", "%Y/%j/%H", start, end);

        let expected = (end - start).num_hours() as usize + 1;
        assert_eq!(paths.len(), expected);

        let mut sorted = paths.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, paths);
    }

    #[test]
    fn monthly_walk_wraps_year() {
        let paths = walk_paths(
            Granularity::Month,
            "goes/",
            "%Y/%m",
            utc(2017, 11, 30, 23, 0),
            utc(2018, 2, 1, 0, 0),
        );

        assert_eq!(
            paths,
            vec!["goes/2017/11/", "goes/2017/12/", "goes/2018/01/", "goes/2018/02/"]
        );
    }

    #[test]
    fn yearly_walk_is_inclusive() {
        let paths = walk_paths(
            Granularity::Year,
            "",
            "%Y",
            utc(1970, 8, 23, 0, 0),
            utc(2020, 8, 23, 14, 0),
        );

        assert_eq!(paths.len(), 51);
        assert_eq!(paths.first().map(String::as_str), Some("1970/"));
        assert_eq!(paths.last().map(String::as_str), Some("2020/"));
    }

    #[test]
    fn reversed_range_is_empty() {
        let paths = walk_paths(
            Granularity::Hour,
            "",
            "%Y/%j/%H",
            utc(2020, 1, 1, 5, 0),
            utc(2020, 1, 1, 4, 0),
        );
        assert!(paths.is_empty());
    }

    #[test]
    fn year_step_keeps_month_and_day() {
        let leap = utc(2020, 2, 29, 0, 0);
        assert_eq!(Granularity::Year.next(leap), Some(utc(2021, 2, 28, 0, 0)));
        assert_eq!(
            Granularity::Year.next(utc(2019, 6, 15, 3, 0)),
            Some(utc(2020, 6, 15, 3, 0))
        );
    }
}
