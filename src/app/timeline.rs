//! Hourly time series enumeration
//!
//! Produces the ordered sequence of [`HourStamp`] values covering every hour
//! of an inclusive date range. The sequence is lazy, strictly increasing, and
//! free of gaps and duplicates; a reversed range yields an empty sequence.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use super::models::HourStamp;

/// Lazy iterator over every hour from `start 00:00` through `end 23:00`
#[derive(Debug, Clone)]
pub struct HourRange {
    next: Option<NaiveDateTime>,
    last: NaiveDateTime,
}

impl Iterator for HourRange {
    type Item = HourStamp;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.last {
            Some(current + Duration::hours(1))
        } else {
            None
        };
        Some(HourStamp::new(
            current.year(),
            current.month(),
            current.day(),
            current.hour(),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(next) => ((self.last - next).num_hours() + 1) as usize,
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HourRange {}

/// Enumerate every hour of the inclusive date range `[start, end]`.
///
/// Returns an empty sequence when `start > end`.
pub fn hour_range(start: NaiveDate, end: NaiveDate) -> HourRange {
    let first = start.and_hms_opt(0, 0, 0);
    let last = end.and_hms_opt(23, 0, 0);
    match (first, last) {
        (Some(first), Some(last)) if first <= last => HourRange {
            next: Some(first),
            last,
        },
        (_, Some(last)) => HourRange { next: None, last },
        // and_hms_opt(0/23, 0, 0) is always valid for a NaiveDate
        _ => HourRange {
            next: None,
            last: NaiveDateTime::default(),
        },
    }
}

/// Number of hours in the inclusive date range `[start, end]`
pub fn hour_count(start: NaiveDate, end: NaiveDate) -> usize {
    hour_range(start, end).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_single_day_yields_24_hours() {
        let stamps: Vec<_> = hour_range(date(2020, 1, 1), date(2020, 1, 1)).collect();
        assert_eq!(stamps.len(), 24);
        assert_eq!(stamps[0], HourStamp::new(2020, 1, 1, 0));
        assert_eq!(stamps[23], HourStamp::new(2020, 1, 1, 23));
    }

    #[test]
    fn test_count_matches_day_span() {
        // 2019-08-13 .. 2023-12-31 is the original archive window
        let start = date(2019, 8, 13);
        let end = date(2023, 12, 31);
        let days = (end - start).num_days() as usize + 1;
        assert_eq!(hour_count(start, end), days * 24);
    }

    #[test]
    fn test_strictly_increasing_without_duplicates() {
        let stamps: Vec<_> = hour_range(date(2020, 2, 27), date(2020, 3, 2)).collect();
        // Leap year: Feb 29 must be present
        assert!(stamps.contains(&HourStamp::new(2020, 2, 29, 12)));
        for pair in stamps.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_crosses_year_boundary() {
        let stamps: Vec<_> = hour_range(date(2019, 12, 31), date(2020, 1, 1)).collect();
        assert_eq!(stamps.len(), 48);
        assert_eq!(stamps[23], HourStamp::new(2019, 12, 31, 23));
        assert_eq!(stamps[24], HourStamp::new(2020, 1, 1, 0));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert_eq!(hour_count(date(2021, 1, 1), date(2020, 1, 1)), 0);
        assert!(hour_range(date(2021, 1, 1), date(2020, 1, 1))
            .next()
            .is_none());
    }

    #[test]
    fn test_size_hint_is_exact() {
        let mut range = hour_range(date(2020, 1, 1), date(2020, 1, 2));
        assert_eq!(range.len(), 48);
        range.next();
        assert_eq!(range.len(), 47);
    }
}
