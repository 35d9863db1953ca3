//! Month-by-month partitioning of a date range.
//!
//! The RescueTime API caps hourly-granularity queries at one month, so a long
//! export is split into consecutive month-long intervals:
//!
//! - the first interval begins at `start`
//! - each following interval begins one calendar month after the previous one
//!   (clamped to the end of shorter months: Jan 31 → Feb 29 → Mar 29)
//! - each interval ends the day before the next one begins
//! - iteration stops once a begin date reaches `end` (exclusive)
//!
//! The last interval is not truncated to `end`.

use chrono::{Months, NaiveDate};

use crate::domain::DateInterval;

/// Lazy iterator over month-long intervals whose begin dates lie in `[start, end)`.
#[derive(Debug, Clone)]
pub struct MonthRanges {
    next_start: Option<NaiveDate>,
    end: NaiveDate,
}

/// Partition `[start, end)` into consecutive month-long intervals.
///
/// Yields nothing when `start >= end`.
pub fn month_ranges(start: NaiveDate, end: NaiveDate) -> MonthRanges {
    MonthRanges {
        next_start: Some(start),
        end,
    }
}

impl Iterator for MonthRanges {
    type Item = DateInterval;

    fn next(&mut self) -> Option<DateInterval> {
        let start = self.next_start.take()?;
        if start >= self.end {
            return None;
        }

        // Past the last representable month there is no next begin date, and
        // hence no well-defined end for this interval either.
        let following = start.checked_add_months(Months::new(1))?;
        let end = following.pred_opt()?;

        self.next_start = Some(following);
        Some(DateInterval { start, end })
    }
}

impl std::iter::FusedIterator for MonthRanges {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn two_full_months() {
        let got: Vec<_> = month_ranges(d(2021, 1, 1), d(2021, 3, 1)).collect();
        assert_eq!(
            got,
            vec![
                DateInterval { start: d(2021, 1, 1), end: d(2021, 1, 31) },
                DateInterval { start: d(2021, 2, 1), end: d(2021, 2, 28) },
            ]
        );
    }

    #[test]
    fn empty_when_start_not_before_end() {
        assert_eq!(month_ranges(d(2021, 1, 1), d(2021, 1, 1)).count(), 0);
        assert_eq!(month_ranges(d(2021, 5, 1), d(2021, 1, 1)).count(), 0);
    }

    #[test]
    fn end_of_month_clamps_through_leap_february() {
        let got: Vec<_> = month_ranges(d(2020, 1, 31), d(2020, 4, 1)).collect();
        assert_eq!(got[0], DateInterval { start: d(2020, 1, 31), end: d(2020, 2, 28) });
        assert_eq!(got[1].start, d(2020, 2, 29));
        assert_eq!(got[2].start, d(2020, 3, 29));
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn last_interval_is_not_truncated() {
        let got: Vec<_> = month_ranges(d(2021, 1, 15), d(2021, 2, 20)).collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[1], DateInterval { start: d(2021, 2, 15), end: d(2021, 3, 14) });
    }

    #[test]
    fn intervals_are_contiguous_and_bounded() {
        let starts = [d(2019, 1, 1), d(2019, 8, 31), d(2020, 2, 29), d(2016, 4, 17)];
        let ends = [d(2019, 1, 2), d(2020, 3, 1), d(2021, 2, 1), d(2023, 12, 31)];

        for &start in &starts {
            for &end in &ends {
                let got: Vec<_> = month_ranges(start, end).collect();
                if start >= end {
                    assert!(got.is_empty());
                    continue;
                }

                assert_eq!(got[0].start, start);
                for pair in got.windows(2) {
                    assert_eq!(pair[0].end.succ_opt(), Some(pair[1].start));
                }
                for interval in &got {
                    assert!(interval.start <= interval.end);
                    assert!(interval.start < end);
                }

                // One more +1-month step from the final begin must reach `end`.
                let last = got[got.len() - 1];
                let after = last.start.checked_add_months(Months::new(1)).unwrap();
                assert!(after >= end, "{start}..{end}: stopped early at {}", last.start);
            }
        }
    }

    #[test]
    fn stops_at_the_end_of_the_calendar() {
        let got: Vec<_> = month_ranges(NaiveDate::MAX.with_day0(0).unwrap(), NaiveDate::MAX).collect();
        assert!(got.is_empty());
    }
}
