//! Date period resolution
//!
//! Every date-filtered list offers the same five periods. Resolution is
//! a pure function of the period and the caller's clock; the custom
//! range keeps its own start and end so that picking a new start never
//! erases a previously chosen end.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A concrete date interval sent to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Period token selectable in every date-filtered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Today,
    Week,
    Month,
    Year,
    Custom,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Today,
        Period::Week,
        Period::Month,
        Period::Year,
        Period::Custom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "This week",
            Period::Month => "This month",
            Period::Year => "This year",
            Period::Custom => "Custom range",
        }
    }
}

/// Canonical end of day: 23:59:59.999
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is always a valid time")
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
}

/// Resolve a non-custom period to a concrete interval
///
/// Pure: the same `(period, now)` always yields the same interval. The
/// week starts on the most recent Sunday. `Custom` has no derivable
/// interval here; callers hold it in a [`DateRangeState`].
pub fn resolve(period: Period, now: NaiveDateTime) -> Option<DateRange> {
    let today = now.date();
    let start = match period {
        Period::Today => start_of_day(today),
        Period::Week => {
            let days_since_sunday = today.weekday().num_days_from_sunday() as i64;
            start_of_day(today - Duration::days(days_since_sunday))
        }
        Period::Month => start_of_day(today.with_day(1).expect("day 1 exists in every month")),
        Period::Year => start_of_day(
            NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("Jan 1 exists in every year"),
        ),
        Period::Custom => return None,
    };

    Some(DateRange {
        start,
        end: end_of_day(today),
    })
}

/// Selected period plus the independently editable custom bounds
///
/// Owned by each date-filtered browser view. The custom start and end
/// survive period switches, so toggling away from `Custom` and back
/// restores the previously picked bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeState {
    period: Period,
    custom_start: NaiveDateTime,
    custom_end: NaiveDateTime,
}

impl DateRangeState {
    /// Start with the given clock: period Today, custom bounds covering today
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            period: Period::Today,
            custom_start: start_of_day(now.date()),
            custom_end: end_of_day(now.date()),
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn set_period(&mut self, period: Period) {
        self.period = period;
    }

    /// Update only the custom start; the end is untouched
    pub fn set_custom_start(&mut self, date: NaiveDate) {
        self.custom_start = start_of_day(date);
    }

    /// Update only the custom end; the start is untouched
    pub fn set_custom_end(&mut self, date: NaiveDate) {
        self.custom_end = end_of_day(date);
    }

    /// The effective interval for the current period
    pub fn current(&self, now: NaiveDateTime) -> DateRange {
        match resolve(self.period, now) {
            Some(range) => range,
            None => DateRange {
                start: self.custom_start,
                end: self.custom_end,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn today_spans_the_whole_calendar_day() {
        let now = at(2025, 3, 14, 15, 30);
        let range = resolve(Period::Today, now).unwrap();

        assert_eq!(range.start.date(), now.date());
        assert_eq!(range.start.hour(), 0);
        assert_eq!(range.start.minute(), 0);
        assert_eq!(range.end.date(), now.date());
        assert_eq!(range.end.hour(), 23);
        assert_eq!(range.end.minute(), 59);
        assert_eq!(range.end.second(), 59);
        assert_eq!(range.end.and_utc().timestamp_subsec_millis(), 999);
    }

    #[test]
    fn week_starts_on_the_most_recent_sunday() {
        // 2025-03-14 is a Friday; the preceding Sunday is 2025-03-09
        let now = at(2025, 3, 14, 10, 0);
        let range = resolve(Period::Week, now).unwrap();

        assert_eq!(range.start.date(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(range.start.weekday().num_days_from_sunday(), 0);
        assert!(range.start <= now);
        assert_eq!(range.end.date(), now.date());
    }

    #[test]
    fn week_on_a_sunday_starts_that_same_day() {
        let now = at(2025, 3, 9, 8, 0);
        let range = resolve(Period::Week, now).unwrap();
        assert_eq!(range.start.date(), now.date());
    }

    #[test]
    fn month_starts_on_the_first() {
        let now = at(2025, 3, 14, 10, 0);
        let range = resolve(Period::Month, now).unwrap();
        assert_eq!(range.start.date(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(range.end.date(), now.date());
    }

    #[test]
    fn year_starts_on_january_first() {
        let now = at(2025, 3, 14, 10, 0);
        let range = resolve(Period::Year, now).unwrap();
        assert_eq!(range.start.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn resolution_is_pure() {
        let now = at(2025, 3, 14, 10, 0);
        assert_eq!(resolve(Period::Month, now), resolve(Period::Month, now));
    }

    #[test]
    fn custom_start_and_end_update_independently() {
        let now = at(2025, 3, 14, 10, 0);
        let mut state = DateRangeState::new(now);
        state.set_period(Period::Custom);

        state.set_custom_end(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        state.set_custom_start(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        let range = state.current(now);
        assert_eq!(range.start.date(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        // Choosing a start must not have erased the previously chosen end
        assert_eq!(range.end.date(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(range.end.hour(), 23);
    }

    #[test]
    fn custom_bounds_survive_period_switches() {
        let now = at(2025, 3, 14, 10, 0);
        let mut state = DateRangeState::new(now);
        state.set_period(Period::Custom);
        state.set_custom_start(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());

        state.set_period(Period::Today);
        state.set_period(Period::Custom);

        let range = state.current(now);
        assert_eq!(range.start.date(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }
}
