/// Recurring-event expansion
///
/// Turns a recurring calendar event plus a query window into the concrete
/// occurrences that fall inside the window. Expansion is pure: nothing is
/// persisted, and an occurrence is identified by its parent event id plus
/// its position in the series rather than a synthesized row id.
///
/// # Patterns
///
/// - `daily` / `weekly` / `yearly`: fixed steps of `interval` units from
///   the series start.
/// - `monthly`: calendar-month arithmetic with day-of-month clamping, so a
///   series starting Jan 31 lands on Feb 28 (or 29) rather than skipping
///   February.
/// - `weekdays`: every Monday through Friday; the interval is ignored.
///
/// The event's duration is preserved on every occurrence. A hard cap
/// bounds the output so a one-minute interval over a ten-year window
/// cannot run away.
///
/// # Example
///
/// ```
/// use barq_shared::models::calendar::RecurrencePattern;
/// use barq_shared::recurrence::{expand_series, SeriesSpec};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
/// let spec = SeriesSpec {
///     start,
///     duration: Duration::hours(1),
///     pattern: RecurrencePattern::Daily,
///     interval: 1,
///     series_end: None,
/// };
///
/// let window_end = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
/// let occurrences = expand_series(&spec, start, window_end);
/// assert_eq!(occurrences.len(), 4);
/// ```

use chrono::{DateTime, Datelike, Duration, Months, Utc, Weekday};

use crate::models::calendar::{CalendarEvent, RecurrencePattern};

/// Upper bound on occurrences produced per expansion
pub const MAX_OCCURRENCES: usize = 1000;

/// One concrete occurrence of a recurring series
///
/// Identified by the parent event and the zero-based series position;
/// virtual occurrences never carry ids of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub index: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The recurrence-relevant slice of an event
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    /// First occurrence start
    pub start: DateTime<Utc>,
    /// Occurrence length, applied to every instance
    pub duration: Duration,
    pub pattern: RecurrencePattern,
    /// Every N units; clamped to at least 1
    pub interval: u32,
    /// Last instant (inclusive) an occurrence may start
    pub series_end: Option<DateTime<Utc>>,
}

impl SeriesSpec {
    /// Extracts the series spec from an event, if it is recurring
    pub fn from_event(event: &CalendarEvent) -> Option<Self> {
        if !event.is_recurring {
            return None;
        }
        let pattern = event.recurrence_pattern?;
        Some(SeriesSpec {
            start: event.start_time,
            duration: event.end_time - event.start_time,
            pattern,
            interval: event.recurrence_interval.unwrap_or(1).max(1) as u32,
            series_end: event.recurrence_end,
        })
    }
}

/// Start of the k-th step for the fixed-step patterns
fn nth_start(spec: &SeriesSpec, k: u32) -> Option<DateTime<Utc>> {
    match spec.pattern {
        RecurrencePattern::Daily => spec
            .start
            .checked_add_signed(Duration::days(i64::from(spec.interval) * i64::from(k))),
        RecurrencePattern::Weekly => spec
            .start
            .checked_add_signed(Duration::weeks(i64::from(spec.interval) * i64::from(k))),
        RecurrencePattern::Monthly => spec
            .interval
            .checked_mul(k)
            .and_then(|months| spec.start.checked_add_months(Months::new(months))),
        RecurrencePattern::Yearly => spec
            .interval
            .checked_mul(k)
            .and_then(|years| years.checked_mul(12))
            .and_then(|months| spec.start.checked_add_months(Months::new(months))),
        // Weekdays steps one day at a time; handled by the expansion loop
        RecurrencePattern::Weekdays => spec.start.checked_add_signed(Duration::days(i64::from(k))),
    }
}

fn is_weekend(t: DateTime<Utc>) -> bool {
    matches!(t.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Expands a series into the occurrences overlapping `[window_start, window_end)`
///
/// Occurrence indices count every step of the series from its start, so
/// the same instance keeps the same index regardless of the queried
/// window.
pub fn expand_series(
    spec: &SeriesSpec,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    if window_end <= window_start {
        return occurrences;
    }

    // A zero interval would never advance
    let spec = SeriesSpec {
        interval: spec.interval.max(1),
        ..spec.clone()
    };
    let spec = &spec;

    let mut k: u32 = 0;
    loop {
        let occ_start = match nth_start(spec, k) {
            Some(start) => start,
            None => break,
        };

        if occ_start >= window_end {
            break;
        }
        if let Some(series_end) = spec.series_end {
            if occ_start > series_end {
                break;
            }
        }

        let skip = spec.pattern == RecurrencePattern::Weekdays && is_weekend(occ_start);
        let occ_end = occ_start + spec.duration;

        if !skip && occ_end > window_start {
            occurrences.push(Occurrence {
                index: k,
                start: occ_start,
                end: occ_end,
            });
            if occurrences.len() >= MAX_OCCURRENCES {
                break;
            }
        }

        k = match k.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }

    occurrences
}

/// Expands an event into the occurrences overlapping the window
///
/// Non-recurring events yield their own start/end (index 0) when they
/// overlap; recurring events are expanded per their pattern.
pub fn expand_event(
    event: &CalendarEvent,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<Occurrence> {
    match SeriesSpec::from_event(event) {
        Some(spec) => expand_series(&spec, window_start, window_end),
        None => {
            if event.start_time < window_end && event.end_time > window_start {
                vec![Occurrence {
                    index: 0,
                    start: event.start_time,
                    end: event.end_time,
                }]
            } else {
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn daily_spec(start: DateTime<Utc>, interval: u32) -> SeriesSpec {
        SeriesSpec {
            start,
            duration: Duration::hours(1),
            pattern: RecurrencePattern::Daily,
            interval,
            series_end: None,
        }
    }

    #[test]
    fn test_daily_expansion() {
        let start = at(2025, 1, 1, 9);
        let occurrences = expand_series(&daily_spec(start, 1), start, at(2025, 1, 6, 0));

        assert_eq!(occurrences.len(), 5);
        assert_eq!(occurrences[0].start, at(2025, 1, 1, 9));
        assert_eq!(occurrences[4].start, at(2025, 1, 5, 9));
        assert_eq!(occurrences[0].index, 0);
        assert_eq!(occurrences[4].index, 4);
    }

    #[test]
    fn test_daily_interval_two() {
        let start = at(2025, 1, 1, 9);
        let occurrences = expand_series(&daily_spec(start, 2), start, at(2025, 1, 8, 0));

        let starts: Vec<_> = occurrences.iter().map(|o| o.start).collect();
        assert_eq!(
            starts,
            vec![at(2025, 1, 1, 9), at(2025, 1, 3, 9), at(2025, 1, 5, 9), at(2025, 1, 7, 9)]
        );
    }

    #[test]
    fn test_duration_preserved() {
        let spec = SeriesSpec {
            duration: Duration::minutes(90),
            ..daily_spec(at(2025, 1, 1, 9), 1)
        };
        let occurrences = expand_series(&spec, at(2025, 1, 1, 0), at(2025, 1, 3, 0));

        for occ in occurrences {
            assert_eq!(occ.end - occ.start, Duration::minutes(90));
        }
    }

    #[test]
    fn test_window_clips_before_series_start() {
        // Window entirely before the series: nothing
        let start = at(2025, 6, 1, 9);
        let occurrences = expand_series(&daily_spec(start, 1), at(2025, 1, 1, 0), at(2025, 2, 1, 0));
        assert!(occurrences.is_empty());
    }

    #[test]
    fn test_window_mid_series_keeps_indices() {
        let start = at(2025, 1, 1, 9);
        let occurrences =
            expand_series(&daily_spec(start, 1), at(2025, 1, 4, 0), at(2025, 1, 6, 0));

        assert_eq!(occurrences.len(), 2);
        // Index 3 is Jan 4 regardless of where the window starts
        assert_eq!(occurrences[0].index, 3);
        assert_eq!(occurrences[0].start, at(2025, 1, 4, 9));
    }

    #[test]
    fn test_series_end_bounds_expansion() {
        let mut spec = daily_spec(at(2025, 1, 1, 9), 1);
        spec.series_end = Some(at(2025, 1, 3, 12));

        let occurrences = expand_series(&spec, at(2025, 1, 1, 0), at(2025, 2, 1, 0));
        assert_eq!(occurrences.len(), 3); // Jan 1, 2, 3
        assert_eq!(occurrences.last().unwrap().start, at(2025, 1, 3, 9));
    }

    #[test]
    fn test_weekly_expansion() {
        let spec = SeriesSpec {
            pattern: RecurrencePattern::Weekly,
            ..daily_spec(at(2025, 1, 6, 10), 1)
        };
        let occurrences = expand_series(&spec, at(2025, 1, 1, 0), at(2025, 2, 1, 0));

        let starts: Vec<_> = occurrences.iter().map(|o| o.start).collect();
        assert_eq!(
            starts,
            vec![at(2025, 1, 6, 10), at(2025, 1, 13, 10), at(2025, 1, 20, 10), at(2025, 1, 27, 10)]
        );
    }

    #[test]
    fn test_monthly_clamps_day_of_month() {
        let spec = SeriesSpec {
            pattern: RecurrencePattern::Monthly,
            ..daily_spec(at(2025, 1, 31, 9), 1)
        };
        let occurrences = expand_series(&spec, at(2025, 1, 1, 0), at(2025, 5, 1, 0));

        let starts: Vec<_> = occurrences.iter().map(|o| o.start).collect();
        assert_eq!(
            starts,
            vec![
                at(2025, 1, 31, 9),
                at(2025, 2, 28, 9), // clamped
                at(2025, 3, 31, 9),
                at(2025, 4, 30, 9), // clamped
            ]
        );
    }

    #[test]
    fn test_yearly_expansion() {
        let spec = SeriesSpec {
            pattern: RecurrencePattern::Yearly,
            ..daily_spec(at(2025, 3, 15, 9), 1)
        };
        let occurrences = expand_series(&spec, at(2025, 1, 1, 0), at(2028, 1, 1, 0));

        let starts: Vec<_> = occurrences.iter().map(|o| o.start).collect();
        assert_eq!(
            starts,
            vec![at(2025, 3, 15, 9), at(2026, 3, 15, 9), at(2027, 3, 15, 9)]
        );
    }

    #[test]
    fn test_weekdays_skip_weekends() {
        // 2025-01-03 is a Friday
        let spec = SeriesSpec {
            pattern: RecurrencePattern::Weekdays,
            ..daily_spec(at(2025, 1, 3, 9), 1)
        };
        let occurrences = expand_series(&spec, at(2025, 1, 1, 0), at(2025, 1, 8, 0));

        let starts: Vec<_> = occurrences.iter().map(|o| o.start).collect();
        // Fri 3rd, Mon 6th, Tue 7th; Sat/Sun skipped
        assert_eq!(
            starts,
            vec![at(2025, 1, 3, 9), at(2025, 1, 6, 9), at(2025, 1, 7, 9)]
        );
    }

    #[test]
    fn test_occurrences_never_start_past_window() {
        let start = at(2025, 1, 1, 9);
        let window_end = at(2025, 1, 10, 0);
        let occurrences = expand_series(&daily_spec(start, 1), start, window_end);

        assert!(occurrences.iter().all(|o| o.start < window_end));
    }

    #[test]
    fn test_empty_window() {
        let start = at(2025, 1, 1, 9);
        assert!(expand_series(&daily_spec(start, 1), start, start).is_empty());
    }

    #[test]
    fn test_expansion_is_capped() {
        let spec = daily_spec(at(2000, 1, 1, 0), 1);
        let occurrences = expand_series(&spec, at(2000, 1, 1, 0), at(2100, 1, 1, 0));
        assert_eq!(occurrences.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn test_zero_interval_treated_as_one() {
        let spec = SeriesSpec {
            start: at(2025, 1, 1, 9),
            duration: Duration::hours(1),
            pattern: RecurrencePattern::Daily,
            interval: 0,
            series_end: None,
        };
        let occurrences = expand_series(&spec, at(2025, 1, 1, 0), at(2025, 1, 4, 0));
        assert_eq!(occurrences.len(), 3);
    }
}
