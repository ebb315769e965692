use crate::calc::format::format_date_short;
use chrono::{Days, NaiveDate, NaiveDateTime};

/// Recurrence period applied when none is configured or it is not positive.
pub const DEFAULT_FREQUENCY_DAYS: i64 = 7;

pub const OVERDUE_COLOR: (u8, u8, u8) = (0xdf, 0x4c, 0x1e);
pub const ON_TRACK_COLOR: (u8, u8, u8) = (0x0d, 0xa0, 0x35);

/// Derived view of one tracked entity for a single render. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatetimeState {
    pub last_event_date: NaiveDate,
    pub next_event_date: NaiveDate,
    pub days_since_last_event: i64,
    /// Negative when overdue.
    pub days_until_next_event: i64,
    pub is_overdue: bool,
    /// The period actually used, after defaulting.
    pub frequency_days: i64,
}

/// Returns `frequency_days` when it is positive, otherwise the default of 7.
pub fn effective_frequency(frequency_days: Option<i64>) -> i64 {
    match frequency_days {
        Some(n) if n > 0 => n,
        _ => DEFAULT_FREQUENCY_DAYS,
    }
}

/// Computes the state of an entity from local wall-clock times.
///
/// Both sides are truncated to their calendar day before differencing, so the
/// result changes once per day at local midnight. An absent last event reads
/// as "now". The next event date uses calendar-day addition.
pub fn compute_state(
    now: NaiveDateTime,
    last_event: Option<NaiveDateTime>,
    frequency_days: Option<i64>,
) -> DatetimeState {
    let today = now.date();
    let last_event_date = last_event.map(|dt| dt.date()).unwrap_or(today);
    let frequency_days = effective_frequency(frequency_days);

    let days_since_last_event = (today - last_event_date).num_days();
    let next_event_date = u64::try_from(frequency_days)
        .ok()
        .and_then(|n| last_event_date.checked_add_days(Days::new(n)))
        .unwrap_or(NaiveDate::MAX);
    let days_until_next_event = (next_event_date - today).num_days();

    DatetimeState {
        last_event_date,
        next_event_date,
        days_since_last_event,
        days_until_next_event,
        is_overdue: days_until_next_event < 0,
        frequency_days,
    }
}

/// Progress toward the due date as a percentage, capped at 100.
///
/// Not floored at zero: a last event in the future yields a negative value and
/// callers that draw a bar clamp it themselves.
pub fn progress_percent(days_since_last_event: i64, frequency_days: Option<i64>) -> f64 {
    let frequency = effective_frequency(frequency_days) as f64;
    (100.0 * days_since_last_event as f64 / frequency).min(100.0)
}

fn day_count(n: i64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}

/// One-line status, e.g. `"3 days ago • Due Mar 17 (in 4 days)"`.
pub fn status_text(state: &DatetimeState, today: NaiveDate, show_next_date: bool) -> String {
    let since = match state.days_since_last_event {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{n} days ago"),
    };

    if state.is_overdue {
        let overdue = day_count(state.days_until_next_event.abs());
        return format!("{since} • Overdue by {overdue}");
    }

    let until = match state.days_until_next_event {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    };
    if show_next_date {
        let next = format_date_short(state.next_event_date, today);
        format!("{since} • Due {next} ({until})")
    } else {
        format!("{since} • {until}")
    }
}

/// Bar colour as RGB: red when overdue, green otherwise.
pub fn bar_color(state: &DatetimeState) -> (u8, u8, u8) {
    if state.is_overdue {
        OVERDUE_COLOR
    } else {
        ON_TRACK_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn test_effective_frequency_defaults() {
        assert_eq!(effective_frequency(None), 7);
        assert_eq!(effective_frequency(Some(0)), 7);
        assert_eq!(effective_frequency(Some(-3)), 7);
        assert_eq!(effective_frequency(Some(14)), 14);
    }

    #[test]
    fn test_compute_state_basic() {
        let now = at(d(2025, 3, 10), 9, 0);
        let s = compute_state(now, Some(at(d(2025, 3, 7), 20, 0)), Some(7));
        assert_eq!(s.days_since_last_event, 3);
        assert_eq!(s.next_event_date, d(2025, 3, 14));
        assert_eq!(s.days_until_next_event, 4);
        assert!(!s.is_overdue);
    }

    #[test]
    fn test_compute_state_counts_calendar_days_not_hours() {
        // 23:59 yesterday to 00:01 today is one elapsed day.
        let now = at(d(2025, 3, 10), 0, 1);
        let s = compute_state(now, Some(at(d(2025, 3, 9), 23, 59)), Some(7));
        assert_eq!(s.days_since_last_event, 1);

        // Same calendar day, many hours apart, is zero.
        let now = at(d(2025, 3, 10), 23, 59);
        let s = compute_state(now, Some(at(d(2025, 3, 10), 0, 1)), Some(7));
        assert_eq!(s.days_since_last_event, 0);
    }

    #[test]
    fn test_compute_state_overdue() {
        let now = at(d(2025, 3, 20), 12, 0);
        let s = compute_state(now, Some(at(d(2025, 3, 1), 0, 0)), Some(7));
        assert_eq!(s.days_since_last_event, 19);
        assert_eq!(s.days_until_next_event, -12);
        assert!(s.is_overdue);
    }

    #[test]
    fn test_compute_state_due_today_is_not_overdue() {
        let now = at(d(2025, 3, 8), 12, 0);
        let s = compute_state(now, Some(at(d(2025, 3, 1), 0, 0)), Some(7));
        assert_eq!(s.days_until_next_event, 0);
        assert!(!s.is_overdue);
    }

    #[test]
    fn test_compute_state_absent_last_event_reads_as_now() {
        let now = at(d(2025, 3, 10), 15, 30);
        let s = compute_state(now, None, None);
        assert_eq!(s.last_event_date, d(2025, 3, 10));
        assert_eq!(s.days_since_last_event, 0);
        assert_eq!(s.days_until_next_event, 7);
        assert!(!s.is_overdue);
    }

    #[test]
    fn test_compute_state_non_positive_frequency_defaults() {
        let now = at(d(2025, 3, 10), 0, 0);
        let s = compute_state(now, Some(at(d(2025, 3, 10), 0, 0)), Some(-5));
        assert_eq!(s.frequency_days, 7);
        assert_eq!(s.next_event_date, d(2025, 3, 17));
    }

    #[test]
    fn test_compute_state_crosses_month_and_leap_day() {
        let now = at(d(2024, 3, 1), 8, 0);
        let s = compute_state(now, Some(at(d(2024, 2, 27), 8, 0)), Some(3));
        assert_eq!(s.days_since_last_event, 3);
        assert_eq!(s.next_event_date, d(2024, 3, 1));
        assert_eq!(s.days_until_next_event, 0);
    }

    #[test]
    fn test_consistency_invariant_holds_across_range() {
        let last = at(d(2025, 1, 15), 10, 0);
        for period in [1, 3, 7, 30, 365] {
            for offset in -5..60 {
                let now = at(d(2025, 1, 15), 6, 0) + chrono::Duration::days(offset);
                let s = compute_state(now, Some(last), Some(period));
                assert_eq!(s.days_until_next_event, period - s.days_since_last_event);
                assert_eq!(s.is_overdue, s.days_until_next_event < 0);
            }
        }
    }

    #[test]
    fn test_consistency_invariant_at_longest_accepted_period() {
        use crate::data::card_config::{parse_frequency, MAX_FREQUENCY_DAYS};
        let longest = parse_frequency(&MAX_FREQUENCY_DAYS.to_string()).unwrap();
        for last in [d(1970, 1, 1), d(2025, 3, 7), d(9999, 12, 31)] {
            for now in [d(1970, 1, 1), d(2025, 3, 10), d(9999, 12, 31)] {
                let s = compute_state(at(now, 12, 0), Some(at(last, 0, 0)), Some(longest));
                assert_eq!(s.frequency_days, longest);
                assert_eq!(
                    s.days_until_next_event,
                    s.frequency_days - s.days_since_last_event,
                    "last {last} now {now}"
                );
            }
        }
    }

    #[test]
    fn test_progress_percent_clamps_at_100() {
        assert_eq!(progress_percent(1000, Some(7)), 100.0);
        assert_eq!(progress_percent(7, Some(7)), 100.0);
    }

    #[test]
    fn test_progress_percent_partial_and_defaulted() {
        assert!((progress_percent(3, Some(6)) - 50.0).abs() < f64::EPSILON);
        // Negative period falls back to 7 instead of inverting the bar.
        assert!((progress_percent(7, Some(-7)) - 100.0).abs() < f64::EPSILON);
        assert_eq!(progress_percent(0, None), 0.0);
    }

    #[test]
    fn test_progress_percent_not_floored() {
        assert!(progress_percent(-7, Some(7)) < 0.0);
    }

    #[test]
    fn test_status_text_due_in_days() {
        let today = d(2025, 3, 10);
        let s = compute_state(at(today, 9, 0), Some(at(d(2025, 3, 7), 0, 0)), Some(7));
        assert_eq!(status_text(&s, today, true), "3 days ago • Due Mar 14 (in 4 days)");
        assert_eq!(status_text(&s, today, false), "3 days ago • in 4 days");
    }

    #[test]
    fn test_status_text_today_and_tomorrow() {
        let today = d(2025, 3, 10);
        let s = compute_state(at(today, 9, 0), Some(at(d(2025, 3, 9), 0, 0)), Some(2));
        assert_eq!(status_text(&s, today, true), "1 day ago • Due Mar 11 (tomorrow)");

        let s = compute_state(at(today, 9, 0), Some(at(d(2025, 3, 3), 0, 0)), Some(7));
        assert_eq!(status_text(&s, today, true), "7 days ago • Due Today (today)");

        let s = compute_state(at(today, 9, 0), None, Some(7));
        assert_eq!(status_text(&s, today, true), "today • Due Mar 17 (in 7 days)");
    }

    #[test]
    fn test_status_text_overdue() {
        let today = d(2025, 3, 10);
        let s = compute_state(at(today, 9, 0), Some(at(d(2025, 3, 2), 0, 0)), Some(7));
        assert_eq!(status_text(&s, today, true), "8 days ago • Overdue by 1 day");
        let s = compute_state(at(today, 9, 0), Some(at(d(2025, 2, 1), 0, 0)), Some(7));
        assert_eq!(status_text(&s, today, true), "37 days ago • Overdue by 30 days");
    }

    #[test]
    fn test_bar_color_follows_overdue_flag() {
        let today = d(2025, 3, 10);
        let on_track = compute_state(at(today, 9, 0), None, Some(7));
        let overdue = compute_state(at(today, 9, 0), Some(at(d(2025, 1, 1), 0, 0)), Some(7));
        assert_eq!(bar_color(&on_track), ON_TRACK_COLOR);
        assert_eq!(bar_color(&overdue), OVERDUE_COLOR);
    }
}
