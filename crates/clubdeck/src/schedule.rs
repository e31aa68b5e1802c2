use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::Settings;
use crate::deck::{Deck, SlideWindow};

/// The end-of-window readout appears once this few seconds remain.
pub const WINDOW_WARNING_SECS: i64 = 300;

/// Next occurrence of the configured weekly slot, strictly in the future
/// unless the slot is later today. If today's slot has already passed
/// (or is this very second), rolls to next week.
pub fn next_occurrence(settings: &Settings, now: NaiveDateTime) -> NaiveDateTime {
    let slot = NaiveTime::from_hms_opt(settings.auto_start_hour, settings.auto_start_minute, 0)
        .unwrap_or(NaiveTime::MIN);
    let candidate = now.date().and_time(slot);
    let today = now.weekday().num_days_from_sunday();
    let mut days_until = (settings.auto_start_day + 7 - today) % 7;
    if days_until == 0 && candidate <= now {
        days_until = 7;
    }
    candidate + Duration::days(i64::from(days_until))
}

/// Standby's automatic entry point: once the wall clock is within the
/// configured countdown length of the next occurrence, return that occurrence
/// so the countdown can target it and the show begins exactly on time.
/// A `dismissed` occurrence (the user cancelled its countdown) is skipped.
pub fn auto_start_due(
    settings: &Settings,
    now: NaiveDateTime,
    dismissed: Option<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    let occurrence = next_occurrence(settings, now);
    if dismissed == Some(occurrence) {
        return None;
    }
    let lead = i64::from(settings.countdown_minutes) * 60;
    ((occurrence - now).num_seconds() <= lead).then_some(occurrence)
}

/// Decides when to jump to a scheduled slide, at most once per start minute.
///
/// Remembering the last fired (index, date, minute) tolerates a delayed or
/// dropped tick anywhere inside the minute; an exact second==0 match would
/// silently skip the whole minute on one missed tick.
#[derive(Debug, Default)]
pub struct ScheduleTracker {
    last_fired: Option<(usize, NaiveDate, u32)>,
}

impl ScheduleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluated once per second. Returns the index to jump to, or `None`.
    /// The deck guarantees at most one slide per start minute.
    pub fn check(&mut self, deck: &Deck, now: NaiveDateTime, current: usize) -> Option<usize> {
        let minute_of_day = now.hour() * 60 + now.minute();
        for (index, slide) in deck.slides().iter().enumerate() {
            let Some(window) = &slide.window else {
                continue;
            };
            if window.start_hour != now.hour() || window.start_minute != now.minute() {
                continue;
            }
            let key = (index, now.date(), minute_of_day);
            if self.last_fired == Some(key) {
                return None;
            }
            // Marked even when the slide is already showing, so manual
            // navigation later in the minute is not overridden.
            self.last_fired = Some(key);
            return (index != current).then_some(index);
        }
        None
    }
}

/// Seconds until the end of a slide's window, anchored to `now`'s calendar
/// date (the end never rolls to the next day, even if the hour is numerically
/// earlier). Negative once the end has passed; `None` for open-ended windows.
pub fn window_end_in(window: &SlideWindow, now: NaiveDateTime) -> Option<i64> {
    let hour = window.end_hour?;
    let minute = window.end_minute?;
    let end = now
        .date()
        .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN));
    Some((end - now).num_seconds())
}

/// The urgent "time remaining" readout: present only while the window end is
/// in the future and at most [`WINDOW_WARNING_SECS`] away.
pub fn window_warning(window: &SlideWindow, now: NaiveDateTime) -> Option<i64> {
    let diff = window_end_in(window, now)?;
    (diff > 0 && diff <= WINDOW_WARNING_SECS).then_some(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck;

    // 2026-08-05 is a Wednesday
    fn wednesday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 5)
            .expect("date")
            .and_hms_opt(h, m, s)
            .expect("time")
    }

    fn wednesday_settings() -> Settings {
        Settings {
            auto_start_day: 3,
            auto_start_hour: 18,
            auto_start_minute: 0,
            countdown_minutes: 5,
            ..Settings::default()
        }
    }

    #[test]
    fn occurrence_later_today() {
        let target = next_occurrence(&wednesday_settings(), wednesday(17, 59, 0));
        assert_eq!(target, wednesday(18, 0, 0));
    }

    #[test]
    fn occurrence_already_passed_rolls_a_week() {
        let target = next_occurrence(&wednesday_settings(), wednesday(18, 0, 1));
        assert_eq!(target, wednesday(18, 0, 0) + Duration::days(7));
    }

    #[test]
    fn occurrence_at_the_exact_slot_rolls_a_week() {
        // candidate <= now includes equality
        let target = next_occurrence(&wednesday_settings(), wednesday(18, 0, 0));
        assert_eq!(target, wednesday(18, 0, 0) + Duration::days(7));
    }

    #[test]
    fn occurrence_on_a_different_day() {
        let settings = Settings {
            auto_start_day: 5, // Friday
            ..wednesday_settings()
        };
        let target = next_occurrence(&settings, wednesday(18, 0, 0));
        assert_eq!(target, wednesday(18, 0, 0) + Duration::days(2));
    }

    #[test]
    fn occurrence_is_never_in_the_past() {
        let settings = wednesday_settings();
        for hour in 0..24 {
            for second in [0, 1, 59] {
                let now = wednesday(hour, 30, second);
                assert!(next_occurrence(&settings, now) > now, "past at {now}");
            }
        }
    }

    #[test]
    fn auto_start_waits_for_the_lead_window() {
        let settings = wednesday_settings();
        assert_eq!(auto_start_due(&settings, wednesday(17, 54, 59), None), None);
        assert_eq!(
            auto_start_due(&settings, wednesday(17, 55, 0), None),
            Some(wednesday(18, 0, 0))
        );
        assert_eq!(
            auto_start_due(&settings, wednesday(17, 59, 0), None),
            Some(wednesday(18, 0, 0))
        );
    }

    #[test]
    fn auto_start_skips_a_dismissed_occurrence() {
        let settings = wednesday_settings();
        let occurrence = wednesday(18, 0, 0);
        assert_eq!(
            auto_start_due(&settings, wednesday(17, 59, 0), Some(occurrence)),
            None
        );
        // a different week's occurrence is unaffected
        let next_week = wednesday(17, 59, 0) + Duration::days(7);
        assert_eq!(
            auto_start_due(&settings, next_week, Some(occurrence)),
            Some(occurrence + Duration::days(7))
        );
    }

    #[test]
    fn tracker_fires_exactly_at_the_window_boundary() {
        // adjacent windows: 18:10-18:30 and 18:30-19:00
        let deck = deck::build(&Settings::default()).expect("deck");
        let mut tracker = ScheduleTracker::new();
        // on the Senior Games slide (index 4) just before the boundary
        assert_eq!(tracker.check(&deck, wednesday(18, 29, 59), 4), None);
        assert_eq!(tracker.check(&deck, wednesday(18, 30, 0), 4), Some(5));
        // later ticks in the same minute stay quiet
        assert_eq!(tracker.check(&deck, wednesday(18, 30, 1), 5), None);
        assert_eq!(tracker.check(&deck, wednesday(18, 30, 59), 5), None);
        assert_eq!(tracker.check(&deck, wednesday(18, 31, 0), 5), None);
    }

    #[test]
    fn tracker_survives_a_dropped_zero_second_tick() {
        let deck = deck::build(&Settings::default()).expect("deck");
        let mut tracker = ScheduleTracker::new();
        // the :00 tick never arrived; the :02 tick still fires the jump
        assert_eq!(tracker.check(&deck, wednesday(18, 10, 2), 0), Some(4));
    }

    #[test]
    fn tracker_does_not_override_manual_navigation_within_the_minute() {
        let deck = deck::build(&Settings::default()).expect("deck");
        let mut tracker = ScheduleTracker::new();
        // already on the scheduled slide when its minute starts
        assert_eq!(tracker.check(&deck, wednesday(18, 10, 0), 4), None);
        // the user navigates away at 18:10:30; no re-trigger
        assert_eq!(tracker.check(&deck, wednesday(18, 10, 30), 2), None);
    }

    #[test]
    fn tracker_fires_again_on_a_later_date() {
        let deck = deck::build(&Settings::default()).expect("deck");
        let mut tracker = ScheduleTracker::new();
        assert_eq!(tracker.check(&deck, wednesday(18, 10, 0), 0), Some(4));
        let next_week = wednesday(18, 10, 0) + Duration::days(7);
        assert_eq!(tracker.check(&deck, next_week, 0), Some(4));
    }

    #[test]
    fn window_warning_boundaries() {
        let window = SlideWindow::closed(18, 30, 19, 0);
        // diff = 301: outside
        assert_eq!(window_warning(&window, wednesday(18, 54, 59)), None);
        // diff = 300: inside
        assert_eq!(window_warning(&window, wednesday(18, 55, 0)), Some(300));
        // diff = 1: inside
        assert_eq!(window_warning(&window, wednesday(18, 59, 59)), Some(1));
        // diff = 0: gone
        assert_eq!(window_warning(&window, wednesday(19, 0, 0)), None);
        // past the end: still gone
        assert_eq!(window_warning(&window, wednesday(19, 0, 1)), None);
    }

    #[test]
    fn window_end_stays_on_todays_date() {
        // an end hour numerically earlier than now must not roll to tomorrow
        let window = SlideWindow::closed(23, 0, 1, 0);
        let diff = window_end_in(&window, wednesday(23, 30, 0)).expect("end");
        assert!(diff < 0, "expected a passed end, got {diff}");
    }

    #[test]
    fn open_window_has_no_end() {
        let window = SlideWindow::open(19, 15);
        assert_eq!(window_end_in(&window, wednesday(19, 20, 0)), None);
        assert_eq!(window_warning(&window, wednesday(19, 20, 0)), None);
    }
}
