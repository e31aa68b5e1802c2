use chrono::NaiveDateTime;

/// Remaining time below this renders in the urgent style.
pub const URGENT_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Manual timer: a seconds counter decremented once per tick. Immune to
    /// wall-clock jumps; a missed tick stretches the countdown instead of
    /// skipping ahead.
    Fixed { remaining: i64 },
    /// Scheduled start: recomputed from the wall clock every tick, so sleep
    /// or clock skew cannot drift the end instant.
    Until { target: NaiveDateTime },
}

/// Counts down to zero and fires a completion signal exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    source: Source,
    fired: bool,
}

impl Countdown {
    pub fn fixed(minutes: u32) -> Self {
        Self {
            source: Source::Fixed {
                remaining: i64::from(minutes) * 60,
            },
            fired: false,
        }
    }

    pub fn until(target: NaiveDateTime) -> Self {
        Self {
            source: Source::Until { target },
            fired: false,
        }
    }

    /// Remaining whole seconds, never negative.
    pub fn remaining(&self, now: NaiveDateTime) -> i64 {
        match self.source {
            Source::Fixed { remaining } => remaining.max(0),
            Source::Until { target } => (target - now).num_seconds().max(0),
        }
    }

    /// Advance one 1 Hz tick. Returns the remaining seconds and whether the
    /// completion signal fired on this tick; the signal fires at most once
    /// per countdown.
    pub fn tick(&mut self, now: NaiveDateTime) -> (i64, bool) {
        if let Source::Fixed { remaining } = &mut self.source {
            *remaining = (*remaining - 1).max(0);
        }
        let remaining = self.remaining(now);
        if remaining == 0 && !self.fired {
            self.fired = true;
            return (0, true);
        }
        (remaining, false)
    }

    /// User skip: fire the completion signal immediately. Returns false when
    /// the signal has already fired. The view's ticking keeps running
    /// harmlessly until the view is torn down.
    pub fn skip(&mut self) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn is_urgent(&self, now: NaiveDateTime) -> bool {
        let remaining = self.remaining(now);
        remaining > 0 && remaining < URGENT_SECS
    }
}

/// Render remaining seconds per display band: `Dd Hh Mm` at a day or more,
/// `H:MM:SS` at an hour or more, `M:SS` below that.
pub fn format_remaining(total_secs: i64) -> String {
    let total = total_secs.max(0);
    if total >= 86_400 {
        let days = total / 86_400;
        let hours = (total % 86_400) / 3_600;
        let minutes = (total % 3_600) / 60;
        format!("{days}d {hours}h {minutes}m")
    } else if total >= 3_600 {
        format!(
            "{}:{:02}:{:02}",
            total / 3_600,
            (total % 3_600) / 60,
            total % 60
        )
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 5)
            .expect("date")
            .and_hms_opt(h, m, s)
            .expect("time")
    }

    #[test]
    fn fixed_counts_down_and_completes_once() {
        let mut countdown = Countdown::fixed(1);
        let now = at(18, 0, 0);
        assert_eq!(countdown.remaining(now), 60);

        let mut previous = 60;
        let mut completions = 0;
        for step in 1..=70 {
            let (remaining, completed) = countdown.tick(now + Duration::seconds(step));
            assert!(remaining <= previous, "remaining increased");
            assert!(remaining >= 0, "remaining went negative");
            if completed {
                assert_eq!(remaining, 0, "completed before reaching zero");
                completions += 1;
            }
            previous = remaining;
        }
        assert_eq!(completions, 1);
        // a skip after natural completion must not re-fire either
        assert!(!countdown.skip());
    }

    #[test]
    fn fixed_ignores_wall_clock_jumps() {
        let mut countdown = Countdown::fixed(5);
        // the wall clock leaps an hour; the local counter only loses one tick
        let (remaining, completed) = countdown.tick(at(19, 0, 0));
        assert_eq!(remaining, 299);
        assert!(!completed);
    }

    #[test]
    fn until_tracks_the_target_instant() {
        let mut countdown = Countdown::until(at(18, 0, 0));
        let (remaining, completed) = countdown.tick(at(17, 59, 0));
        assert_eq!(remaining, 60);
        assert!(!completed);

        // system slept for 40 seconds: remaining self-corrects
        let (remaining, completed) = countdown.tick(at(17, 59, 41));
        assert_eq!(remaining, 19);
        assert!(!completed);

        let (remaining, completed) = countdown.tick(at(18, 0, 0));
        assert_eq!(remaining, 0);
        assert!(completed);

        // no second signal after completion
        let (_, completed) = countdown.tick(at(18, 0, 1));
        assert!(!completed);
    }

    #[test]
    fn until_never_reports_negative_after_the_target() {
        let countdown = Countdown::until(at(18, 0, 0));
        assert_eq!(countdown.remaining(at(18, 5, 0)), 0);
    }

    #[test]
    fn skip_fires_exactly_once() {
        let mut countdown = Countdown::fixed(5);
        assert!(countdown.skip());
        assert!(!countdown.skip());
        // ticking afterwards never re-fires
        let (_, completed) = countdown.tick(at(18, 0, 1));
        assert!(!completed);
    }

    #[test]
    fn urgent_only_below_one_minute() {
        let target = at(18, 0, 0);
        let countdown = Countdown::until(target);
        assert!(!countdown.is_urgent(at(17, 59, 0))); // exactly 60
        assert!(countdown.is_urgent(at(17, 59, 1))); // 59
        assert!(countdown.is_urgent(at(17, 59, 59))); // 1
        assert!(!countdown.is_urgent(at(18, 0, 0))); // 0
    }

    #[test]
    fn formatting_bands() {
        assert_eq!(format_remaining(2 * 86_400 + 3 * 3_600 + 4 * 60), "2d 3h 4m");
        assert_eq!(format_remaining(86_400), "1d 0h 0m");
        assert_eq!(format_remaining(86_399), "23:59:59");
        assert_eq!(format_remaining(3_600), "1:00:00");
        assert_eq!(format_remaining(3_599), "59:59");
        assert_eq!(format_remaining(61), "1:01");
        assert_eq!(format_remaining(9), "0:09");
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(-5), "0:00");
    }
}
