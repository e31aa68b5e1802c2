use chrono::{Local, NaiveDateTime, Timelike};

/// Wall-clock source for the scheduling logic. Abstracted so the state
/// machine can be driven by a scripted clock in tests.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The local system clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 1 Hz pacing for a single view. Each mode owns its own ticker and drops it
/// on exit, so two views never poll the schedule at the same time.
#[derive(Debug, Default)]
pub struct SecondTicker {
    last: Option<NaiveDateTime>,
}

impl SecondTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ticker that treats `now`'s second as already seen, so a view entered
    /// mid-second does not get an extra tick on its first frame.
    pub fn primed(now: NaiveDateTime) -> Self {
        Self {
            last: Some(now.with_nanosecond(0).unwrap_or(now)),
        }
    }

    /// True when the wall-clock second has advanced since the previous call.
    /// Frames arrive faster than 1 Hz; this collapses them to one tick per
    /// second.
    pub fn tick(&mut self, now: NaiveDateTime) -> bool {
        let second = now.with_nanosecond(0).unwrap_or(now);
        if self.last == Some(second) {
            return false;
        }
        self.last = Some(second);
        true
    }
}
