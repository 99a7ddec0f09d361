//! Clock module - countdown and one-shot timers driven by `tick`
//!
//! Nothing here reads wall time. Owners feed elapsed milliseconds in and get
//! back what happened during that slice.

use crate::types::COUNTDOWN_STEP_MS;

/// Result of advancing a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Stopped, unlimited, or less than a second accumulated.
    Idle,
    /// One or more seconds elapsed; carries the remaining seconds.
    Ticked(u32),
    /// Reached zero during this slice. Reported once.
    Expired,
}

/// Level countdown in whole seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: Option<u32>,
    accum_ms: u32,
    running: bool,
}

impl Countdown {
    /// A countdown of `limit` seconds. `None` or zero means no time limit.
    pub fn new(limit: Option<u32>) -> Self {
        Self {
            remaining: limit.filter(|&secs| secs > 0),
            accum_ms: 0,
            running: false,
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_limited(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start or resume. No effect without a limit or once expired.
    pub fn start(&mut self) {
        self.running = matches!(self.remaining, Some(secs) if secs > 0);
    }

    /// Halt without losing the remaining time.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn advance(&mut self, elapsed_ms: u32) -> CountdownTick {
        if !self.running {
            return CountdownTick::Idle;
        }
        let Some(mut secs) = self.remaining else {
            return CountdownTick::Idle;
        };

        self.accum_ms = self.accum_ms.saturating_add(elapsed_ms);
        let mut stepped = false;
        while self.accum_ms >= COUNTDOWN_STEP_MS && secs > 0 {
            self.accum_ms -= COUNTDOWN_STEP_MS;
            secs -= 1;
            stepped = true;
        }
        self.remaining = Some(secs);

        if secs == 0 {
            self.running = false;
            self.accum_ms = 0;
            return CountdownTick::Expired;
        }
        if stepped {
            CountdownTick::Ticked(secs)
        } else {
            CountdownTick::Idle
        }
    }
}

/// A timer that fires once after being armed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShot {
    remaining_ms: Option<u32>,
}

impl OneShot {
    pub fn arm(&mut self, delay_ms: u32) {
        self.remaining_ms = Some(delay_ms);
    }

    pub fn cancel(&mut self) {
        self.remaining_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining_ms.is_some()
    }

    /// Returns true on the slice in which the timer fires.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        match self.remaining_ms {
            Some(ms) if ms <= elapsed_ms => {
                self.remaining_ms = None;
                true
            }
            Some(ms) => {
                self.remaining_ms = Some(ms - elapsed_ms);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_steps_once_per_second() {
        let mut clock = Countdown::new(Some(3));
        clock.start();

        assert_eq!(clock.advance(999), CountdownTick::Idle);
        assert_eq!(clock.advance(1), CountdownTick::Ticked(2));
        assert_eq!(clock.advance(1000), CountdownTick::Ticked(1));
        assert_eq!(clock.advance(1000), CountdownTick::Expired);
        assert_eq!(clock.remaining(), Some(0));
        assert!(!clock.is_running());
        assert_eq!(clock.advance(5000), CountdownTick::Idle);
    }

    #[test]
    fn test_countdown_large_slice_expires_once() {
        let mut clock = Countdown::new(Some(2));
        clock.start();
        assert_eq!(clock.advance(10_000), CountdownTick::Expired);
        clock.start();
        assert!(!clock.is_running());
    }

    #[test]
    fn test_stopped_countdown_keeps_remaining_time() {
        let mut clock = Countdown::new(Some(10));
        clock.start();
        clock.advance(2500);
        clock.stop();

        assert_eq!(clock.advance(60_000), CountdownTick::Idle);
        assert_eq!(clock.remaining(), Some(8));

        clock.start();
        // The half second accumulated before the stop still counts.
        assert_eq!(clock.advance(500), CountdownTick::Ticked(7));
    }

    #[test]
    fn test_unlimited_countdown_never_runs() {
        for limit in [None, Some(0)] {
            let mut clock = Countdown::new(limit);
            clock.start();
            assert!(!clock.is_running());
            assert!(!clock.is_limited());
            assert_eq!(clock.advance(100_000), CountdownTick::Idle);
        }
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timer = OneShot::default();
        assert!(!timer.advance(10));

        timer.arm(100);
        assert!(!timer.advance(60));
        assert!(timer.is_armed());
        assert!(timer.advance(40));
        assert!(!timer.is_armed());
        assert!(!timer.advance(1000));

        timer.arm(50);
        timer.cancel();
        assert!(!timer.advance(50));
    }
}
