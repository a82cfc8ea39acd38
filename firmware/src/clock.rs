//! Time keeping for the polling loop.
//!
//! The wall clock is read on every poll. When a read fails the time is
//! estimated by counting polls, so the countdowns keep moving while the
//! clock is unavailable.

use crate::edge::Timestamp;

pub struct PollClock {
    last: Timestamp,
    polls_per_second: u32,
    /// Failed reads since the estimate last moved forward
    missed_polls: u32,
}

impl PollClock {
    pub fn new(now: Timestamp, polls_per_second: u32) -> Self {
        Self {
            last: now,
            polls_per_second: polls_per_second.max(1),
            missed_polls: 0,
        }
    }

    /// Record a successful clock read.
    pub fn read(&mut self, now: Timestamp) -> Timestamp {
        self.last = now;
        self.missed_polls = 0;
        now
    }

    /// Record a failed clock read and return the estimated time.
    ///
    /// The flag is set on the first failed read of every estimated second,
    /// so a persistent failure is reported once per second instead of once
    /// per poll.
    pub fn missed(&mut self) -> (Timestamp, bool) {
        let report = self.missed_polls == 0;
        self.missed_polls += 1;
        if self.missed_polls >= self.polls_per_second {
            self.missed_polls = 0;
            self.last += 1;
        }
        (self.last, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        controller::Controller,
        errors::Error,
        relay::Relay,
        Override,
    };

    struct NullRelay;

    impl Relay for NullRelay {
        fn set(&mut self, _on: bool) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn test_read() {
        let mut clock = PollClock::new(100, 10);
        assert_eq!(clock.read(105), 105);
        assert_eq!(clock.missed(), (105, true));
    }

    #[test]
    fn test_missed_reads_advance_once_per_second() {
        let mut clock = PollClock::new(100, 10);
        let mut reports = 0;
        for _ in 0..9 {
            let (now, report) = clock.missed();
            assert_eq!(now, 100);
            reports += report as u32;
        }
        assert_eq!(clock.missed(), (101, false));
        assert_eq!(reports, 1);

        // Next second is reported again
        assert_eq!(clock.missed(), (101, true));
    }

    #[test]
    fn test_successful_read_resets_estimate() {
        let mut clock = PollClock::new(100, 10);
        for _ in 0..5 {
            clock.missed();
        }
        assert_eq!(clock.read(100), 100);
        for _ in 0..9 {
            assert_eq!(clock.missed().0, 100);
        }
        assert_eq!(clock.missed().0, 101);
    }

    #[test]
    fn test_single_poll_per_second() {
        let mut clock = PollClock::new(0, 0);
        assert_eq!(clock.missed(), (1, true));
        assert_eq!(clock.missed(), (2, true));
    }

    #[test]
    fn test_run_ends_without_clock() {
        let mut controller = Controller::new(Config::DEFAULT, NullRelay, 0);
        let mut clock = PollClock::new(0, 10);
        controller.apply_override(Override::ForceOn);

        let mut reported = 0;
        while controller.status().relay_on {
            let (now, report) = clock.missed();
            if report {
                controller.log_error(Error::RtcReadTimeError);
                reported += 1;
            }
            controller.advance(now);
        }
        assert_eq!(controller.status().run_remaining, 0);
        assert_eq!(reported, 1800);
        assert_eq!(controller.next_error(), Some(Error::RtcReadTimeError));
    }
}
