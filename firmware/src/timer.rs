//! Fan countdown timers.
//!
//! Two counters in whole seconds: the delayed start and the run duration.
//! At most one of them is non-zero at any time, every way of arming one
//! clears the other.
//!
//! ```text
//!              start_delay()               delay reaches 0
//!   Idle ─────────────────────► Pending ─────────────────────► Running
//!    ▲                                        start_run()         │
//!    │ ◄──────────────────────────────────────────────────────────┤
//!    │                 run reaches 0 / clear()                     │
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No countdown active, the relay is left alone
    Idle,
    /// Waiting for the delayed start to elapse
    DelayedStartPending,
    /// Fan is running
    Running,
}

impl TimerState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::DelayedStartPending => "Pending",
            Self::Running => "Running",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Idle" => Some(Self::Idle),
            "Pending" => Some(Self::DelayedStartPending),
            "Running" => Some(Self::Running),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuationTimers {
    delayed_start_remaining: u32,
    run_remaining: u32,
}

impl ActuationTimers {
    pub const fn new() -> Self {
        Self {
            delayed_start_remaining: 0,
            run_remaining: 0,
        }
    }

    pub fn delayed_start_remaining(&self) -> u32 {
        self.delayed_start_remaining
    }

    pub fn run_remaining(&self) -> u32 {
        self.run_remaining
    }

    pub fn state(&self) -> TimerState {
        assert!(
            self.delayed_start_remaining == 0 || self.run_remaining == 0,
            "delayed start and run countdown active at the same time"
        );
        if self.run_remaining > 0 {
            TimerState::Running
        } else if self.delayed_start_remaining > 0 {
            TimerState::DelayedStartPending
        } else {
            TimerState::Idle
        }
    }

    /// Start running immediately, cancelling a pending delayed start.
    pub fn start_run(&mut self, run_duration_secs: u32) {
        self.delayed_start_remaining = 0;
        self.run_remaining = run_duration_secs;
    }

    /// Schedule a start, cancelling a running countdown.
    pub fn start_delay(&mut self, start_delay_secs: u32) {
        self.run_remaining = 0;
        self.delayed_start_remaining = start_delay_secs;
    }

    pub fn clear(&mut self) {
        self.delayed_start_remaining = 0;
        self.run_remaining = 0;
    }

    /// Advance by one second.
    ///
    /// Returns the relay output the timers demand, `None` when the relay
    /// should be left as it is.
    pub fn tick(&mut self, run_duration_secs: u32) -> Option<bool> {
        match self.state() {
            TimerState::Running => {
                self.run_remaining -= 1;
                Some(self.run_remaining > 0)
            }
            TimerState::DelayedStartPending => {
                self.delayed_start_remaining -= 1;
                if self.delayed_start_remaining == 0 {
                    self.run_remaining = run_duration_secs;
                    Some(true)
                } else {
                    None
                }
            }
            TimerState::Idle => None,
        }
    }
}
