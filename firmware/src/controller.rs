//! The fan controller.
//!
//! Owns all mutable state: calibration, light state, toggle history, timers
//! and the relay. Callers feed it one sample per polling tick and the
//! current wall clock time in seconds. Timers are advanced by the number of
//! whole seconds elapsed since the previous call.

use heapless::spsc::Queue;

use crate::{
    calibration::{Calibration, IntensitySample, Threshold},
    classifier::{Override, Toggle, ToggleHistory},
    config::Config,
    edge::{self, Timestamp},
    errors::Error,
    events::Event,
    relay::Relay,
    timer::{ActuationTimers, TimerState},
};

pub const EVENT_QUEUE_SIZE: usize = 16;
pub const ERROR_QUEUE_SIZE: usize = 8;

/// Snapshot of the controller state for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub threshold: f32,
    pub light_on: bool,
    pub delayed_start_remaining: u32,
    pub run_remaining: u32,
    pub relay_on: bool,
    pub timer_state: TimerState,
}

pub struct Controller<R> {
    config: Config,
    calibration: Calibration,
    /// Light state of the previous poll, `None` before the first one
    light_on: Option<bool>,
    history: ToggleHistory,
    timers: ActuationTimers,
    relay: R,
    relay_on: bool,
    /// Last second the timers were advanced to
    last_second: Timestamp,
    events: Queue<Event, EVENT_QUEUE_SIZE>,
    errors: Queue<Error, ERROR_QUEUE_SIZE>,
}

impl<R: Relay> Controller<R> {
    /// Create a controller and switch the relay off.
    ///
    /// The config is expected to be validated already.
    pub fn new(config: Config, relay: R, now: Timestamp) -> Self {
        let mut controller = Self {
            calibration: Calibration::from_config(&config),
            config,
            light_on: None,
            history: ToggleHistory::new(),
            timers: ActuationTimers::new(),
            relay,
            relay_on: false,
            last_second: now,
            events: Queue::new(),
            errors: Queue::new(),
        };
        controller.set_relay(false);
        controller
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// Process one light sample.
    ///
    /// Returns the toggle if the light state changed. Readings outside of
    /// the sensor bounds count as unreadable.
    pub fn poll(&mut self, sample: IntensitySample, now: Timestamp) -> Option<Toggle> {
        self.advance(now);

        let sample = sample.bounded(&self.config);
        if self.calibration.sample(sample) {
            Event::Threshold(self.calibration.threshold()).log(&mut self.events);
        }
        let light_on = self.calibration.is_light_on(sample);

        // The very first observation has nothing to compare against
        let previous = self.light_on.replace(light_on)?;
        let edge = edge::detect(previous, light_on, now)?;

        let toggle = self.history.record(&edge, self.config.fast_toggle_secs);
        Event::Toggle(toggle).log(&mut self.events);
        self.apply(toggle);
        Some(toggle)
    }

    /// Advance the timers to `now`, one tick per elapsed whole second.
    pub fn advance(&mut self, now: Timestamp) {
        if now < self.last_second {
            Event::ClockJump {
                from: self.last_second,
                to: now,
            }
            .log(&mut self.events);
            self.last_second = now;
            return;
        }

        let mut elapsed = now - self.last_second;
        if elapsed > u64::from(self.config.max_clock_step_secs) {
            Event::ClockJump {
                from: self.last_second,
                to: now,
            }
            .log(&mut self.events);
            elapsed = 1;
        }
        self.last_second = now;

        for _ in 0..elapsed {
            if self.timers.state() == TimerState::Idle {
                break;
            }
            self.tick();
        }
    }

    /// Advance the timers by a single second.
    pub fn tick(&mut self) {
        if let Some(on) = self.timers.tick(self.config.run_duration_secs) {
            self.set_relay(on);
        }
    }

    /// Apply a manual command as if the light switch was double flipped.
    pub fn apply_override(&mut self, command: Override) {
        Event::Override(command).log(&mut self.events);
        self.apply(command.toggle());
    }

    pub fn status(&self) -> Status {
        Status {
            threshold: self.calibration.threshold(),
            light_on: self.light_on.unwrap_or(false),
            delayed_start_remaining: self.timers.delayed_start_remaining(),
            run_remaining: self.timers.run_remaining(),
            relay_on: self.relay_on,
            timer_state: self.timers.state(),
        }
    }

    /// Take the oldest unreported event.
    pub fn next_event(&mut self) -> Option<Event> {
        self.events.dequeue()
    }

    /// Take the oldest unreported error.
    pub fn next_error(&mut self) -> Option<Error> {
        self.errors.dequeue()
    }

    /// Record an error from outside of the controller, e.g. a failed
    /// sensor read.
    pub fn log_error(&mut self, error: Error) {
        error.log(&mut self.errors);
    }

    fn apply(&mut self, toggle: Toggle) {
        let on = toggle.apply(&mut self.timers, &self.config);
        self.set_relay(on);
    }

    fn set_relay(&mut self, on: bool) {
        if let Err(e) = self.relay.set(on) {
            e.log(&mut self.errors);
        }
        if self.relay_on != on {
            self.relay_on = on;
            Event::Relay(on).log(&mut self.events);
        }
    }
}
