//! Light switch toggle classification.
//!
//! Every edge is compared against the most recent edge in the opposite
//! direction. If that one happened within the fast toggle window, the user
//! flipped the switch twice on purpose and the edge is treated as an
//! override:
//!
//! | Edge    | Opposite edge | Toggle   | Fan                      |
//! |---------|---------------|----------|--------------------------|
//! | Rising  | recent        | OnOffOn  | run now                  |
//! | Rising  | old           | OffOn    | run after the start delay |
//! | Falling | recent        | OffOnOff | stop now                 |
//! | Falling | old           | OnOff    | run now                  |
//!
//! Only the last rising and the last falling timestamp are remembered, older
//! toggles never influence the result.

use crate::{
    config::Config,
    edge::{Direction, EdgeEvent, Timestamp},
    timer::ActuationTimers,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Light switched back on right after being switched off
    OnOffOn,
    /// Light switched on
    OffOn,
    /// Light switched back off right after being switched on
    OffOnOff,
    /// Light switched off
    OnOff,
}

impl Toggle {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OnOffOn => "OnOffOn",
            Self::OffOn => "OffOn",
            Self::OffOnOff => "OffOnOff",
            Self::OnOff => "OnOff",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "OnOffOn" => Some(Self::OnOffOn),
            "OffOn" => Some(Self::OffOn),
            "OffOnOff" => Some(Self::OffOnOff),
            "OnOff" => Some(Self::OnOff),
            _ => None,
        }
    }

    /// Arm the timers for this toggle and return the relay output.
    pub fn apply(&self, timers: &mut ActuationTimers, config: &Config) -> bool {
        match self {
            Self::OnOffOn | Self::OnOff => {
                timers.start_run(config.run_duration_secs);
                true
            }
            Self::OffOn => {
                timers.start_delay(config.start_delay_secs);
                false
            }
            Self::OffOnOff => {
                timers.clear();
                false
            }
        }
    }
}

/// Manual fan command, bypassing the light switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    ForceOn,
    ForceOff,
}

impl Override {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ForceOn => "ForceOn",
            Self::ForceOff => "ForceOff",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ForceOn" => Some(Self::ForceOn),
            "ForceOff" => Some(Self::ForceOff),
            _ => None,
        }
    }

    /// The toggle with the same effect on the fan.
    pub fn toggle(&self) -> Toggle {
        match self {
            Self::ForceOn => Toggle::OnOffOn,
            Self::ForceOff => Toggle::OffOnOff,
        }
    }
}

/// Classify an edge given the time of the last edge in the other direction.
///
/// The first edge ever seen has no opposite edge and is never fast. Neither
/// is an edge "before" its opposite edge, which happens when the clock was
/// set back in between.
pub fn classify(edge: &EdgeEvent, opposite_at: Option<Timestamp>, fast_toggle_secs: u32) -> Toggle {
    let fast = match opposite_at {
        Some(at) if at <= edge.occurred_at => edge.occurred_at - at <= u64::from(fast_toggle_secs),
        _ => false,
    };
    match (edge.direction, fast) {
        (Direction::Rising, true) => Toggle::OnOffOn,
        (Direction::Rising, false) => Toggle::OffOn,
        (Direction::Falling, true) => Toggle::OffOnOff,
        (Direction::Falling, false) => Toggle::OnOff,
    }
}

/// Time of the last edge in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleHistory {
    last_rising_at: Option<Timestamp>,
    last_falling_at: Option<Timestamp>,
}

impl ToggleHistory {
    pub const fn new() -> Self {
        Self {
            last_rising_at: None,
            last_falling_at: None,
        }
    }

    pub fn last(&self, direction: Direction) -> Option<Timestamp> {
        match direction {
            Direction::Rising => self.last_rising_at,
            Direction::Falling => self.last_falling_at,
        }
    }

    /// Classify the edge, then remember it.
    pub fn record(&mut self, edge: &EdgeEvent, fast_toggle_secs: u32) -> Toggle {
        let toggle = classify(edge, self.last(edge.direction.opposite()), fast_toggle_secs);
        match edge.direction {
            Direction::Rising => self.last_rising_at = Some(edge.occurred_at),
            Direction::Falling => self.last_falling_at = Some(edge.occurred_at),
        }
        toggle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(at: Timestamp) -> EdgeEvent {
        EdgeEvent {
            direction: Direction::Rising,
            occurred_at: at,
        }
    }

    fn falling(at: Timestamp) -> EdgeEvent {
        EdgeEvent {
            direction: Direction::Falling,
            occurred_at: at,
        }
    }

    #[test]
    fn test_first_edge_is_slow() {
        let mut history = ToggleHistory::new();
        assert_eq!(history.record(&rising(0), 2), Toggle::OffOn);

        let mut history = ToggleHistory::new();
        assert_eq!(history.record(&falling(0), 2), Toggle::OnOff);
    }

    #[test]
    fn test_window_boundary() {
        assert_eq!(classify(&rising(12), Some(10), 2), Toggle::OnOffOn);
        assert_eq!(classify(&rising(13), Some(10), 2), Toggle::OffOn);
        assert_eq!(classify(&falling(12), Some(10), 2), Toggle::OffOnOff);
        assert_eq!(classify(&falling(13), Some(10), 2), Toggle::OnOff);
    }

    #[test]
    fn test_clock_set_back() {
        assert_eq!(classify(&rising(5), Some(100), 2), Toggle::OffOn);
        assert_eq!(classify(&falling(5), Some(100), 2), Toggle::OnOff);
    }

    #[test]
    fn test_second_rising_is_fast() {
        let mut history = ToggleHistory::new();
        assert_eq!(history.record(&rising(0), 2), Toggle::OffOn);
        assert_eq!(history.record(&falling(100), 2), Toggle::OnOff);
        assert_eq!(history.record(&rising(101), 2), Toggle::OnOffOn);
        assert_eq!(history.last(Direction::Rising), Some(101));
        assert_eq!(history.last(Direction::Falling), Some(100));
    }

    #[test]
    fn test_only_opposite_edge_counts() {
        let mut history = ToggleHistory::new();
        history.record(&falling(0), 2);
        history.record(&rising(50), 2);
        // Compared against the rising edge at 50, not the falling edge at 0
        assert_eq!(history.record(&falling(51), 2), Toggle::OffOnOff);
        // Compared against the falling edge at 51
        assert_eq!(history.record(&rising(60), 2), Toggle::OffOn);
        assert_eq!(history.record(&falling(61), 2), Toggle::OffOnOff);
    }

    #[test]
    fn test_apply() {
        let config = Config::DEFAULT;
        let mut timers = ActuationTimers::new();

        assert!(!Toggle::OffOn.apply(&mut timers, &config));
        assert_eq!(timers.delayed_start_remaining(), config.start_delay_secs);
        assert_eq!(timers.run_remaining(), 0);

        assert!(Toggle::OnOffOn.apply(&mut timers, &config));
        assert_eq!(timers.delayed_start_remaining(), 0);
        assert_eq!(timers.run_remaining(), config.run_duration_secs);

        assert!(!Toggle::OffOnOff.apply(&mut timers, &config));
        assert_eq!(timers.delayed_start_remaining(), 0);
        assert_eq!(timers.run_remaining(), 0);

        assert!(Toggle::OnOff.apply(&mut timers, &config));
        assert_eq!(timers.delayed_start_remaining(), 0);
        assert_eq!(timers.run_remaining(), config.run_duration_secs);
    }

    #[test]
    fn test_names() {
        for toggle in [Toggle::OnOffOn, Toggle::OffOn, Toggle::OffOnOff, Toggle::OnOff] {
            assert_eq!(Toggle::from_name(toggle.name()), Some(toggle));
        }
        assert_eq!(Toggle::from_name("OnOnOn"), None);
    }

    #[test]
    fn test_override_toggles() {
        assert_eq!(Override::ForceOn.toggle(), Toggle::OnOffOn);
        assert_eq!(Override::ForceOff.toggle(), Toggle::OffOnOff);
        assert_eq!(Override::from_name("ForceOff"), Some(Override::ForceOff));
        assert_eq!(Override::from_name("forceoff"), None);
    }
}
