//! Parsing of the lines reported by the firmware.

use fan_firmware::{timer::TimerState, Override, Toggle};
use lazy_static::lazy_static;
use regex::Regex;

/// Periodic status report
#[derive(Debug, PartialEq, Eq)]
pub struct Update {
    pub timestamp: u64,
    pub light_on: bool,
    /// Light threshold in whole lux
    pub threshold: u32,
    pub delayed_start_remaining: u32,
    pub run_remaining: u32,
    pub relay_on: bool,
    pub timer_state: TimerState,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Update(Update),
    Toggle(Toggle),
    Override(Override),
    Relay(bool),
    Threshold(u32),
    ClockJump { from: u64, to: u64 },
    Error(String),
}

fn on_off(value: &str) -> Option<bool> {
    match value {
        "On" => Some(true),
        "Off" => Some(false),
        _ => None,
    }
}

/// Parse a line and return the event it describes
pub fn parse_line(line: &str) -> Option<Event> {
    // Patterns
    lazy_static! {
        static ref UPDATE_RE: Regex = Regex::new(concat!(
            r"^:: (?P<timestamp>[0-9]+) Update \[",
            r"Light=(?P<light>On|Off) Threshold=(?P<threshold>[0-9]+) ",
            r"Delay=(?P<delay>[0-9]+) Run=(?P<run>[0-9]+) Relay=(?P<relay>On|Off) ",
            r"State=(?P<state>[A-Za-z]+)\]$"
        ))
        .unwrap();
        static ref EVENT_RE: Regex =
            Regex::new("^:: (?P<kind>Toggle|Override|Relay|Threshold|Error): (?P<value>.*)$")
                .unwrap();
        static ref CLOCK_JUMP_RE: Regex =
            Regex::new("^:: Clock jump: (?P<from>[0-9]+) -> (?P<to>[0-9]+)$").unwrap();
    }

    // Check for matches
    if let Some(capture) = UPDATE_RE.captures(line) {
        return Some(Event::Update(Update {
            timestamp: capture["timestamp"].parse().ok()?,
            light_on: on_off(&capture["light"])?,
            threshold: capture["threshold"].parse().ok()?,
            delayed_start_remaining: capture["delay"].parse().ok()?,
            run_remaining: capture["run"].parse().ok()?,
            relay_on: on_off(&capture["relay"])?,
            timer_state: TimerState::from_name(&capture["state"])?,
        }));
    }
    if let Some(capture) = EVENT_RE.captures(line) {
        let value = &capture["value"];
        return match &capture["kind"] {
            "Toggle" => Toggle::from_name(value).map(Event::Toggle),
            "Override" => Override::from_name(value).map(Event::Override),
            "Relay" => on_off(value).map(Event::Relay),
            "Threshold" => value.parse().ok().map(Event::Threshold),
            "Error" => Some(Event::Error(value.to_string())),
            _ => None,
        };
    }
    if let Some(capture) = CLOCK_JUMP_RE.captures(line) {
        return Some(Event::ClockJump {
            from: capture["from"].parse().ok()?,
            to: capture["to"].parse().ok()?,
        });
    }

    // No match
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update() {
        assert_eq!(
            parse_line(
                ":: 1700000000 Update [Light=On Threshold=201 Delay=0 Run=1799 Relay=On State=Running]"
            ),
            Some(Event::Update(Update {
                timestamp: 1_700_000_000,
                light_on: true,
                threshold: 201,
                delayed_start_remaining: 0,
                run_remaining: 1799,
                relay_on: true,
                timer_state: TimerState::Running,
            }))
        );
    }

    #[test]
    fn test_parse_events() {
        let cases = [
            (":: Toggle: OnOffOn", Event::Toggle(Toggle::OnOffOn)),
            (":: Toggle: OffOn", Event::Toggle(Toggle::OffOn)),
            (":: Override: ForceOff", Event::Override(Override::ForceOff)),
            (":: Relay: On", Event::Relay(true)),
            (":: Threshold: 52", Event::Threshold(52)),
            (
                ":: Error: RTC: Reading time failed",
                Event::Error("RTC: Reading time failed".to_string()),
            ),
            (
                ":: Clock jump: 1700000100 -> 1700000040",
                Event::ClockJump {
                    from: 1_700_000_100,
                    to: 1_700_000_040,
                },
            ),
        ];
        for (line, event) in cases {
            assert_eq!(parse_line(line), Some(event), "{}", line);
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("Initializing"), None);
        assert_eq!(parse_line(":: Toggle: Sideways"), None);
        assert_eq!(parse_line(":: Relay: Maybe"), None);
        assert_eq!(
            parse_line(":: 17 Update [Light=On Threshold=-1 Delay=0 Run=0 Relay=On State=Idle]"),
            None
        );
        assert_eq!(
            parse_line(":: 17 Update [Light=On Threshold=1 Delay=0 Run=0 Relay=On State=Bored]"),
            None
        );
    }
}
