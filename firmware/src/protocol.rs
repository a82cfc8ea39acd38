//! Line protocol spoken over the serial port.
//!
//! Outgoing lines start with `::`, e.g.
//!
//! ```text
//! :: 1700000000 Update [Light=On Threshold=201 Delay=0 Run=1799 Relay=On State=Running]
//! :: Toggle: OnOffOn
//! :: Relay: On
//! ```
//!
//! Incoming lines are the commands `force on` and `force off`.

use heapless::Vec;
use ufmt::{uWrite, uwrite};

use crate::{
    classifier::Override,
    controller::Status,
    edge::Timestamp,
    errors::Error,
    events::Event,
};

pub const COMMAND_BUFFER_BYTES: usize = 32;

fn on_off(value: bool) -> &'static str {
    if value {
        "On"
    } else {
        "Off"
    }
}

/// Lux values are reported as whole numbers, ufmt can't do floats.
fn whole_lux(lux: f32) -> u32 {
    lux as u32
}

pub fn write_status<W: uWrite>(w: &mut W, now: Timestamp, status: &Status) -> Result<(), W::Error> {
    uwrite!(
        w,
        ":: {} Update [Light={} Threshold={} Delay={} Run={} Relay={} State={}]\r\n",
        now,
        on_off(status.light_on),
        whole_lux(status.threshold),
        status.delayed_start_remaining,
        status.run_remaining,
        on_off(status.relay_on),
        status.timer_state.name()
    )
}

pub fn write_event<W: uWrite>(w: &mut W, event: &Event) -> Result<(), W::Error> {
    match event {
        Event::Threshold(lux) => uwrite!(w, ":: Threshold: {}\r\n", whole_lux(*lux)),
        Event::Toggle(toggle) => uwrite!(w, ":: Toggle: {}\r\n", toggle.name()),
        Event::Override(command) => uwrite!(w, ":: Override: {}\r\n", command.name()),
        Event::Relay(on) => uwrite!(w, ":: Relay: {}\r\n", on_off(*on)),
        Event::ClockJump { from, to } => uwrite!(w, ":: Clock jump: {} -> {}\r\n", *from, *to),
    }
}

pub fn write_error<W: uWrite>(w: &mut W, error: &Error) -> Result<(), W::Error> {
    uwrite!(w, ":: Error: {}\r\n", error.as_str())
}

impl Override {
    /// The command line that requests this override.
    pub fn command(&self) -> &'static str {
        match self {
            Self::ForceOn => "force on",
            Self::ForceOff => "force off",
        }
    }
}

/// Parse a single command line.
pub fn parse_command(line: &[u8]) -> Option<Override> {
    let line = trim(line);
    [Override::ForceOn, Override::ForceOff]
        .into_iter()
        .find(|command| line.eq_ignore_ascii_case(command.command().as_bytes()))
}

fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}

/// Collects bytes received over serial into command lines.
pub struct CommandReader {
    buffer: Vec<u8, COMMAND_BUFFER_BYTES>,
    /// Set when the current line didn't fit into the buffer
    overflow: bool,
}

impl CommandReader {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflow: false,
        }
    }

    /// Feed one byte. Returns a command once a complete line was received.
    pub fn push(&mut self, byte: u8) -> Option<Override> {
        if byte == b'\n' || byte == b'\r' {
            let command = if self.overflow {
                None
            } else {
                parse_command(&self.buffer)
            };
            self.buffer.clear();
            self.overflow = false;
            return command;
        }
        if self.buffer.push(byte).is_err() {
            self.overflow = true;
        }
        None
    }
}

impl Default for CommandReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use heapless::String;

    use super::*;
    use crate::{classifier::Toggle, timer::TimerState};

    fn status() -> Status {
        Status {
            threshold: 201.7,
            light_on: true,
            delayed_start_remaining: 0,
            run_remaining: 1799,
            relay_on: true,
            timer_state: TimerState::Running,
        }
    }

    #[test]
    fn test_write_status() {
        let mut line: String<128> = String::new();
        write_status(&mut line, 1_700_000_000, &status()).unwrap();
        assert_eq!(
            line.as_str(),
            ":: 1700000000 Update [Light=On Threshold=201 Delay=0 Run=1799 Relay=On State=Running]\r\n"
        );
    }

    #[test]
    fn test_write_events() {
        let cases = [
            (Event::Threshold(52.9), ":: Threshold: 52\r\n"),
            (Event::Toggle(Toggle::OffOnOff), ":: Toggle: OffOnOff\r\n"),
            (Event::Override(Override::ForceOn), ":: Override: ForceOn\r\n"),
            (Event::Relay(false), ":: Relay: Off\r\n"),
            (
                Event::ClockJump { from: 100, to: 40 },
                ":: Clock jump: 100 -> 40\r\n",
            ),
        ];
        for (event, expected) in cases {
            let mut line: String<64> = String::new();
            write_event(&mut line, &event).unwrap();
            assert_eq!(line.as_str(), expected);
        }
    }

    #[test]
    fn test_write_error() {
        let mut line: String<64> = String::new();
        write_error(&mut line, &Error::RtcReadTimeError).unwrap();
        assert_eq!(line.as_str(), ":: Error: RTC: Reading time failed\r\n");
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(b"force on"), Some(Override::ForceOn));
        assert_eq!(parse_command(b"  Force Off \r"), Some(Override::ForceOff));
        assert_eq!(parse_command(b"force"), None);
        assert_eq!(parse_command(b""), None);
    }

    #[test]
    fn test_command_reader() {
        let mut reader = CommandReader::new();
        let mut commands: Vec<Override, 4> = Vec::new();
        for byte in b"force on\r\n\r\nnonsense\nFORCE OFF\n" {
            if let Some(command) = reader.push(*byte) {
                commands.push(command).unwrap();
            }
        }
        assert_eq!(commands.as_slice(), &[Override::ForceOn, Override::ForceOff]);
    }

    #[test]
    fn test_command_reader_overflow() {
        let mut reader = CommandReader::new();
        for _ in 0..COMMAND_BUFFER_BYTES {
            assert_eq!(reader.push(b' '), None);
        }
        for byte in b"force on" {
            assert_eq!(reader.push(*byte), None);
        }
        assert_eq!(reader.push(b'\n'), None);

        // Next line is fine again
        for byte in b"force on" {
            reader.push(*byte);
        }
        assert_eq!(reader.push(b'\n'), Some(Override::ForceOn));
    }
}
