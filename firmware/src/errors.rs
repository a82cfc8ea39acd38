//! Error handling.

use heapless::spsc::Queue;

/// All possible error types
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Error {
    VemlGainSetFailed,
    VemlIntegrationTimeSetFailed,
    VemlEnableFailed,
    VemlReadFailed,
    UfmtSerialWriteError,
    RelayGpioWriteError,
    RtcReadTimeError,
}

impl Error {
    pub fn log<const N: usize>(&self, queue: &mut Queue<Self, N>) {
        push_dropping_oldest(queue, *self);
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VemlGainSetFailed => "VEML6030: Setting gain failed",
            Self::VemlIntegrationTimeSetFailed => "VEML6030: Setting integration time failed",
            Self::VemlEnableFailed => "VEML6030: Enabling failed",
            Self::VemlReadFailed => "VEML6030: Reading lux failed",
            Self::UfmtSerialWriteError => "Write serial log using ufmt failed",
            Self::RelayGpioWriteError => "Relay GPIO write error",
            Self::RtcReadTimeError => "RTC: Reading time failed",
        }
    }
}

/// Enqueue a value. If the queue is full, drop the oldest value first.
pub(crate) fn push_dropping_oldest<T, const N: usize>(queue: &mut Queue<T, N>, value: T) {
    if let Err(value) = queue.enqueue(value) {
        queue.dequeue();
        queue.enqueue(value).ok();
    }
}
