//! The fan relay.

use embedded_hal::digital::v2::OutputPin;

use crate::errors::Error;

/// A binary fan output.
///
/// Setting the output to the value it already has must be harmless.
pub trait Relay {
    fn set(&mut self, on: bool) -> Result<(), Error>;
}

/// Relay module connected to a GPIO pin.
pub struct GpioRelay<P> {
    pin: P,
    /// Most cheap relay boards switch on when the input is pulled low
    active_low: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }
}

impl<P: OutputPin> Relay for GpioRelay<P> {
    fn set(&mut self, on: bool) -> Result<(), Error> {
        let result = if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| Error::RelayGpioWriteError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockPin {
        high: bool,
        writes: usize,
        broken: bool,
    }

    impl OutputPin for MockPin {
        type Error = ();

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.writes += 1;
            if self.broken {
                return Err(());
            }
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.writes += 1;
            if self.broken {
                return Err(());
            }
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn test_active_high() {
        let mut relay = GpioRelay::new(MockPin::default(), false);
        relay.set(true).unwrap();
        assert!(relay.pin.high);
        relay.set(false).unwrap();
        assert!(!relay.pin.high);
    }

    #[test]
    fn test_active_low() {
        let mut relay = GpioRelay::new(MockPin::default(), true);
        relay.set(true).unwrap();
        assert!(!relay.pin.high);
        relay.set(false).unwrap();
        assert!(relay.pin.high);
    }

    #[test]
    fn test_idempotent() {
        let mut relay = GpioRelay::new(MockPin::default(), false);
        relay.set(true).unwrap();
        relay.set(true).unwrap();
        assert!(relay.pin.high);
        assert_eq!(relay.pin.writes, 2);
    }

    #[test]
    fn test_write_error() {
        let pin = MockPin {
            broken: true,
            ..Default::default()
        };
        let mut relay = GpioRelay::new(pin, false);
        assert!(relay.set(true) == Err(Error::RelayGpioWriteError));
    }
}
