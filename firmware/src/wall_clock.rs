//! Wall clock time from the DS3231 real time clock.

use ds323x::{ic, interface::I2cInterface, DateTimeAccess, Ds323x};
use embedded_hal::blocking::i2c;
use fan_firmware::{edge::Timestamp, Error};

pub struct WallClock<I2C> {
    rtc: Ds323x<I2cInterface<I2C>, ic::DS3231>,
}

impl<I2C, E> WallClock<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            rtc: Ds323x::new_ds3231(i2c),
        }
    }

    /// Current unix time in seconds.
    pub fn now(&mut self) -> Result<Timestamp, Error> {
        let datetime = self.rtc.datetime().map_err(|_| Error::RtcReadTimeError)?;
        Timestamp::try_from(datetime.timestamp()).map_err(|_| Error::RtcReadTimeError)
    }
}
