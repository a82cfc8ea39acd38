//! VEML6030 ambient light sensor.

use embedded_hal::blocking::i2c;
use fan_firmware::{Config, Error, IntensitySample};
use veml6030::{Gain, IntegrationTime, SlaveAddr, Veml6030};

// Quarter gain and 100 ms integration allow readings up to ~30k lux
const VEML_GAIN: Gain = Gain::OneQuarter;
const VEML_INTEGRATION_TIME: IntegrationTime = IntegrationTime::Ms100;

pub struct LightSensor<I2C> {
    veml: Veml6030<I2C>,
}

impl<I2C, E> LightSensor<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    /// Configure and enable the sensor.
    ///
    /// Configuration failures are not fatal, the sensor keeps its power-on
    /// defaults.
    pub fn new(i2c: I2C, errors: &mut impl FnMut(Error)) -> Self {
        let mut veml = Veml6030::new(i2c, SlaveAddr::default());
        if veml.set_gain(VEML_GAIN).is_err() {
            errors(Error::VemlGainSetFailed);
        }
        if veml.set_integration_time(VEML_INTEGRATION_TIME).is_err() {
            errors(Error::VemlIntegrationTimeSetFailed);
        }
        if veml.enable().is_err() {
            errors(Error::VemlEnableFailed);
        }
        Self { veml }
    }

    /// Read one sample. A failed read counts as unreadable.
    pub fn sample(&mut self, config: &Config) -> Result<IntensitySample, Error> {
        let lux = self.veml.read_lux().map_err(|_| Error::VemlReadFailed)?;
        Ok(IntensitySample::from_lux(lux, config))
    }
}
