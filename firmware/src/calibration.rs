//! Light threshold calibration.
//!
//! Turns a continuous lux reading into the binary "light on" signal. The
//! threshold either stays fixed or follows the observed brightness range.

use crate::config::{CalibrationMode, Config};

/// One reading from the ambient light sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntensitySample {
    Lux(f32),
    /// Sensor overloaded or could not be read
    Unreadable,
}

impl IntensitySample {
    /// Wrap a raw lux value, treating anything outside of the sensor
    /// bounds (or NaN) as unreadable.
    pub fn from_lux(lux: f32, config: &Config) -> Self {
        if lux.is_nan() || lux < config.sensor_min || lux > config.sensor_max {
            Self::Unreadable
        } else {
            Self::Lux(lux)
        }
    }

    /// Check an already wrapped sample against the sensor bounds.
    pub fn bounded(self, config: &Config) -> Self {
        match self {
            Self::Lux(lux) => Self::from_lux(lux, config),
            Self::Unreadable => Self::Unreadable,
        }
    }

    pub fn lux(&self) -> Option<f32> {
        match self {
            Self::Lux(lux) => Some(*lux),
            Self::Unreadable => None,
        }
    }
}

/// A strategy for deciding when the light is on.
pub trait Threshold {
    /// Feed a readable lux value. Returns whether the threshold changed.
    fn update(&mut self, lux: f32) -> bool;

    /// The current decision threshold in lux.
    fn threshold(&self) -> f32;

    /// Light state for a sample. Unreadable samples count as "off".
    fn is_light_on(&self, sample: IntensitySample) -> bool {
        match sample {
            IntensitySample::Lux(lux) => lux >= self.threshold(),
            IntensitySample::Unreadable => false,
        }
    }
}

/// Threshold that never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedThreshold {
    threshold: f32,
}

impl FixedThreshold {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Threshold for FixedThreshold {
    fn update(&mut self, _lux: f32) -> bool {
        false
    }

    fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Threshold derived from the darkest and brightest readings seen so far.
///
/// The observed range only ever widens. The threshold is placed at two
/// thirds of the range, but only while the range lies within the spread
/// guards: a tiny range is sensor noise, a huge one is an outlier spike.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveThreshold {
    min_observed: f32,
    max_observed: f32,
    threshold: f32,
    min_spread: f32,
    max_spread: f32,
}

impl AdaptiveThreshold {
    pub fn new(initial_threshold: f32, min_spread: f32, max_spread: f32) -> Self {
        Self {
            min_observed: f32::MAX,
            max_observed: 0.0,
            threshold: initial_threshold,
            min_spread,
            max_spread,
        }
    }

    #[cfg(test)]
    fn min_observed(&self) -> f32 {
        self.min_observed
    }

    #[cfg(test)]
    fn max_observed(&self) -> f32 {
        self.max_observed
    }
}

impl Threshold for AdaptiveThreshold {
    fn update(&mut self, lux: f32) -> bool {
        self.min_observed = self.min_observed.min(lux);
        self.max_observed = self.max_observed.max(lux);

        let spread = self.max_observed - self.min_observed;
        if spread < self.min_spread || spread > self.max_spread {
            return false;
        }

        // Bias towards the bright end, stray light keeps the "off" level
        // well above the darkest reading.
        let threshold = self.min_observed + spread * 2.0 / 3.0;
        let changed = threshold != self.threshold;
        self.threshold = threshold;
        changed
    }

    fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// The calibration strategy selected by the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Calibration {
    Fixed(FixedThreshold),
    Adaptive(AdaptiveThreshold),
}

impl Calibration {
    pub fn from_config(config: &Config) -> Self {
        match config.calibration {
            CalibrationMode::Fixed => Self::Fixed(FixedThreshold::new(config.initial_threshold)),
            CalibrationMode::Adaptive => Self::Adaptive(AdaptiveThreshold::new(
                config.initial_threshold,
                config.min_spread,
                config.max_spread,
            )),
        }
    }

    /// Update the calibration with a new sample. Unreadable samples are
    /// ignored.
    pub fn sample(&mut self, sample: IntensitySample) -> bool {
        match sample.lux() {
            Some(lux) => self.update(lux),
            None => false,
        }
    }
}

impl Threshold for Calibration {
    fn update(&mut self, lux: f32) -> bool {
        match self {
            Self::Fixed(fixed) => fixed.update(lux),
            Self::Adaptive(adaptive) => adaptive.update(lux),
        }
    }

    fn threshold(&self) -> f32 {
        match self {
            Self::Fixed(fixed) => fixed.threshold(),
            Self::Adaptive(adaptive) => adaptive.threshold(),
        }
    }
}
