//! Static controller configuration.

/// How the light threshold is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMode {
    /// Always use the initial threshold
    Fixed,
    /// Derive the threshold from the observed brightness range
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Two opposite toggles within this many seconds count as an override
    pub fast_toggle_secs: u32,
    /// How long the fan runs once started
    pub run_duration_secs: u32,
    /// Grace period after the light was switched on before the fan starts
    pub start_delay_secs: u32,
    /// Lux threshold used until the calibration produces a better one
    pub initial_threshold: f32,
    pub calibration: CalibrationMode,
    /// Minimum brightness range (lux) required to recalibrate
    pub min_spread: f32,
    /// Maximum brightness range (lux) allowed to recalibrate
    pub max_spread: f32,
    /// Lowest lux value the sensor can report
    pub sensor_min: f32,
    /// Highest lux value the sensor can report, anything above is overload
    pub sensor_max: f32,
    /// Larger forward clock steps are treated as a clock correction
    pub max_clock_step_secs: u32,
}

impl Config {
    pub const DEFAULT: Self = Self {
        fast_toggle_secs: 2,
        run_duration_secs: 1800,
        start_delay_secs: 300,
        initial_threshold: 50.0,
        calibration: CalibrationMode::Adaptive,
        min_spread: 20.0,
        max_spread: 5000.0,
        sensor_min: 0.0,
        sensor_max: 120_000.0,
        max_clock_step_secs: 60,
    };

    /// Check the configuration for contradictions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sensor_min < self.sensor_max) {
            return Err(ConfigError::SensorBounds);
        }
        if !(self.initial_threshold > self.sensor_min && self.initial_threshold < self.sensor_max)
        {
            return Err(ConfigError::InitialThreshold);
        }
        if !(self.min_spread > 0.0 && self.min_spread <= self.max_spread) {
            return Err(ConfigError::SpreadGuards);
        }
        if self.run_duration_secs == 0 {
            return Err(ConfigError::RunDuration);
        }
        if self.start_delay_secs == 0 {
            return Err(ConfigError::StartDelay);
        }
        if self.max_clock_step_secs == 0 {
            return Err(ConfigError::ClockStep);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ConfigError {
    SensorBounds,
    InitialThreshold,
    SpreadGuards,
    RunDuration,
    StartDelay,
    ClockStep,
}

impl ConfigError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SensorBounds => "sensor_min must be below sensor_max",
            Self::InitialThreshold => "initial_threshold must lie between the sensor bounds",
            Self::SpreadGuards => "spread guards must satisfy 0 < min_spread <= max_spread",
            Self::RunDuration => "run_duration_secs must not be zero",
            Self::StartDelay => "start_delay_secs must not be zero",
            Self::ClockStep => "max_clock_step_secs must not be zero",
        }
    }
}
