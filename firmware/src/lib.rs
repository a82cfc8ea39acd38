//! Fan controller driven by a light switch.
//!
//! The light is observed through an ambient light sensor. Switching it on
//! starts the fan after a delay, switching it off runs the fan right away.
//! Flipping the switch twice in quick succession forces the fan on or off.
//!
//! The crate is `no_std` so that the same logic runs on the microcontroller
//! and in host unit tests.
#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod controller;
pub mod edge;
pub mod errors;
pub mod events;
pub mod protocol;
pub mod relay;
pub mod timer;

pub use crate::{
    calibration::IntensitySample,
    classifier::{Override, Toggle},
    clock::PollClock,
    config::{CalibrationMode, Config, ConfigError},
    controller::{Controller, Status},
    errors::Error,
    events::Event,
    relay::{GpioRelay, Relay},
};
