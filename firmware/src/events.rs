//! Controller events, collected for whoever reports them.

use heapless::spsc::Queue;

use crate::{
    classifier::{Override, Toggle},
    edge::Timestamp,
    errors::push_dropping_oldest,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The adaptive calibration moved the light threshold
    Threshold(f32),
    /// A light switch edge was classified
    Toggle(Toggle),
    /// A manual override was applied
    Override(Override),
    /// The relay output changed
    Relay(bool),
    /// The clock moved by more than a regular step
    ClockJump { from: Timestamp, to: Timestamp },
}

impl Event {
    pub fn log<const N: usize>(&self, queue: &mut Queue<Self, N>) {
        push_dropping_oldest(queue, *self);
    }
}
