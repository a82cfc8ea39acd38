//! Edge detection on the binary light state.

/// Unix timestamp in whole seconds.
pub type Timestamp = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The light was switched on
    Rising,
    /// The light was switched off
    Falling,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Rising => Self::Falling,
            Self::Falling => Self::Rising,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub direction: Direction,
    pub occurred_at: Timestamp,
}

/// Compare two consecutive light states.
pub fn detect(previous: bool, current: bool, now: Timestamp) -> Option<EdgeEvent> {
    let direction = match (previous, current) {
        (false, true) => Direction::Rising,
        (true, false) => Direction::Falling,
        _ => return None,
    };
    Some(EdgeEvent {
        direction,
        occurred_at: now,
    })
}
