//! Unit types for configured durations.
//!
//! Keeps seconds and milliseconds apart in the TOML schema so a timeout can
//! never be read as a poll interval.

use core::time::Duration;

use serde::Deserialize;

/// Duration in seconds (fractional).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Seconds(pub f32);

impl Seconds {
    /// Create a new Seconds value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Convert to a [`Duration`], treating negative or NaN values as zero.
    #[inline]
    pub fn to_duration(self) -> Duration {
        if self.0 > 0.0 {
            Duration::try_from_secs_f32(self.0).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

/// Duration in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Milliseconds(pub u32);

impl Milliseconds {
    /// Create a new Milliseconds value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Convert to a [`Duration`].
    #[inline]
    pub const fn to_duration(self) -> Duration {
        Duration::from_millis(self.0 as u64)
    }
}
