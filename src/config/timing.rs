//! Timing configuration and the immutable settings derived from it.

use core::time::Duration;

use serde::Deserialize;

use super::units::{Milliseconds, Seconds};

/// `[timing]` table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TimingConfig {
    /// Timeout for every blocking write.
    #[serde(default = "default_timeout", rename = "timeout_secs")]
    pub timeout: Seconds,

    /// Pause between polls of the done-moving flags.
    #[serde(default = "default_poll_interval", rename = "poll_interval_ms")]
    pub poll_interval: Milliseconds,

    /// Polls allowed before a deferred move times out.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_timeout() -> Seconds {
    Seconds(100.0)
}

fn default_poll_interval() -> Milliseconds {
    Milliseconds(100)
}

fn default_max_poll_attempts() -> u32 {
    1000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl TimingConfig {
    /// Resolve into runtime settings.
    pub fn settings(&self) -> Settings {
        Settings {
            timeout: self.timeout.to_duration(),
            poll: PollPolicy {
                interval: self.poll_interval.to_duration(),
                max_attempts: self.max_poll_attempts,
            },
        }
    }
}

/// Bounds on the done-flag polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between polls.
    pub interval: Duration,
    /// Attempt count that, once exceeded, ends polling. The first poll always runs.
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Create a poll policy.
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Longest time the loop can spend sleeping.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Immutable timing values handed to each harness call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Timeout for blocking writes.
    pub timeout: Duration,
    /// Deferred-move polling bounds.
    pub poll: PollPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        TimingConfig::default().settings()
    }
}
