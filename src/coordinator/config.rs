// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator configuration.

use std::time::Duration;

use crate::cache::DEFAULT_REFRESH_INTERVAL;
use crate::types::Target;

/// Configuration of a [`Coordinator`](super::Coordinator).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use novastar_h::CoordinatorConfig;
///
/// let config = CoordinatorConfig::new()
///     .with_screen_id(1)
///     .with_poll_interval(Duration::from_secs(10))
///     .with_raw_commands(true);
///
/// assert_eq!(config.target().screen_id, 1);
/// assert!(config.allow_raw_commands());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    target: Target,
    poll_interval: Duration,
    refresh_interval: u32,
    allow_raw_commands: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorConfig {
    /// Default time between polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    /// Shortest accepted poll interval.
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Creates a configuration for device 0, screen 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: Target::default(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            allow_raw_commands: false,
        }
    }

    /// Sets the device id.
    #[must_use]
    pub fn with_device_id(mut self, device_id: i64) -> Self {
        self.target.device_id = device_id;
        self
    }

    /// Sets the screen id.
    #[must_use]
    pub fn with_screen_id(mut self, screen_id: i64) -> Self {
        self.target.screen_id = screen_id;
        self
    }

    /// Sets device and screen together.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Sets the poll interval, raised to [`MIN_POLL_INTERVAL`](Self::MIN_POLL_INTERVAL)
    /// if shorter.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Self::MIN_POLL_INTERVAL);
        self
    }

    /// Sets how many polls pass between periodic detail re-reads.
    ///
    /// Applies to devices built by [`Coordinator::connect`](super::Coordinator::connect).
    /// [`Coordinator::start`](super::Coordinator::start) keeps the interval
    /// of the device it is given.
    #[must_use]
    pub fn with_refresh_interval(mut self, refresh_interval: u32) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Allows [`Coordinator::send_raw`](super::Coordinator::send_raw).
    #[must_use]
    pub fn with_raw_commands(mut self, allow: bool) -> Self {
        self.allow_raw_commands = allow;
        self
    }

    /// The device and screen polled.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Time between polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Polls between periodic detail re-reads.
    #[must_use]
    pub fn refresh_interval(&self) -> u32 {
        self.refresh_interval
    }

    /// Whether raw passthrough is allowed.
    #[must_use]
    pub fn allow_raw_commands(&self) -> bool {
        self.allow_raw_commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.target(), Target::new(0, 0));
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.refresh_interval(), 12);
        assert!(!config.allow_raw_commands());
    }

    #[test]
    fn builder_chain() {
        let config = CoordinatorConfig::new()
            .with_device_id(2)
            .with_screen_id(3)
            .with_refresh_interval(4)
            .with_raw_commands(true);
        assert_eq!(config.target(), Target::new(2, 3));
        assert_eq!(config.refresh_interval(), 4);
        assert!(config.allow_raw_commands());

        let config = config.with_target(Target::new(0, 1));
        assert_eq!(config.target(), Target::new(0, 1));
    }

    #[test]
    fn poll_interval_has_floor() {
        let config = CoordinatorConfig::new().with_poll_interval(Duration::ZERO);
        assert_eq!(config.poll_interval(), CoordinatorConfig::MIN_POLL_INTERVAL);
    }
}
