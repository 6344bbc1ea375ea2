//! Relay configuration.

use std::time::Duration;

/// Configuration for the relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Interval at which the gateway is asked to emit keep-alive control
    /// signals on freshly opened connections, preventing idle-timeout
    /// teardown.
    pub keep_alive_interval: Duration,
    /// Upper bound on undecodable frames tolerated in one batch before the
    /// connection is closed. `None` tolerates any number, which is the
    /// specified behavior; a bound is an operator safety valve.
    pub max_decode_failures: Option<u32>,
}

impl RelayConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keep_alive_interval: Duration::from_secs(20),
            max_decode_failures: None,
        }
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Bounds undecodable frames per batch.
    #[must_use]
    pub fn with_max_decode_failures(mut self, max: u32) -> Self {
        self.max_decode_failures = Some(max);
        self
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}
