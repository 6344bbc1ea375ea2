//! Configuration for room sessions.

use std::time::Duration;

/// Configuration for a room session.
///
/// The session does not sleep on its own; whoever hosts it calls
/// [`Session::tick`](crate::Session::tick) at the cadence given here.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often the host should tick while a channel is being
    /// (re-)established. Also the cadence for draining inbound facts.
    pub reconnect_interval: Duration,
}

impl SessionConfig {
    /// Creates the default configuration (1s reconnect poll).
    #[must_use]
    pub fn new() -> Self {
        Self {
            reconnect_interval: Duration::from_secs(1),
        }
    }

    /// Sets the reconnect poll interval.
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.reconnect_interval, Duration::from_secs(1));
    }

    #[test]
    fn builder_overrides() {
        let config = SessionConfig::new().with_reconnect_interval(Duration::from_millis(50));
        assert_eq!(config.reconnect_interval, Duration::from_millis(50));
    }
}
