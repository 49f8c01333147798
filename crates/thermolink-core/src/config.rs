// ── Session configuration ──
//
// Everything the connection manager needs, resolved from config file,
// environment, and flags by the front-ends.

use thermolink_serial::TransportConfig;

/// Default number of entries the on-screen log keeps.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Configuration for a [`ConnectionManager`](crate::ConnectionManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Line settings used when opening the port.
    pub transport: TransportConfig,
    /// Maximum log entries kept by a [`LogBuffer`](crate::LogBuffer).
    pub log_capacity: usize,
    /// Append a `Received: ...` log entry for every non-empty line.
    pub echo_lines: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            echo_lines: true,
        }
    }
}
