// ── Core error types ──
//
// User-facing errors from thermolink-core. Consumers never see raw
// serial-layer errors; the `From<thermolink_serial::Error>` impl translates
// them into the connection taxonomy.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    /// The host cannot provide serial access at all. Terminal for the session.
    #[error("Serial access unavailable: {reason}")]
    TransportUnavailable { reason: String },

    /// Device selection or opening failed. The user may retry.
    #[error("{}", open_message(.port.as_deref(), .reason))]
    OpenError {
        port: Option<String>,
        reason: String,
    },

    /// The transport failed mid-stream. Triggers full teardown.
    #[error("Read failed: {reason}")]
    ReadError { reason: String },

    #[error("Already connected to {port}")]
    AlreadyConnected { port: String },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Session has stopped")]
    SessionClosed,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn open_message(port: Option<&str>, reason: &str) -> String {
    match port {
        Some(port) => format!("Failed to open {port}: {reason}"),
        None => format!("No device opened: {reason}"),
    }
}

// ── Conversion from serial-layer errors ──────────────────────────────

impl From<thermolink_serial::Error> for CoreError {
    fn from(err: thermolink_serial::Error) -> Self {
        use thermolink_serial::Error as SerialError;

        match err {
            SerialError::Unsupported { reason } => CoreError::TransportUnavailable { reason },
            SerialError::NoPorts | SerialError::NoPortSelected => CoreError::OpenError {
                port: None,
                reason: err.to_string(),
            },
            SerialError::Open { port, source } => CoreError::OpenError {
                port: Some(port),
                reason: source.to_string(),
            },
            SerialError::Io(_) | SerialError::Control(_) | SerialError::Closed => {
                CoreError::ReadError {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermolink_serial::Error as SerialError;

    #[test]
    fn unsupported_maps_to_transport_unavailable() {
        let err = CoreError::from(SerialError::Unsupported {
            reason: "no serial stack".into(),
        });
        assert!(matches!(err, CoreError::TransportUnavailable { .. }));
    }

    #[test]
    fn selection_failures_map_to_open_error() {
        let err = CoreError::from(SerialError::NoPorts);
        assert!(matches!(err, CoreError::OpenError { port: None, .. }));
        assert_eq!(err.to_string(), "No device opened: No serial ports found");
    }

    #[test]
    fn io_maps_to_read_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "device unplugged");
        let err = CoreError::from(SerialError::Io(io));
        assert!(matches!(err, CoreError::ReadError { .. }));
        assert!(err.to_string().contains("device unplugged"));
    }
}
