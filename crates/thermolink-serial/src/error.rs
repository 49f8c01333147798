use thiserror::Error;

/// Top-level error type for the `thermolink-serial` crate.
///
/// Covers host capability, port selection, open, and stream failures.
/// `thermolink-core` maps these into `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Host ────────────────────────────────────────────────────────
    /// The host cannot provide serial access at all.
    #[error("Serial access is not supported on this host: {reason}")]
    Unsupported { reason: String },

    /// Enumeration worked but there was nothing to pick from.
    #[error("No serial ports found")]
    NoPorts,

    /// The user backed out of port selection.
    #[error("No port selected")]
    NoPortSelected,

    // ── Transport ───────────────────────────────────────────────────
    /// Opening the port failed (busy, permission denied, vanished, ...).
    #[error("Failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// Stream I/O failed mid-session.
    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port control call failed (buffer clear, line settings).
    #[error("Serial port control failed: {0}")]
    Control(String),

    /// Operation on a transport that is not open.
    #[error("Serial port is not open")]
    Closed,
}
