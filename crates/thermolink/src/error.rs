//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use thermolink_config::ConfigError;
use thermolink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const UNAVAILABLE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Serial ───────────────────────────────────────────────────────

    #[error("Serial access is not available on this host")]
    #[diagnostic(
        code(thermolink::transport_unavailable),
        help(
            "{reason}\n\
             The serial subsystem could not be queried. On Linux, check that /dev is mounted\n\
             and that your user can read it."
        )
    )]
    TransportUnavailable { reason: String },

    #[error("No serial ports found")]
    #[diagnostic(
        code(thermolink::no_ports),
        help(
            "Plug in the sensor and try again, or name the port explicitly:\n\
             thermolink --port /dev/ttyACM0 monitor"
        )
    )]
    NoPorts,

    #[error("Could not open {port}")]
    #[diagnostic(
        code(thermolink::open_failed),
        help(
            "{reason}\n\
             Check the sensor is plugged in and no other program (a serial monitor, an IDE)\n\
             holds the port. On Linux your user may need to be in the `dialout` group."
        )
    )]
    OpenFailed { port: String, reason: String },

    #[error("Lost connection to the sensor")]
    #[diagnostic(code(thermolink::read_failed), help("{reason}"))]
    ReadFailed { reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(thermolink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(thermolink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: thermolink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(thermolink::config),
        help("Inspect the file with: thermolink config show")
    )]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TransportUnavailable { .. } => exit_code::UNAVAILABLE,
            Self::NoPorts | Self::OpenFailed { .. } | Self::ReadFailed { .. } => {
                exit_code::CONNECTION
            }
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TransportUnavailable { reason } => Self::TransportUnavailable { reason },

            CoreError::OpenError {
                port: Some(port),
                reason,
            } => Self::OpenFailed { port, reason },

            CoreError::OpenError { port: None, reason } => {
                if reason.contains("No serial ports") {
                    Self::NoPorts
                } else {
                    Self::OpenFailed {
                        port: "(none selected)".into(),
                        reason,
                    }
                }
            }

            CoreError::ReadError { reason } => Self::ReadFailed { reason },

            CoreError::AlreadyConnected { port } => Self::OpenFailed {
                port,
                reason: "already connected".into(),
            },

            CoreError::SessionClosed => Self::ReadFailed {
                reason: "the session stopped unexpectedly".into(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
