//! Domain types shared by the session and the front-ends.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

/// One `temperature,humidity` sample. Values are kept unrounded; rounding
/// happens only for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
}

impl Reading {
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// Temperature rounded to one decimal place.
    pub fn temperature_display(&self) -> String {
        format!("{:.1}", self.temperature)
    }

    /// Humidity rounded to one decimal place.
    pub fn humidity_display(&self) -> String {
        format!("{:.1}", self.humidity)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} °C, {} %",
            self.temperature_display(),
            self.humidity_display()
        )
    }
}

/// Visual tag attached to the status text. Exactly one is active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Neutral,
    Ok,
    Error,
}

/// State of the connect/disconnect trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affordance {
    /// Idle: the trigger opens a connection.
    #[default]
    Connect,
    /// A connect attempt is in flight; the trigger is disabled.
    Busy,
    /// Connected: the trigger closes the connection.
    Disconnect,
}

impl Affordance {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connect => "Connect to Sensor",
            Self::Busy => "Connecting...",
            Self::Disconnect => "Disconnect",
        }
    }

    pub fn enabled(self) -> bool {
        !matches!(self, Self::Busy)
    }
}

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// One line of the user-facing log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    /// Stamp a message with the current local time.
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }

    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.time_label(), self.message)
    }
}
