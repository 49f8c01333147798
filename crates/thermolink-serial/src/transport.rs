//! Host and transport seams.
//!
//! The core crate drives a session purely through these two traits, which
//! keeps it testable with scripted transports and free of OS details.

use async_trait::async_trait;

use crate::error::Error;

/// Symbol rate the sensor firmware talks at.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Size of the byte buffer used for each read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 256;

/// Line settings applied when a transport is opened. Framing is always 8N1
/// with no flow control; only the rate is adjustable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub baud_rate: u32,
    pub read_buffer_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Source of transports: the environment's serial capability plus the
/// device selection step.
#[async_trait]
pub trait SerialHost: Send + Sync {
    /// Select a device and return an unopened transport for it.
    ///
    /// Returns [`Error::Unsupported`] when the host has no serial capability.
    async fn request_port(&self) -> Result<Box<dyn SerialTransport>, Error>;
}

/// One serial channel.
///
/// `read_chunk` must be cancel-safe: the session races it against commands
/// in `tokio::select!` and drops it on disconnect.
#[async_trait]
pub trait SerialTransport: Send {
    /// Name of the underlying device (e.g. `/dev/ttyACM0`, `COM3`).
    fn port_name(&self) -> &str;

    /// Open the device with the given line settings.
    async fn open(&mut self, config: &TransportConfig) -> Result<(), Error>;

    /// Next chunk of decoded text. `Ok(None)` signals end of stream.
    async fn read_chunk(&mut self) -> Result<Option<String>, Error>;

    /// Abandon whatever input is in flight.
    async fn cancel_read(&mut self) -> Result<(), Error>;

    /// Release the device.
    async fn close(&mut self) -> Result<(), Error>;
}
