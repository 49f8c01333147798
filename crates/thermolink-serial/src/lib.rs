//! Serial transport layer for thermolink.
//!
//! Everything that touches the operating system's serial stack lives here:
//!
//! - **[`SerialHost`]** hands out transports. It stands in for the user's
//!   device choice and reports [`Error::Unsupported`] when the machine has no
//!   usable serial capability at all.
//! - **[`SerialTransport`]** is one open/read/cancel/close channel. Reads
//!   return decoded text chunks; `Ok(None)` marks end of stream.
//! - **[`NativeHost`]** / **[`NativeTransport`]** implement both on top of
//!   `tokio-serial`.
//! - **[`Utf8ChunkDecoder`]** turns raw byte reads into text without
//!   splitting multi-byte sequences.
//!
//! `thermolink-core` maps these errors into its own taxonomy; front-ends never
//! see this crate's error type directly.

pub mod decoder;
pub mod error;
pub mod native;
pub mod port;
pub mod transport;

pub use decoder::Utf8ChunkDecoder;
pub use error::Error;
pub use native::{NativeHost, NativeTransport, PortSelection};
pub use port::{PortInfo, PortKind, list_ports};
pub use transport::{DEFAULT_BAUD_RATE, SerialHost, SerialTransport, TransportConfig};
