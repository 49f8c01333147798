//! Session logic between `thermolink-serial` and the front-ends (CLI / TUI).
//!
//! - **[`ConnectionManager`]** owns the single connection: `connect()` asks
//!   the host for a transport and opens it, `disconnect()` tears it down on a
//!   best-effort basis and always ends in the "not connected" state.
//! - **[`Session`]** is the actor that runs the read loop. Front-ends drive it
//!   through a [`SessionHandle`] (connect / disconnect / toggle) and stop it
//!   with a `CancellationToken`.
//! - **[`LineBuffer`]** accumulates decoded chunks and yields complete lines.
//! - **[`parse_line`]** turns `temperature,humidity` into a [`Reading`];
//!   malformed lines are dropped quietly.
//! - **[`Presenter`]** is the UI seam: readouts, status, affordance and the
//!   timestamped log.

pub mod config;
pub mod connection;
pub mod error;
pub mod line_buffer;
pub mod model;
pub mod parser;
pub mod presenter;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SessionConfig;
pub use connection::ConnectionManager;
pub use error::CoreError;
pub use line_buffer::LineBuffer;
pub use model::{Affordance, ConnectionState, LogEntry, Reading, StatusKind};
pub use parser::{MalformedLine, parse_line};
pub use presenter::{LogBuffer, Presenter};
pub use session::{Session, SessionCommand, SessionHandle, SessionOutcome};

pub use thermolink_serial::{DEFAULT_BAUD_RATE, TransportConfig};
