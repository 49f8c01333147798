// ── Connection manager ──
//
// Lifecycle of the single serial connection: request a transport from the
// host, open it, feed its chunks through the line buffer and parser, and
// tear everything down again. The session actor is the only caller, so none
// of this state is shared.

use thermolink_serial::{Error as SerialError, SerialHost, SerialTransport};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::line_buffer::LineBuffer;
use crate::model::{Affordance, ConnectionState, LogEntry, StatusKind};
use crate::parser::parse_line;
use crate::presenter::Presenter;

const STATUS_CONNECTING: &str = "Connecting...";
const STATUS_CONNECTED: &str = "Connected";
const STATUS_NOT_CONNECTED: &str = "Not connected";
const STATUS_UNSUPPORTED: &str = "Serial access not supported on this host";

/// Owns the transport and everything that lives exactly as long as it does.
///
/// Invariant: the read loop runs if and only if `transport` is `Some`.
pub struct ConnectionManager {
    host: Box<dyn SerialHost>,
    config: SessionConfig,
    transport: Option<Box<dyn SerialTransport>>,
    line_buffer: LineBuffer,
    state: watch::Sender<ConnectionState>,
    last_error: Option<CoreError>,
}

impl ConnectionManager {
    /// Create a manager. Does NOT connect; call [`connect()`](Self::connect).
    pub fn new(host: Box<dyn SerialHost>, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            host,
            config,
            transport: None,
            line_buffer: LineBuffer::new(),
            state,
            last_error: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Name of the open port, if any.
    pub fn port_name(&self) -> Option<&str> {
        self.transport.as_deref().map(SerialTransport::port_name)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Subscribe to connection state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Take the most recent connect/read failure, if one happened.
    pub fn take_last_error(&mut self) -> Option<CoreError> {
        self.last_error.take()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Request a transport, open it, and start reading.
    ///
    /// Failures are fully reported through the presenter before the error is
    /// returned; callers only need the return value for exit codes.
    pub async fn connect(&mut self, presenter: &mut dyn Presenter) -> Result<(), CoreError> {
        if let Some(port) = self.port_name() {
            return Err(CoreError::AlreadyConnected {
                port: port.to_owned(),
            });
        }

        self.set_state(ConnectionState::Connecting);
        presenter.set_affordance(Affordance::Busy);
        presenter.set_status(STATUS_CONNECTING, StatusKind::Neutral);

        let mut transport = match self.host.request_port().await {
            Ok(transport) => transport,
            Err(SerialError::Unsupported { reason }) => {
                return Err(self.unavailable(reason, presenter));
            }
            Err(err) => return Err(self.fail(err.into(), presenter).await),
        };

        let baud = self.config.transport.baud_rate;
        if let Err(err) = transport.open(&self.config.transport).await {
            let err = match err {
                SerialError::Open { port, source } => CoreError::OpenError {
                    port: Some(port),
                    reason: source.to_string(),
                },
                other => CoreError::OpenError {
                    port: Some(transport.port_name().to_owned()),
                    reason: other.to_string(),
                },
            };
            // Never opened, so there is nothing to cancel or close.
            drop(transport);
            return Err(self.fail(err, presenter).await);
        }

        info!(port = transport.port_name(), baud, "connected");
        self.transport = Some(transport);
        self.line_buffer.clear();
        self.set_state(ConnectionState::Connected);

        presenter.set_status(STATUS_CONNECTED, StatusKind::Ok);
        presenter.set_affordance(Affordance::Disconnect);
        append_log(presenter, format!("Serial port opened at {baud} baud."));
        Ok(())
    }

    /// Stop reading and release the transport.
    ///
    /// Always ends "not connected". Cancel and close failures are logged and
    /// swallowed so the user can reconnect.
    pub async fn disconnect(&mut self, presenter: &mut dyn Presenter) {
        self.teardown(presenter).await;
        self.set_state(ConnectionState::Disconnected);
    }

    // ── Read path ────────────────────────────────────────────────────

    /// Next chunk from the open transport. Never resolves while
    /// disconnected, so it can sit in a `select!` unconditionally.
    pub(crate) async fn read_chunk(&mut self) -> Result<Option<String>, SerialError> {
        match self.transport.as_mut() {
            Some(transport) => transport.read_chunk().await,
            None => std::future::pending().await,
        }
    }

    /// Apply the outcome of one read: new text, end of stream, or failure.
    pub async fn handle_read(
        &mut self,
        result: Result<Option<String>, SerialError>,
        presenter: &mut dyn Presenter,
    ) {
        match result {
            Ok(Some(chunk)) => {
                self.ingest(&chunk, presenter);
            }
            Ok(None) => {
                info!(port = self.port_name().unwrap_or("-"), "stream ended");
                append_log(presenter, "Stream ended.");
                self.disconnect(presenter).await;
            }
            Err(err) => {
                let err = CoreError::ReadError {
                    reason: err.to_string(),
                };
                self.fail(err, presenter).await;
            }
        }
    }

    /// Feed a decoded chunk through the line buffer and parser. Returns the
    /// number of readings displayed.
    pub fn ingest(&mut self, chunk: &str, presenter: &mut dyn Presenter) -> usize {
        let mut shown = 0;
        for raw in self.line_buffer.push(chunk) {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if self.config.echo_lines {
                append_log(presenter, format!("Received: {line}"));
            }
            match parse_line(line) {
                Ok(reading) => {
                    presenter.show_reading(&reading);
                    shown += 1;
                }
                Err(reason) => debug!(%line, %reason, "discarding malformed line"),
            }
        }
        shown
    }

    // ── Internals ────────────────────────────────────────────────────

    fn unavailable(&mut self, reason: String, presenter: &mut dyn Presenter) -> CoreError {
        let err = CoreError::TransportUnavailable { reason };
        warn!(error = %err, "no serial capability");
        presenter.set_status(STATUS_UNSUPPORTED, StatusKind::Error);
        presenter.set_affordance(Affordance::Connect);
        append_log(presenter, format!("Error: {err}"));
        self.set_state(ConnectionState::Failed);
        self.last_error = Some(err.clone());
        err
    }

    async fn fail(&mut self, err: CoreError, presenter: &mut dyn Presenter) -> CoreError {
        warn!(error = %err, "connection failed");
        append_log(presenter, format!("Error: {err}"));
        self.teardown(presenter).await;
        // Teardown resets the status; put the error back so it stays visible.
        presenter.set_status(&format!("Error: {err}"), StatusKind::Error);
        self.set_state(ConnectionState::Failed);
        self.last_error = Some(err.clone());
        err
    }

    async fn teardown(&mut self, presenter: &mut dyn Presenter) {
        if let Some(mut transport) = self.transport.take() {
            let port = transport.port_name().to_owned();
            if let Err(e) = transport.cancel_read().await {
                warn!(%port, error = %e, "error cancelling read");
            }
            if let Err(e) = transport.close().await {
                warn!(%port, error = %e, "error closing port");
            }
            debug!(%port, "transport released");
        }

        self.line_buffer.clear();
        presenter.set_affordance(Affordance::Connect);
        presenter.set_status(STATUS_NOT_CONNECTED, StatusKind::Neutral);
        append_log(presenter, "Serial port closed.");
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }
}

fn append_log(presenter: &mut dyn Presenter, message: impl Into<String>) {
    presenter.append_log(LogEntry::now(message));
}
