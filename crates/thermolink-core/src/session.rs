// ── Session actor ──
//
// Runs the read loop. The actor owns the connection manager and the
// presenter; front-ends talk to it through a `SessionHandle`. Each turn of
// the loop races shutdown, the next command, and the next chunk, so a
// disconnect always wins over a read that is still pending.

use thermolink_serial::Error as SerialError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::connection::ConnectionManager;
use crate::error::CoreError;
use crate::presenter::Presenter;

const COMMAND_CHANNEL_SIZE: usize = 16;

/// User actions the session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Connect,
    Disconnect,
    /// Connect when idle, disconnect when connected. The single-button UI.
    Toggle,
}

/// Cheaply cloneable control handle for a running [`Session`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<(), CoreError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::SessionClosed)
    }

    /// Non-blocking send for synchronous callers such as UI key handlers.
    pub fn try_send(&self, command: SessionCommand) -> Result<(), CoreError> {
        self.commands
            .try_send(command)
            .map_err(|_| CoreError::SessionClosed)
    }

    pub async fn connect(&self) -> Result<(), CoreError> {
        self.send(SessionCommand::Connect).await
    }

    pub async fn disconnect(&self) -> Result<(), CoreError> {
        self.send(SessionCommand::Disconnect).await
    }

    pub async fn toggle(&self) -> Result<(), CoreError> {
        self.send(SessionCommand::Toggle).await
    }

    /// Disconnect and stop the session.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// What a finished session hands back.
pub struct SessionOutcome<P> {
    pub presenter: P,
    /// The last connect/read failure, if the session saw one.
    pub last_error: Option<CoreError>,
}

enum SessionEvent {
    Shutdown,
    Command(Option<SessionCommand>),
    Read(Result<Option<String>, SerialError>),
}

/// The read-loop actor.
///
/// Runs until the cancellation token fires, or until every
/// [`SessionHandle`] is dropped and no connection is open.
pub struct Session<P> {
    manager: ConnectionManager,
    presenter: P,
    commands: mpsc::Receiver<SessionCommand>,
    cancel: CancellationToken,
}

impl<P: Presenter> Session<P> {
    pub fn new(
        manager: ConnectionManager,
        presenter: P,
        cancel: CancellationToken,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let handle = SessionHandle {
            commands: tx,
            cancel: cancel.clone(),
        };
        let session = Self {
            manager,
            presenter,
            commands: rx,
            cancel,
        };
        (session, handle)
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub async fn run(mut self) -> SessionOutcome<P> {
        let mut commands_open = true;
        info!("session started");

        loop {
            if !commands_open && !self.manager.is_connected() {
                break;
            }

            let event = tokio::select! {
                biased;

                () = self.cancel.cancelled() => SessionEvent::Shutdown,

                cmd = self.commands.recv(), if commands_open => SessionEvent::Command(cmd),

                read = self.manager.read_chunk() => SessionEvent::Read(read),
            };

            match event {
                SessionEvent::Shutdown => {
                    if self.manager.is_connected() {
                        self.manager.disconnect(&mut self.presenter).await;
                    }
                    break;
                }
                SessionEvent::Command(None) => {
                    debug!("all session handles dropped");
                    commands_open = false;
                }
                SessionEvent::Command(Some(cmd)) => self.handle_command(cmd).await,
                SessionEvent::Read(result) => {
                    self.manager.handle_read(result, &mut self.presenter).await;
                }
            }
        }

        info!("session stopped");
        SessionOutcome {
            last_error: self.manager.take_last_error(),
            presenter: self.presenter,
        }
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        debug!(?cmd, connected = self.manager.is_connected(), "session command");
        let connect = match cmd {
            SessionCommand::Connect => true,
            SessionCommand::Disconnect => false,
            SessionCommand::Toggle => !self.manager.is_connected(),
        };

        if !connect {
            self.manager.disconnect(&mut self.presenter).await;
        } else if self.manager.is_connected() {
            debug!("already connected, ignoring connect");
        } else if let Err(e) = self.manager.connect(&mut self.presenter).await {
            debug!(error = %e, "connect attempt failed");
        }
    }
}
