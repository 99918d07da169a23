//! Connection state machine and the event-consumption path.
//!
//! [`SessionCore`] knows nothing about sockets. The I/O side reports
//! transport signals (open, frame, error, close) tagged with the
//! [`Generation`] of the attempt they belong to; signals from an older
//! attempt are ignored.

use agent_stream_core::{LineKind, ProjectionStore, normalize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::protocol::{ClientFrame, ServerFrame};

/// Terminal line appended when the socket opens.
pub const CONNECTED_LINE: &str = "Connected to agent";
/// Terminal line appended when an established connection closes.
pub const DISCONNECTED_LINE: &str = "Disconnected from agent";

/// Lifecycle of one connection attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
    Error,
}

/// Identifies one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Transition not allowed from the current state.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot {action} while {from:?}")]
pub struct TransitionError {
    pub from: ConnectionState,
    pub action: &'static str,
}

/// What the I/O side should do after a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing to send.
    None,
    /// Send this frame right away.
    Reply(String),
    /// The server ended the session; close the socket.
    Hangup,
}

/// State machine plus projections for one logical session.
#[derive(Default)]
pub struct SessionCore {
    state: ConnectionState,
    error: Option<String>,
    generation: u64,
    /// The current attempt reached `Open` at least once.
    opened: bool,
    store: ProjectionStore,
}

impl SessionCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn store(&self) -> &ProjectionStore {
        &self.store
    }

    fn is_current(&self, generation: Generation) -> bool {
        if generation.0 == self.generation {
            true
        } else {
            debug!(
                stale = generation.0,
                current = self.generation,
                "Ignoring signal from previous connection"
            );
            false
        }
    }

    /// Start a new attempt: Idle/Closed/Error → Connecting.
    ///
    /// Projections are reset and the last error is cleared.
    ///
    /// # Errors
    /// Returns error if an attempt is still connecting or open.
    pub fn begin_connect(&mut self) -> Result<Generation, TransitionError> {
        match self.state {
            ConnectionState::Idle | ConnectionState::Closed | ConnectionState::Error => {}
            from => {
                return Err(TransitionError {
                    from,
                    action: "connect",
                });
            }
        }
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        self.opened = false;
        self.error = None;
        self.store.reset();
        Ok(Generation(self.generation))
    }

    /// Connecting → Open. Returns the handshake frame to send.
    ///
    /// `None` means the attempt was abandoned and the socket should be closed.
    pub fn on_open(&mut self, generation: Generation) -> Option<String> {
        if !self.is_current(generation) || self.state != ConnectionState::Connecting {
            return None;
        }
        let handshake = match ClientFrame::HandshakeAck.encode() {
            Ok(frame) => frame,
            Err(e) => {
                self.fail(generation, format!("Handshake failed: {e}"));
                return None;
            }
        };
        info!("Agent stream open");
        self.state = ConnectionState::Open;
        self.opened = true;
        self.error = None;
        self.store.push_system_line(LineKind::Output, CONNECTED_LINE);
        Some(handshake)
    }

    /// Handle one incoming text frame.
    ///
    /// Malformed frames and events are logged and dropped.
    pub fn on_frame(&mut self, generation: Generation, text: &str) -> Reaction {
        if !self.is_current(generation) || self.state != ConnectionState::Open {
            return Reaction::None;
        }
        match ServerFrame::decode(text) {
            Ok(ServerFrame::Ping) => match ClientFrame::Pong.encode() {
                Ok(pong) => Reaction::Reply(pong),
                Err(e) => {
                    warn!("Failed to encode keep-alive reply: {e}");
                    Reaction::None
                }
            },
            Ok(ServerFrame::Event(payload)) => {
                match normalize(payload) {
                    Ok(event) => {
                        debug!(id = %event.id, action = ?event.action, "Agent event");
                        self.store.apply(event);
                    }
                    Err(e) => warn!("Dropping event: {e}"),
                }
                Reaction::None
            }
            Ok(ServerFrame::Disconnect) => {
                info!("Server ended the session");
                Reaction::Hangup
            }
            Ok(frame @ (ServerFrame::Open | ServerFrame::Connected)) => {
                debug!(?frame, "Transport control frame");
                Reaction::None
            }
            Err(e) => {
                warn!("Dropping frame: {e}");
                Reaction::None
            }
        }
    }

    /// Connecting/Open → Error with a human-readable cause.
    pub fn fail(&mut self, generation: Generation, cause: impl Into<String>) {
        if !self.is_current(generation) {
            return;
        }
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            let cause = cause.into();
            warn!("Agent stream error: {cause}");
            self.state = ConnectionState::Error;
            self.error = Some(cause);
        }
    }

    /// Transport closed, locally or remotely.
    pub fn on_close(&mut self, generation: Generation) {
        if self.is_current(generation) {
            self.close();
        }
    }

    /// Close the current attempt regardless of generation.
    ///
    /// A session that was open adds one "disconnected" line. Connecting, or
    /// an Error reached before the socket opened, closes silently.
    /// Idle/Closed are left as they are.
    pub fn close(&mut self) {
        match self.state {
            ConnectionState::Open | ConnectionState::Error if self.opened => {
                info!("Agent stream closed");
                self.store
                    .push_system_line(LineKind::Output, DISCONNECTED_LINE);
                self.state = ConnectionState::Closed;
            }
            ConnectionState::Open | ConnectionState::Connecting | ConnectionState::Error => {
                self.state = ConnectionState::Closed;
            }
            ConnectionState::Idle | ConnectionState::Closed => {}
        }
    }

    /// Encode a user message, only while open.
    #[must_use]
    pub fn user_message_frame(&self, text: &str) -> Option<String> {
        if !self.is_connected() {
            debug!("Not connected, dropping user message");
            return None;
        }
        ClientFrame::UserMessage(text)
            .encode()
            .inspect_err(|e| warn!("Failed to encode user message: {e}"))
            .ok()
    }
}
