//! Connection manager: owns the socket and the session's lifecycle.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use agent_stream_core::{
    ConfigOverride, ConnectionConfig, DomainEvent, FileState, ProjectionSnapshot,
    ProjectionUpdate, TerminalLine,
};
use futures::{SinkExt, StreamExt};
use tokio::{runtime::Handle, sync::mpsc, sync::broadcast};
use tracing::{debug, error, info};
use url::Url;

use crate::{
    address::transport_url,
    socket::{Connector, Socket},
    state::{ConnectionState, Generation, Reaction, SessionCore},
};

/// Environment variable holding the runtime origin.
pub const ORIGIN_ENV: &str = "AGENT_STREAM_ORIGIN";
/// Origin used when the environment provides none.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Settings that outlive individual connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Origin that origin-relative base addresses resolve against.
    pub origin: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl ClientOptions {
    /// Read options from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(ORIGIN_ENV)
            .ok()
            .filter(|origin| !origin.is_empty())
            .map_or_else(Self::default, |origin| Self { origin })
    }
}

type SharedCore = Arc<RwLock<SessionCore>>;

fn read(core: &SharedCore) -> RwLockReadGuard<'_, SessionCore> {
    core.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(core: &SharedCore) -> RwLockWriteGuard<'_, SessionCore> {
    core.write().unwrap_or_else(PoisonError::into_inner)
}

enum Outbound {
    Frame(String),
    Close,
}

/// Command channel into the socket task of the current attempt.
struct Link {
    outbound: mpsc::UnboundedSender<Outbound>,
}

/// Manages one logical session's connection to the agent backend.
///
/// Operations never fail to the caller: problems surface through
/// [`connection_error`](Self::connection_error). There is no automatic
/// reconnect; call [`connect`](Self::connect) again.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    options: ClientOptions,
    config: ConnectionConfig,
    core: SharedCore,
    link: Option<Link>,
}

#[cfg(feature = "websocket")]
impl ConnectionManager<crate::socket::WsConnector> {
    /// Create a manager that connects over WebSocket.
    #[must_use]
    pub fn websocket(options: ClientOptions, config: ConnectionConfig) -> Self {
        Self::new(crate::socket::WsConnector, options, config)
    }
}

impl<C: Connector> ConnectionManager<C> {
    /// Create an idle manager.
    #[must_use]
    pub fn new(connector: C, options: ClientOptions, config: ConnectionConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            options,
            config,
            core: Arc::new(RwLock::new(SessionCore::new())),
            link: None,
        }
    }

    /// Start a new connection attempt.
    ///
    /// Merges `patch` into the stored config, tears down any previous
    /// attempt, resets the projections and opens the socket in the
    /// background. Must be called from within a Tokio runtime; otherwise the
    /// attempt fails with a connection error.
    pub fn connect(&mut self, patch: Option<ConfigOverride>) {
        self.config = self.config.clone().merged(patch.unwrap_or_default());
        self.disconnect();

        let mut core = write(&self.core);
        let generation = match core.begin_connect() {
            Ok(generation) => generation,
            Err(e) => {
                error!("{e}");
                return;
            }
        };

        let url = match transport_url(&self.config, &self.options.origin) {
            Ok(url) => url,
            Err(e) => {
                core.fail(generation, e.to_string());
                return;
            }
        };
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                core.fail(generation, format!("No async runtime available: {e}"));
                return;
            }
        };
        drop(core);

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        handle.spawn(run_link(
            Arc::clone(&self.connector),
            url,
            generation,
            Arc::clone(&self.core),
            outbound_rx,
        ));
        self.link = Some(Link { outbound });
    }

    /// Close the socket, if any. Idempotent.
    ///
    /// Projections are kept until the next [`connect`](Self::connect).
    pub fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            // a finished task has nothing left to close
            let _ = link.outbound.send(Outbound::Close);
        }
        write(&self.core).close();
    }

    /// Send a user message. Dropped silently unless connected.
    pub fn send_message(&self, text: &str) {
        let Some(frame) = read(&self.core).user_message_frame(text) else {
            return;
        };
        if let Some(link) = &self.link {
            if link.outbound.send(Outbound::Frame(frame)).is_err() {
                debug!("Socket task gone, dropping user message");
            }
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        read(&self.core).is_connected()
    }

    #[must_use]
    pub fn connection_error(&self) -> Option<String> {
        read(&self.core).error().map(ToString::to_string)
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        read(&self.core).state()
    }

    /// Config of the latest attempt.
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Timeline: every event in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<DomainEvent> {
        read(&self.core).store().events()
    }

    #[must_use]
    pub fn current_file(&self) -> Option<FileState> {
        read(&self.core).store().current_file()
    }

    #[must_use]
    pub fn terminal_lines(&self) -> Vec<TerminalLine> {
        read(&self.core).store().terminal_lines()
    }

    /// All three projections, read under one lock.
    #[must_use]
    pub fn snapshot(&self) -> ProjectionSnapshot {
        read(&self.core).store().snapshot()
    }

    /// Live projection updates. Survives reconnects.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProjectionUpdate> {
        read(&self.core).store().subscribe()
    }

    /// Live projection updates as a stream.
    #[must_use]
    pub fn update_stream(&self) -> futures::stream::BoxStream<'static, ProjectionUpdate> {
        read(&self.core).store().update_stream()
    }
}

/// The detached socket task closes the sink and winds the session down.
impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            let _ = link.outbound.send(Outbound::Close);
        }
    }
}

/// Resolves once the manager asks to close or goes away.
async fn closed(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
    while let Some(msg) = outbound.recv().await {
        if matches!(msg, Outbound::Close) {
            return;
        }
    }
}

async fn run_link<C: Connector>(
    connector: Arc<C>,
    url: Url,
    generation: Generation,
    core: SharedCore,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    info!(%url, "Connecting to agent stream");
    let socket = tokio::select! {
        socket = connector.connect(&url) => socket,
        () = closed(&mut outbound) => {
            debug!("Connection attempt abandoned");
            return;
        }
    };
    let Socket {
        mut sink,
        mut stream,
    } = match socket {
        Ok(socket) => socket,
        Err(e) => {
            error!("Failed to connect to {url}: {e}");
            write(&core).fail(generation, format!("Connection failed: {e}"));
            return;
        }
    };

    let handshake = write(&core).on_open(generation);
    let Some(handshake) = handshake else {
        let _ = sink.close().await;
        return;
    };
    if let Err(e) = sink.send(handshake).await {
        write(&core).fail(generation, format!("Handshake failed: {e}"));
        write(&core).on_close(generation);
        return;
    }

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(text)) => {
                    debug!(frame = %text, "Received frame");
                    let reaction = write(&core).on_frame(generation, &text);
                    match reaction {
                        Reaction::None => {}
                        Reaction::Reply(reply) => {
                            if let Err(e) = sink.send(reply).await {
                                write(&core).fail(generation, format!("Send failed: {e}"));
                                break;
                            }
                        }
                        Reaction::Hangup => break,
                    }
                }
                Some(Err(e)) => {
                    error!("Agent stream error: {e}");
                    write(&core).fail(generation, e.to_string());
                    break;
                }
                None => break,
            },
            msg = outbound.recv() => match msg {
                Some(Outbound::Frame(frame)) => {
                    if let Err(e) = sink.send(frame).await {
                        write(&core).fail(generation, format!("Send failed: {e}"));
                        break;
                    }
                }
                Some(Outbound::Close) | None => break,
            },
        }
    }

    if let Err(e) = sink.close().await {
        debug!("Error closing socket: {e}");
    }
    write(&core).on_close(generation);
}
