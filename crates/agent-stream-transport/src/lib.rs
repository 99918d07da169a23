//! Transport layer for agent event streams.
//!
//! Provides:
//! - Frame codec for the socket envelope
//! - Socket URL derivation
//! - Connection state machine and event-consumption path
//! - `ConnectionManager` - socket lifecycle for one session
//! - WebSocket connector (feature: websocket)

pub mod address;
pub mod client;
pub mod protocol;
pub mod socket;
pub mod state;

pub use address::{UrlError, transport_url};
pub use client::{ClientOptions, ConnectionManager};
pub use protocol::{ClientFrame, FrameError, ServerFrame};
pub use socket::{Connector, Socket, TransportError};
#[cfg(feature = "websocket")]
pub use socket::WsConnector;
pub use state::{ConnectionState, SessionCore};
