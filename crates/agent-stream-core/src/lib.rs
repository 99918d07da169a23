//! Core building blocks for an agent event-stream client.
//!
//! This crate is free of I/O:
//! - `DomainEvent` - Typed agent/user event
//! - `normalize` - Payload to event conversion
//! - `projection` - Terminal, file and timeline projections
//! - `ProjectionStore` - Projections plus a live update feed
//! - `ConnectionConfig` - Where and which session to connect to

pub mod config;
pub mod event;
pub mod language;
pub mod normalize;
pub mod projection;
pub mod store;

pub use config::{ConfigOverride, ConnectionConfig};
pub use event::{Action, DomainEvent, EventArgs, EventSource};
pub use language::language_for_path;
pub use normalize::{NormalizeError, normalize};
pub use projection::{
    FileState, LineKind, ProjectionSnapshot, ProjectionUpdate, Projections, TerminalLine,
};
pub use store::ProjectionStore;
