//! Frame codec for the socket multiplexing envelope.
//!
//! Frames are text. A numeric prefix classifies each one; event frames carry
//! a JSON array of `[channel_tag, payload]` after the `42` prefix.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Sent by the client as soon as the socket opens.
pub const HANDSHAKE_ACK: &str = "40{}";
/// Keep-alive probe from the server.
pub const PING: &str = "2";
/// Keep-alive reply from the client.
pub const PONG: &str = "3";
/// Prefix of every event frame.
pub const EVENT_PREFIX: &str = "42";
/// Channel carrying domain events from the server.
pub const EVENT_TAG: &str = "oh_event";
/// Channel carrying user actions to the server.
pub const USER_ACTION_TAG: &str = "oh_user_action";

/// Frame that could not be decoded.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Empty frame")]
    Empty,
    #[error("Unsupported frame: {0}")]
    Unsupported(String),
    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Event frame is not a [tag, payload] array")]
    Shape,
    #[error("Unexpected channel tag: {0}")]
    UnexpectedTag(String),
}

/// Frame received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    /// Transport open packet (`0{...}`).
    Open,
    /// Namespace connect acknowledgement (`40...`).
    Connected,
    /// Namespace disconnect (`41`).
    Disconnect,
    /// Keep-alive probe; must be answered with [`ClientFrame::Pong`].
    Ping,
    /// Payload of one `oh_event` frame.
    Event(Value),
}

impl ServerFrame {
    /// Classify one incoming text frame.
    ///
    /// # Errors
    /// Returns error for empty, unknown or malformed frames and for event
    /// frames on a channel other than [`EVENT_TAG`].
    pub fn decode(frame: &str) -> Result<Self, FrameError> {
        if frame.is_empty() {
            return Err(FrameError::Empty);
        }
        if frame == PING {
            return Ok(Self::Ping);
        }
        if let Some(body) = frame.strip_prefix(EVENT_PREFIX) {
            return decode_event(body).map(Self::Event);
        }
        if frame.starts_with("40") {
            return Ok(Self::Connected);
        }
        if frame.starts_with("41") {
            return Ok(Self::Disconnect);
        }
        if frame.starts_with('0') {
            return Ok(Self::Open);
        }
        Err(FrameError::Unsupported(preview(frame)))
    }
}

fn decode_event(body: &str) -> Result<Value, FrameError> {
    let Value::Array(items) = serde_json::from_str(body)? else {
        return Err(FrameError::Shape);
    };
    let mut items = items.into_iter();
    let (Some(tag), Some(payload)) = (items.next(), items.next()) else {
        return Err(FrameError::Shape);
    };
    match tag {
        Value::String(tag) if tag == EVENT_TAG => Ok(payload),
        Value::String(tag) => Err(FrameError::UnexpectedTag(tag)),
        other => Err(FrameError::UnexpectedTag(other.to_string())),
    }
}

fn preview(frame: &str) -> String {
    frame.chars().take(32).collect()
}

/// Payload of a user-submitted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAction<'a> {
    pub message: &'a str,
    pub source: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl<'a> UserAction<'a> {
    #[must_use]
    pub const fn message(message: &'a str) -> Self {
        Self {
            message,
            source: "user",
            kind: "message",
        }
    }
}

/// Frame sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame<'a> {
    /// Handshake acknowledgement, sent on open.
    HandshakeAck,
    /// Keep-alive reply.
    Pong,
    /// User message on the [`USER_ACTION_TAG`] channel.
    UserMessage(&'a str),
}

impl ClientFrame<'_> {
    /// Encode to wire text.
    ///
    /// # Errors
    /// Returns error if the payload cannot be serialized.
    pub fn encode(&self) -> Result<String, FrameError> {
        match self {
            Self::HandshakeAck => Ok(HANDSHAKE_ACK.to_string()),
            Self::Pong => Ok(PONG.to_string()),
            Self::UserMessage(text) => encode_event(USER_ACTION_TAG, &UserAction::message(text)),
        }
    }
}

/// Wrap `payload` as `42[tag, payload]`.
///
/// # Errors
/// Returns error if the payload cannot be serialized.
pub fn encode_event<T: Serialize>(tag: &str, payload: &T) -> Result<String, FrameError> {
    Ok(format!("{EVENT_PREFIX}{}", serde_json::to_string(&(tag, payload))?))
}
