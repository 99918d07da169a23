//! Domain events carried by the agent event stream.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Value};

/// Producer of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Typed by the person driving the session.
    User,
    /// Emitted by the agent runtime.
    #[default]
    Agent,
    /// Any producer the client does not model (e.g. `environment`).
    #[serde(other)]
    Other,
}

/// Actions the projections know how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Run,
    Edit,
    Write,
    Read,
    Browse,
    Think,
}

impl Action {
    /// Parse a wire action tag. Unknown tags yield `None`.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "run" => Some(Self::Run),
            "edit" => Some(Self::Edit),
            "write" => Some(Self::Write),
            "read" => Some(Self::Read),
            "browse" => Some(Self::Browse),
            "think" => Some(Self::Think),
            _ => None,
        }
    }

    /// Wire tag for this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Edit => "edit",
            Self::Write => "write",
            Self::Read => "read",
            Self::Browse => "browse",
            Self::Think => "think",
        }
    }
}

/// Action-specific arguments. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventArgs {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Arguments not modelled above, kept as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One unit of agent or user activity.
///
/// The `id` is assigned by the backend and treated as opaque. Ordering is the
/// arrival order on the stream; nothing here is meant to be sorted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_source")]
    pub source: EventSource,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: String,
    /// Free-form event type tag, e.g. `"message"`.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    /// Raw action tag. See [`DomainEvent::action_kind`].
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Arguments; anything other than an object is ignored.
    #[serde(default, deserialize_with = "lenient_args", skip_serializing_if = "Option::is_none")]
    pub args: Option<EventArgs>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Top-level fields not modelled above, kept as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DomainEvent {
    /// The action, if it is one the client interprets.
    #[must_use]
    pub fn action_kind(&self) -> Option<Action> {
        self.action.as_deref().and_then(Action::parse)
    }

    /// Borrow the arguments, if any were sent.
    #[must_use]
    pub const fn args(&self) -> Option<&EventArgs> {
        self.args.as_ref()
    }

    /// Textual outcome. `result` wins over `observation` when both are present.
    #[must_use]
    pub fn outcome(&self) -> Option<&str> {
        self.result.as_deref().or(self.observation.as_deref())
    }
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "event id must be a string or number, got {other}"
        ))),
    }
}

/// A non-string source is a producer the client does not model.
fn lenient_source<'de, D>(deserializer: D) -> Result<EventSource, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => EventSource::default(),
        source @ Value::String(_) => {
            serde_json::from_value(source).unwrap_or(EventSource::Other)
        }
        _ => EventSource::Other,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_args<'de, D>(deserializer: D) -> Result<Option<EventArgs>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(args @ Value::Object(_)) => serde_json::from_value(args).ok(),
        _ => None,
    })
}

/// Accept any JSON value for a text field; non-strings are rendered as JSON.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
