//! Payload → [`DomainEvent`] normalization.

use serde_json::Value;
use thiserror::Error;

use crate::DomainEvent;

/// Payload rejected by [`normalize`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Event payload is not an object: {0}")]
    NotAnObject(&'static str),
    #[error("Invalid event payload: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Turn a decoded application payload into a typed event.
///
/// Validation is loose: optional fields may be absent or unknown, only an
/// object with an `id` is required.
///
/// # Errors
/// Returns error if the payload is not an object or carries no usable `id`.
pub fn normalize(payload: Value) -> Result<DomainEvent, NormalizeError> {
    let kind = match &payload {
        Value::Object(_) => return Ok(serde_json::from_value(payload)?),
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
    };
    Err(NormalizeError::NotAnObject(kind))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Action, EventSource};

    #[test]
    fn test_normalize_write_event() {
        let event = normalize(json!({
            "id": "e1",
            "source": "agent",
            "timestamp": "2024-01-01T00:00:00Z",
            "action": "write",
            "args": {"path": "main.py", "content": "print(1)"},
        }))
        .unwrap();

        assert_eq!(event.id, "e1");
        assert_eq!(event.source, EventSource::Agent);
        assert_eq!(event.action_kind(), Some(Action::Write));
        let args = event.args().unwrap();
        assert_eq!(args.path.as_deref(), Some("main.py"));
        assert_eq!(args.content.as_deref(), Some("print(1)"));
    }

    #[test]
    fn test_normalize_minimal_event() {
        let event = tokio_test::assert_ok!(normalize(json!({"id": "only-id"})));
        assert_eq!(event.source, EventSource::Agent);
        assert!(event.args.is_none());
        assert!(event.action.is_none());
        assert!(event.timestamp.is_empty());
    }

    #[test]
    fn test_normalize_tolerates_odd_optional_fields() {
        let event = tokio_test::assert_ok!(normalize(json!({
            "id": "e1",
            "timestamp": 1_700_000_000,
            "action": "run",
            "args": {"command": "ls"},
        })));
        assert_eq!(event.timestamp, "1700000000");
        assert_eq!(event.action_kind(), Some(Action::Run));

        let event = tokio_test::assert_ok!(normalize(json!({
            "id": "e2",
            "action": "think",
            "args": "thinking",
        })));
        assert_eq!(event.action_kind(), Some(Action::Think));
        assert!(event.args.is_none());

        let event = tokio_test::assert_ok!(normalize(json!({
            "id": "e3",
            "type": "message",
            "kind": "x",
        })));
        assert_eq!(event.kind.as_deref(), Some("message"));

        let event = tokio_test::assert_ok!(normalize(json!({"id": "e4", "action": 5})));
        assert_eq!(event.action.as_deref(), Some("5"));
        assert_eq!(event.action_kind(), None);
    }

    #[test]
    fn test_normalize_rejects_non_objects() {
        assert!(matches!(
            normalize(json!(["oh_event"])),
            Err(NormalizeError::NotAnObject("array"))
        ));
        assert!(matches!(
            normalize(json!("text")),
            Err(NormalizeError::NotAnObject("string"))
        ));
    }

    #[test]
    fn test_normalize_rejects_bad_id() {
        assert!(matches!(
            normalize(json!({"id": {"nested": true}})),
            Err(NormalizeError::Invalid(_))
        ));
    }
}
