//! Chronological event history with display metadata computed on read.

use serde::Serialize;

use crate::{Action, DomainEvent, EventSource};

/// Longest free-text fragment shown in a title before truncation.
pub const MAX_DISPLAY_LEN: usize = 60;

const ELLIPSIS: &str = "...";

/// Icon tag and short title for one timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDisplay {
    pub icon: &'static str,
    pub title: String,
}

/// Every event, verbatim, in arrival order. Repeated ids are kept.
#[derive(Debug, Clone, Default)]
pub struct TimelineProjection {
    entries: Vec<DomainEvent>,
}

impl TimelineProjection {
    pub fn apply(&mut self, event: DomainEvent) {
        self.entries.push(event);
    }

    #[must_use]
    pub fn entries(&self) -> &[DomainEvent] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map an event to its icon and title.
#[must_use]
pub fn display(event: &DomainEvent) -> EntryDisplay {
    let args = event.args().cloned().unwrap_or_default();
    let text = |field: Option<String>| field.unwrap_or_default();

    let (icon, title) = match event.action_kind() {
        Some(Action::Run) => ("terminal", format!("Ran {}", truncate(&text(args.command)))),
        Some(Action::Write) => ("file-plus", format!("Wrote {}", text(args.path))),
        Some(Action::Edit) => ("file-edit", format!("Edited {}", text(args.path))),
        Some(Action::Read) => ("file", format!("Read {}", text(args.path))),
        Some(Action::Browse) => ("globe", format!("Browsed {}", truncate(&text(args.url)))),
        Some(Action::Think) => ("brain", format!("Thought: {}", truncate(&text(args.thought)))),
        None => message_display(event),
    };
    EntryDisplay { icon, title }
}

fn message_display(event: &DomainEvent) -> (&'static str, String) {
    let message = event.message.as_deref().map(truncate);
    match (event.kind.as_deref(), event.source, message) {
        (Some("message"), EventSource::User, Some(m)) => ("user", format!("You: {m}")),
        (Some("message"), _, Some(m)) => ("bot", format!("Agent: {m}")),
        (Some("message"), EventSource::User, None) => ("user", "You".to_string()),
        (Some("message"), _, None) => ("bot", "Agent".to_string()),
        (_, _, _) => match (event.action.as_deref(), event.kind.as_deref()) {
            (Some(tag), _) | (None, Some(tag)) => ("activity", tag.to_string()),
            (None, None) => ("activity", "Event".to_string()),
        },
    }
}

/// Cut `text` to [`MAX_DISPLAY_LEN`] characters, marking the cut.
#[must_use]
pub fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_DISPLAY_LEN) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalize;

    fn event(value: serde_json::Value) -> DomainEvent {
        normalize(value).unwrap()
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let mut timeline = TimelineProjection::default();
        for id in ["a", "b", "a", "c"] {
            timeline.apply(event(json!({"id": id})));
        }
        let ids: Vec<_> = timeline.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "a", "c"]);
        assert_eq!(timeline.len(), 4);
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "x".repeat(MAX_DISPLAY_LEN + 5);
        let cut = truncate(&long);
        assert_eq!(cut.len(), MAX_DISPLAY_LEN + ELLIPSIS.len());
        assert!(cut.ends_with("..."));
        assert_eq!(truncate("short"), "short");
        assert_eq!(truncate(&"x".repeat(MAX_DISPLAY_LEN)), "x".repeat(MAX_DISPLAY_LEN));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(MAX_DISPLAY_LEN + 1);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_DISPLAY_LEN + ELLIPSIS.len());
    }

    #[test]
    fn test_display_for_actions() {
        let run = display(&event(json!({"id": "1", "action": "run", "args": {"command": "ls -la"}})));
        assert_eq!(run, EntryDisplay { icon: "terminal", title: "Ran ls -la".into() });

        let write = display(&event(json!({"id": "2", "action": "write", "args": {"path": "a.py"}})));
        assert_eq!(write.icon, "file-plus");
        assert_eq!(write.title, "Wrote a.py");

        let think = display(&event(json!({
            "id": "3", "action": "think", "args": {"thought": "t".repeat(100)}
        })));
        assert!(think.title.ends_with("..."));
        assert_eq!(think.title.len(), "Thought: ".len() + MAX_DISPLAY_LEN + 3);
    }

    #[test]
    fn test_display_for_messages_by_source() {
        let user = display(&event(json!({
            "id": "1", "source": "user", "type": "message", "message": "hello"
        })));
        assert_eq!(user, EntryDisplay { icon: "user", title: "You: hello".into() });

        let agent = display(&event(json!({
            "id": "2", "source": "agent", "type": "message", "message": "done"
        })));
        assert_eq!(agent.icon, "bot");
        assert_eq!(agent.title, "Agent: done");
    }

    #[test]
    fn test_display_fallbacks() {
        let unknown = display(&event(json!({"id": "1", "action": "delegate"})));
        assert_eq!(unknown, EntryDisplay { icon: "activity", title: "delegate".into() });

        let typed = display(&event(json!({"id": "2", "type": "status"})));
        assert_eq!(typed.title, "status");

        let bare = display(&event(json!({"id": "3"})));
        assert_eq!(bare.title, "Event");
    }
}
