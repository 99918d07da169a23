//! Command/output line log.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Action, DomainEvent};

/// Marker put in front of every command line.
pub const PROMPT_MARKER: &str = "$ ";

/// Kind of terminal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Command,
    Output,
    Error,
}

/// One line in the terminal log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalLine {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
    pub timestamp: String,
}

/// Append-only log of executed commands and their output.
#[derive(Debug, Clone, Default)]
pub struct TerminalProjection {
    lines: Vec<TerminalLine>,
}

impl TerminalProjection {
    /// React to one event. Returns the lines appended, in order.
    pub fn apply(&mut self, event: &DomainEvent) -> Vec<TerminalLine> {
        if event.action_kind() != Some(Action::Run) {
            return Vec::new();
        }
        let Some(command) = event.args().and_then(|a| a.command.as_deref()) else {
            return Vec::new();
        };

        let start = self.lines.len();
        self.lines.push(TerminalLine {
            id: event.id.clone(),
            kind: LineKind::Command,
            content: format!("{PROMPT_MARKER}{command}"),
            timestamp: event.timestamp.clone(),
        });
        if let Some(output) = event.outcome() {
            self.lines.push(TerminalLine {
                id: format!("{}-output", event.id),
                kind: LineKind::Output,
                content: output.to_string(),
                timestamp: event.timestamp.clone(),
            });
        }
        self.lines[start..].to_vec()
    }

    /// Append a line that did not come from the event stream.
    pub fn push_system(&mut self, kind: LineKind, content: impl Into<String>) -> TerminalLine {
        let line = TerminalLine {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.lines.push(line.clone());
        line
    }

    #[must_use]
    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }
}
