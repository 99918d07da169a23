//! Single "currently active file" buffer.

use serde::{Deserialize, Serialize};

use crate::{Action, DomainEvent, language::language_for_path};

/// The most recently written or edited file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    pub path: String,
    pub content: String,
    pub language: String,
}

/// Holds only the latest file; there is no per-path history.
#[derive(Debug, Clone, Default)]
pub struct FileProjection {
    current: Option<FileState>,
}

impl FileProjection {
    /// React to one event. Returns the new file state if it changed.
    pub fn apply(&mut self, event: &DomainEvent) -> Option<FileState> {
        if !matches!(event.action_kind(), Some(Action::Write | Action::Edit)) {
            return None;
        }
        let args = event.args()?;
        let path = args.path.as_deref()?;

        let state = FileState {
            path: path.to_string(),
            content: args.content.clone().unwrap_or_default(),
            language: language_for_path(path).to_string(),
        };
        self.current = Some(state.clone());
        Some(state)
    }

    #[must_use]
    pub const fn current(&self) -> Option<&FileState> {
        self.current.as_ref()
    }
}
