//! Projection engines: pure views derived from the event stream.
//!
//! Each engine owns only its own state and is written only by
//! [`Projections::apply`]. A single event may update any subset of them.

pub mod file;
pub mod terminal;
pub mod timeline;

use serde::Serialize;

pub use file::{FileProjection, FileState};
pub use terminal::{LineKind, TerminalLine, TerminalProjection};
pub use timeline::{EntryDisplay, TimelineProjection};

use crate::DomainEvent;

/// One change to a projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProjectionUpdate {
    /// All projections were cleared for a new session.
    Reset,
    /// A terminal line was appended.
    Terminal(TerminalLine),
    /// The current file was replaced.
    File(FileState),
    /// An event was appended to the timeline.
    Timeline(DomainEvent),
}

/// The three projections of one session.
#[derive(Debug, Clone, Default)]
pub struct Projections {
    pub terminal: TerminalProjection,
    pub file: FileProjection,
    pub timeline: TimelineProjection,
}

impl Projections {
    /// Fan one event out to every engine. Returns the resulting updates.
    pub fn apply(&mut self, event: DomainEvent) -> Vec<ProjectionUpdate> {
        let mut updates: Vec<ProjectionUpdate> = self
            .terminal
            .apply(&event)
            .into_iter()
            .map(ProjectionUpdate::Terminal)
            .collect();
        if let Some(state) = self.file.apply(&event) {
            updates.push(ProjectionUpdate::File(state));
        }
        self.timeline.apply(event.clone());
        updates.push(ProjectionUpdate::Timeline(event));
        updates
    }

    /// Immutable copy of every projection.
    #[must_use]
    pub fn snapshot(&self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            terminal: self.terminal.lines().to_vec(),
            file: self.file.current().cloned(),
            timeline: self.timeline.entries().to_vec(),
        }
    }
}

/// Read-only copy handed to view layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionSnapshot {
    pub terminal: Vec<TerminalLine>,
    pub file: Option<FileState>,
    pub timeline: Vec<DomainEvent>,
}
