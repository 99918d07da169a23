//! Projection store: current projections plus a live update feed.

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::{
    DomainEvent,
    projection::{
        FileState, LineKind, ProjectionSnapshot, ProjectionUpdate, Projections, TerminalLine,
    },
};

/// Capacity of the update channel. Slow subscribers skip ahead.
const UPDATE_CAPACITY: usize = 1024;

/// Projections of one session with broadcast of every change.
///
/// Mutation takes `&mut self`; the owner decides how the store is shared.
/// Updates for one event are sent only after all engines have applied it,
/// so a subscriber that then reads a snapshot sees them all.
pub struct ProjectionStore {
    projections: Projections,
    sender: broadcast::Sender<ProjectionUpdate>,
}

impl Default for ProjectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            projections: Projections::default(),
            sender,
        }
    }

    /// Apply one event to every projection.
    pub fn apply(&mut self, event: DomainEvent) {
        for update in self.projections.apply(event) {
            let _ = self.sender.send(update); // no subscribers is fine
        }
    }

    /// Append a synthetic terminal line (connection notices).
    pub fn push_system_line(&mut self, kind: LineKind, content: impl Into<String>) {
        let line = self.projections.terminal.push_system(kind, content);
        let _ = self.sender.send(ProjectionUpdate::Terminal(line));
    }

    /// Drop all derived state for a new session.
    pub fn reset(&mut self) {
        self.projections = Projections::default();
        let _ = self.sender.send(ProjectionUpdate::Reset);
    }

    #[must_use]
    pub fn terminal_lines(&self) -> Vec<TerminalLine> {
        self.projections.terminal.lines().to_vec()
    }

    #[must_use]
    pub fn current_file(&self) -> Option<FileState> {
        self.projections.file.current().cloned()
    }

    #[must_use]
    pub fn events(&self) -> Vec<DomainEvent> {
        self.projections.timeline.entries().to_vec()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProjectionSnapshot {
        self.projections.snapshot()
    }

    #[must_use]
    pub const fn projections(&self) -> &Projections {
        &self.projections
    }

    /// Get a receiver for live updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProjectionUpdate> {
        self.sender.subscribe()
    }

    /// Stream of live updates; lagged updates are skipped.
    #[must_use]
    pub fn update_stream(&self) -> futures::stream::BoxStream<'static, ProjectionUpdate> {
        BroadcastStream::new(self.subscribe())
            .filter_map(|res| async move {
                if let Err(e) = &res {
                    tracing::warn!("Projection subscriber lagged: {e}");
                }
                res.ok()
            })
            .boxed()
    }
}
