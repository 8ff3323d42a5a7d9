//! Debounced snapshot history for undo/redo.
//!
//! Rapid successive edits collapse into a single entry: a mutation marks the
//! history dirty, and the snapshot is only captured after a quiescence
//! window. The stack is linear and capped: pushing past the cursor
//! truncates the redo branch, and the oldest entry is dropped first.

use crate::scene::Scene;
use std::time::{Duration, Instant};

/// Quiescence window before a dirty scene is committed.
pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Maximum number of retained snapshots.
pub const MAX_HISTORY: usize = 50;

/// An immutable copy of the scene collections, restored wholesale on
/// undo/redo. The viewport is deliberately not part of a snapshot.
pub type Snapshot = Scene;

/// Linear undo/redo stack with debounced capture.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    /// Index of the entry matching the current scene state.
    cursor: usize,
    /// Set when a mutation has been reported and not yet committed.
    dirty_since: Option<Instant>,
}

impl History {
    /// Start a history whose first entry is the initial scene state.
    pub fn new(initial: &Scene) -> Self {
        Self {
            entries: vec![initial.clone()],
            cursor: 0,
            dirty_since: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Report a scene mutation. The debounce timer restarts with each
    /// change, so a burst of edits yields a single entry.
    pub fn note_change(&mut self, at: Instant) {
        self.dirty_since = Some(at);
    }

    /// Commit a pending snapshot if the debounce window has elapsed.
    /// Returns true if a snapshot was pushed.
    pub fn maybe_commit(&mut self, scene: &Scene, now: Instant) -> bool {
        match self.dirty_since {
            Some(since) if now.duration_since(since) >= DEBOUNCE => {
                self.push(scene);
                true
            }
            _ => false,
        }
    }

    /// Commit any pending snapshot immediately, debounce notwithstanding.
    /// Called before undo so the state being left is reachable via redo.
    pub fn flush(&mut self, scene: &Scene) {
        if self.dirty_since.is_some() {
            self.push(scene);
        }
    }

    fn push(&mut self, scene: &Scene) {
        self.dirty_since = None;
        self.entries.truncate(self.cursor + 1);
        self.entries.push(scene.clone());
        self.cursor = self.entries.len() - 1;
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Step back one entry, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Step forward one entry, returning the snapshot to restore.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node, NodeKind};
    use kurbo::Point;

    fn scene_with_nodes(count: usize) -> Scene {
        let mut scene = Scene::new();
        for i in 0..count {
            scene.add_node(Node::new(NodeKind::Server, Point::new(i as f64 * 50.0, 0.0)));
        }
        scene
    }

    #[test]
    fn test_debounce_collapses_rapid_edits() {
        let scene = scene_with_nodes(0);
        let mut history = History::new(&scene);
        let t0 = Instant::now();

        // 50 edits closer together than the window: one entry total.
        let mut scene = scene;
        for i in 0..50u64 {
            scene.add_node(Node::new(NodeKind::Server, Point::ZERO));
            history.note_change(t0 + Duration::from_millis(i));
            history.maybe_commit(&scene, t0 + Duration::from_millis(i + 1));
        }
        assert_eq!(history.len(), 1);

        history.maybe_commit(&scene, t0 + Duration::from_millis(50) + DEBOUNCE);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_spaced_edits_produce_distinct_entries() {
        let mut scene = scene_with_nodes(0);
        let mut history = History::new(&scene);
        let t0 = Instant::now();
        let gap = DEBOUNCE + Duration::from_millis(50);

        for i in 0..49u32 {
            scene.add_node(Node::new(NodeKind::Server, Point::ZERO));
            let at = t0 + gap * i;
            history.note_change(at);
            history.maybe_commit(&scene, at + gap);
        }
        // Initial entry plus one per spaced edit, just under the cap.
        assert_eq!(history.len(), MAX_HISTORY);

        // The seed entry is still reachable: undoing all the way lands on
        // the empty scene.
        let mut last = None;
        while let Some(snapshot) = history.undo() {
            last = Some(snapshot);
        }
        assert!(last.unwrap().is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut scene = scene_with_nodes(0);
        let mut history = History::new(&scene);
        let t0 = Instant::now();
        let gap = DEBOUNCE * 2;

        for i in 0..80u32 {
            scene.add_node(Node::new(NodeKind::Server, Point::ZERO));
            let at = t0 + gap * i;
            history.note_change(at);
            history.maybe_commit(&scene, at + gap);
        }
        assert_eq!(history.len(), MAX_HISTORY);

        // Undoing all the way lands on a truncated past, not the empty scene.
        let mut last = None;
        while let Some(snapshot) = history.undo() {
            last = Some(snapshot);
        }
        assert!(!last.unwrap().nodes.is_empty());
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        let mut scene = scene_with_nodes(0);
        let mut history = History::new(&scene);
        let t0 = Instant::now();

        scene.add_node(Node::new(NodeKind::Server, Point::ZERO));
        history.note_change(t0);
        history.maybe_commit(&scene, t0 + DEBOUNCE);

        assert!(history.undo().is_some());
        assert!(history.can_redo());

        // A new edit after undo abandons the redo branch.
        scene.add_node(Node::new(NodeKind::Cache, Point::ZERO));
        history.note_change(t0 + DEBOUNCE * 2);
        history.maybe_commit(&scene, t0 + DEBOUNCE * 4);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut scene = scene_with_nodes(0);
        let mut history = History::new(&scene);
        let t0 = Instant::now();
        let gap = DEBOUNCE * 2;

        for i in 0..5u32 {
            scene.add_node(Node::new(NodeKind::Server, Point::new(i as f64, 0.0)));
            let at = t0 + gap * i;
            history.note_change(at);
            history.maybe_commit(&scene, at + gap);
        }
        let final_count = scene.nodes.len();

        for _ in 0..5 {
            scene = history.undo().unwrap();
        }
        assert!(scene.is_empty());
        assert!(!history.can_undo());

        for _ in 0..5 {
            scene = history.redo().unwrap();
        }
        assert_eq!(scene.nodes.len(), final_count);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_flush_commits_pending() {
        let mut scene = scene_with_nodes(0);
        let mut history = History::new(&scene);

        scene.add_node(Node::new(NodeKind::Server, Point::ZERO));
        history.note_change(Instant::now());
        history.flush(&scene);
        assert_eq!(history.len(), 2);
        assert!(history.can_undo());
    }
}
