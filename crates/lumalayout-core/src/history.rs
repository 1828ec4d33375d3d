//! Undo/redo history over scene snapshots.

use crate::scene::SceneSnapshot;

/// Maximum number of history entries to keep.
pub const HISTORY_CAPACITY: usize = 50;

/// Ring of pre-mutation snapshots for the current scene, plus a cursor.
///
/// Every history-bearing mutation records the *pre-mutation* state. Undoing
/// from the tip first stashes the live state so that redo can return to it
/// exactly; recording a new entry discards the stash and any undone future
/// (a new branch makes the old redo future unreachable).
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<SceneSnapshot>,
    /// Index of the snapshot the next undo applies; -1 = nothing to undo.
    cursor: isize,
    /// Live state stashed on the first undo from the tip.
    tip: Option<SceneSnapshot>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
            tip: None,
            capacity,
        }
    }

    /// Record a pre-mutation snapshot. Call before applying the change.
    pub fn record(&mut self, pre: SceneSnapshot) {
        // Truncate the undone future and drop the stashed tip.
        self.entries.truncate((self.cursor + 1) as usize);
        self.tip = None;

        self.entries.push(pre);
        self.cursor = self.entries.len() as isize - 1;

        if self.entries.len() > self.capacity {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() as isize - 1
    }

    /// Step the cursor back, returning the snapshot to apply.
    ///
    /// `live` is the current scene state, stashed when undoing from the tip.
    pub fn undo(&mut self, live: SceneSnapshot) -> Option<SceneSnapshot> {
        if self.cursor < 0 {
            return None;
        }
        if self.tip.is_none() {
            self.tip = Some(live);
        }
        let snap = self.entries[self.cursor as usize].clone();
        self.cursor -= 1;
        Some(snap)
    }

    /// Step the cursor forward, returning the snapshot to apply.
    pub fn redo(&mut self) -> Option<SceneSnapshot> {
        let len = self.entries.len() as isize;
        if self.cursor >= len - 1 {
            return None;
        }
        let next = self.cursor + 1;
        let target = if next + 1 < len {
            Some(self.entries[(next + 1) as usize].clone())
        } else {
            self.tip.clone()
        };
        let snap = target?;
        self.cursor = next;
        Some(snap)
    }

    /// Drop all entries (scene switch, import).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
        self.tip = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use kurbo::Point;

    fn snap_with_points(n: usize) -> SceneSnapshot {
        let mut scene = Scene::new("test");
        for i in 0..n {
            scene.room.points.push(Point::new(i as f64, 0.0));
        }
        scene.snapshot()
    }

    #[test]
    fn test_empty_history_is_noop() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo(snap_with_points(0)).is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let mut history = History::new();
        // Mutations M1..M3 from states S0..S2, live ends at S3.
        for i in 0..3 {
            history.record(snap_with_points(i));
        }

        // Undo three times lands back on S0.
        let mut live = snap_with_points(3);
        for expected in (0..3).rev() {
            let snap = history.undo(live.clone()).unwrap();
            assert_eq!(snap.room.points.len(), expected);
            live = snap;
        }
        assert!(!history.can_undo());

        // Redo three times returns exactly to S3.
        for expected in 1..=3 {
            let snap = history.redo().unwrap();
            assert_eq!(snap.room.points.len(), expected);
        }
        assert!(!history.can_redo());
    }

    #[test]
    fn test_branch_truncation() {
        let mut history = History::new();
        history.record(snap_with_points(0));
        history.record(snap_with_points(1));

        history.undo(snap_with_points(2)).unwrap();
        assert!(history.can_redo());

        // A new mutation discards the redo future.
        history.record(snap_with_points(9));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::with_capacity(3);
        for i in 0..5 {
            history.record(snap_with_points(i));
        }
        assert_eq!(history.len(), 3);

        // Entries 0 and 1 were evicted; undo bottoms out at entry 2.
        let mut live = snap_with_points(5);
        let mut applied = Vec::new();
        while let Some(snap) = history.undo(live.clone()) {
            applied.push(snap.room.points.len());
            live = snap;
        }
        assert_eq!(applied, vec![4, 3, 2]);
    }

    #[test]
    fn test_undo_redo_cycle_is_stable() {
        let mut history = History::new();
        history.record(snap_with_points(0));

        let live = snap_with_points(1);
        let undone = history.undo(live.clone()).unwrap();
        assert_eq!(undone.room.points.len(), 0);

        let redone = history.redo().unwrap();
        assert_eq!(redone.room.points.len(), 1);

        // A second cycle behaves identically.
        let undone = history.undo(redone).unwrap();
        assert_eq!(undone.room.points.len(), 0);
        assert_eq!(history.redo().unwrap().room.points.len(), 1);
    }
}
