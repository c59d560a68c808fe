//! Bounded undo/redo history of full-document snapshots.

use std::collections::VecDeque;

use tracing::trace;

/// Default number of snapshots kept on the undo stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Undo and redo stacks of structured-markup snapshots.
///
/// The top of the undo stack is the current state. The undo stack never
/// holds more than `capacity` entries; the oldest is evicted silently.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<String>,
    redo_stack: Vec<String>,
    capacity: usize,
}

impl History {
    /// Create an empty history. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    /// Push a snapshot unless it equals the current top.
    ///
    /// A push clears the redo stack. Returns `true` if a push happened.
    pub fn save_state(&mut self, snapshot: &str) -> bool {
        if self.undo_stack.back().is_some_and(|top| top == snapshot) {
            return false;
        }
        self.undo_stack.push_back(snapshot.to_string());
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        trace!(depth = self.undo_stack.len(), "history: saved state");
        true
    }

    /// Step back one snapshot and return the new current state.
    ///
    /// Returns `None` without changing anything when only the floor entry
    /// (or nothing) is left.
    pub fn undo(&mut self) -> Option<&str> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let top = self.undo_stack.pop_back()?;
        self.redo_stack.push(top);
        self.undo_stack.back().map(String::as_str)
    }

    /// Re-apply the most recently undone snapshot and return it.
    pub fn redo(&mut self) -> Option<&str> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push_back(snapshot);
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.back().map(String::as_str)
    }

    /// The current state (top of the undo stack).
    pub fn current(&self) -> Option<&str> {
        self.undo_stack.back().map(String::as_str)
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Snapshots on the undo stack, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().map(String::as_str)
    }

    /// Drop everything and start over from a single floor snapshot.
    pub fn reset(&mut self, floor: &str) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push_back(floor.to_string());
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
