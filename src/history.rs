use std::collections::VecDeque;

use log::{debug, trace};

/// Default number of undo steps kept
pub const DEFAULT_MAX_DEPTH: usize = 300;

/// Snapshot-based undo/redo history.
///
/// Each entry is a full copy of the state taken before a mutating operation.
/// Stored entries are independent of the live state, so later edits never
/// reach back into history.
#[derive(Debug, Clone)]
pub struct History<T> {
    /// Oldest entry at the front
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    max_depth: usize,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl<T: Clone> History<T> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Records the state before a new operation and drops everything that could be redone.
    pub fn push(&mut self, snapshot: T) {
        self.push_undo(snapshot);
        self.redo_stack.clear();
        debug!("History snapshot taken ({} undo entries)", self.undo_stack.len());
    }

    fn push_undo(&mut self, snapshot: T) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
            trace!("History full, evicted oldest entry");
        }
    }

    /// Steps back one entry. The current state moves onto the redo stack.
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Re-applies the most recently undone entry.
    pub fn redo(&mut self, current: &T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Changes the bound, evicting the oldest entries if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
