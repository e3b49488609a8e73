//! Bounded undo/redo timeline.
//!
//! The timeline is a linear log, not a tree: committing after an undo throws
//! away everything ahead of the cursor. When a push exceeds the capacity the
//! oldest entry is evicted and the cursor keeps pointing at the entry that was
//! just pushed.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::bitmap::Bitmap;
use crate::filter::FilterState;
use crate::transform::TransformState;

/// Default number of snapshots kept.
pub const DEFAULT_CAPACITY: usize = 20;

/// An immutable snapshot of committed editor state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Base bitmap at commit time. Shared with the session, never mutated.
    pub base: Rc<Bitmap>,
    pub transform: TransformState,
    pub filters: FilterState,
    /// Resize target (width, height) at commit time.
    pub target_size: (u32, u32),
}

/// Ordered snapshots plus a cursor at the current one.
#[derive(Debug, Clone)]
pub struct HistoryTimeline<T = HistoryEntry> {
    entries: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T> Default for HistoryTimeline<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> HistoryTimeline<T> {
    /// Create an empty timeline. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Commit a new entry, discarding any redo branch.
    pub fn push(&mut self, entry: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(entry);

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    /// Index of the current entry. Meaningless on an empty timeline.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
