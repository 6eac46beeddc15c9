// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trail-based rollback.
//!
//! A trail records the old value of every piece of state before it is
//! overwritten. Rewinding to an earlier position replays those records in
//! reverse, restoring the state exactly as it was. The scorer uses this for
//! its bookmarks: a bookmark is just a trail position.
//!
//! [`Trail::revert_to`] reaches the same state without truncating, so
//! checkpoints taken after the target survive.
//!
//! Positions are absolute. [`Trail::freeze`] forgets the history before a
//! position, after which rewinding past it is no longer possible.
//!
//! ```
//! use causal_search::trail::Trail;
//!
//! let mut value = 1;
//! let mut trail = Trail::new();
//! let start = trail.position();
//! trail.record(value);
//! value = 2;
//! trail.record(value);
//! value = 3;
//! assert!(trail.rewind_to(start, |old| value = old));
//! assert_eq!(value, 1);
//! ```

/// An undo log over entries of type `E`.
#[derive(Debug, Clone)]
pub struct Trail<E> {
    entries: Vec<E>,
    /// Absolute position of `entries[0]`.
    offset: usize,
}

impl<E> Trail<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            offset: 0,
        }
    }

    /// Record an undo entry.
    pub fn record(&mut self, entry: E) {
        self.entries.push(entry);
    }

    /// Current absolute position, usable as a checkpoint.
    pub fn position(&self) -> usize {
        self.offset + self.entries.len()
    }

    /// Oldest position that can still be rewound to.
    pub fn frozen_at(&self) -> usize {
        self.offset
    }

    /// Undo every entry after `position`, newest first.
    ///
    /// Returns false, and does nothing, if `position` is in the future or
    /// before the frozen point.
    pub fn rewind_to(&mut self, position: usize, mut undo: impl FnMut(E)) -> bool {
        if position < self.offset || position > self.position() {
            return false;
        }
        let keep = position - self.offset;
        while self.entries.len() > keep {
            if let Some(entry) = self.entries.pop() {
                undo(entry);
            }
        }
        true
    }

    /// Return to the state at `position` while keeping every later position
    /// reachable.
    ///
    /// `undo` applies an entry and returns the entry that reverses it. Those
    /// reversing entries are appended, so the history stays linear: a later
    /// rewind to any position after `position` replays them first. Returns
    /// false, and does nothing, under the same conditions as
    /// [`Self::rewind_to`].
    pub fn revert_to(&mut self, position: usize, mut undo: impl FnMut(&E) -> E) -> bool {
        if position < self.offset || position > self.position() {
            return false;
        }
        let keep = position - self.offset;
        let redo: Vec<E> = self.entries[keep..].iter().rev().map(&mut undo).collect();
        self.entries.extend(redo);
        true
    }

    /// Forget history before `position`.
    pub fn freeze(&mut self, position: usize) {
        let position = position.min(self.position());
        if position > self.offset {
            self.entries.drain(..position - self.offset);
            self.offset = position;
        }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Trail<E> {
    fn default() -> Self {
        Self::new()
    }
}
