// Bounded undo/redo over full topology snapshots
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::model::{Edge, Node};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// A captured `{nodes, edges}` pair. Also the export/import document shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Undo (`past`) and redo (`future`) stacks, each capped at `limit`.
///
/// `past` is ordered oldest → newest; `future` is ordered nearest → farthest,
/// so redo always takes the front entry.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: VecDeque<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            limit,
        }
    }

    /// Record the pre-mutation state. Invalidates redo.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        self.future.clear();
        self.trim_past();
    }

    /// Step back: returns the state to restore, keeping `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop_back()?;
        self.future.push_front(current);
        self.future.truncate(self.limit);
        Some(previous)
    }

    /// Step forward: returns the state to restore, keeping `current` for undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        self.past.push_back(current);
        self.trim_past();
        Some(next)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    #[inline]
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn trim_past(&mut self) {
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
