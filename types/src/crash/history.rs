use serde::{Serialize, Serializer};
use std::collections::VecDeque;

use super::{RoundResult, HISTORY_CAPACITY};

/// Fixed-capacity ring of recent rounds, most recent first.
#[derive(Clone, Debug, PartialEq)]
pub struct History {
    entries: VecDeque<RoundResult>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Insert at the front, evicting the oldest entry once full.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, result: RoundResult) -> Option<RoundResult> {
        self.entries.push_front(result);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn latest(&self) -> Option<&RoundResult> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<RoundResult> {
        self.entries.iter().copied().collect()
    }
}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}
