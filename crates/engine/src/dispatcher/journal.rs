//! Bounded history of dispatch results for diagnostic tooling.

use chordchain_types::ChainExecutionResult;
use std::collections::VecDeque;

/// Default number of results kept when no capacity is configured.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 32;

/// Ring buffer of the most recent dispatch results, oldest first.
#[derive(Debug)]
pub struct DispatchJournal {
    buffer: VecDeque<ChainExecutionResult>,
    max_size: usize,
}

impl Default for DispatchJournal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_CAPACITY)
    }
}

impl DispatchJournal {
    /// `max_size` only bounds eviction; the buffer grows on demand.
    pub fn new(max_size: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(max_size.min(DEFAULT_JOURNAL_CAPACITY)),
            max_size,
        }
    }

    /// Appends a result, evicting the oldest one when full. A zero-capacity
    /// journal keeps nothing.
    pub fn record(&mut self, result: &ChainExecutionResult) {
        if self.max_size == 0 {
            return;
        }
        if self.buffer.len() >= self.max_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(result.clone());
    }

    /// The `count` most recent results, oldest first.
    pub fn recent(&self, count: usize) -> Vec<ChainExecutionResult> {
        let start = self.buffer.len().saturating_sub(count);
        self.buffer.iter().skip(start).cloned().collect()
    }

    pub fn last(&self) -> Option<&ChainExecutionResult> {
        self.buffer.back()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Changes the capacity, dropping the oldest results that no longer fit.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.buffer.len() > max_size {
            self.buffer.pop_front();
        }
    }
}
