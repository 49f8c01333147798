//! The UI seam.
//!
//! The session never renders anything itself. It pushes readings, status
//! changes, trigger state, and log entries into a [`Presenter`], which the
//! CLI and TUI implement in their own way.

use std::collections::VecDeque;

use crate::model::{Affordance, LogEntry, Reading, StatusKind};

/// Display surface driven by the session.
pub trait Presenter: Send {
    /// Overwrite the temperature and humidity readouts.
    fn show_reading(&mut self, reading: &Reading);

    /// Overwrite the status text and its visual tag.
    fn set_status(&mut self, text: &str, kind: StatusKind);

    /// Append a timestamped entry to the log and scroll to it.
    fn append_log(&mut self, entry: LogEntry);

    /// Update the connect/disconnect trigger.
    fn set_affordance(&mut self, _affordance: Affordance) {}
}

/// Bounded log history. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogBuffer {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_order() {
        let mut log = LogBuffer::new(10);
        log.push(LogEntry::now("first"));
        log.push(LogEntry::now("second"));
        let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(log.latest().unwrap().message, "second");
    }

    #[test]
    fn oldest_entries_are_evicted_at_capacity() {
        let mut log = LogBuffer::new(3);
        for i in 0..5 {
            log.push(LogEntry::now(format!("line {i}")));
        }
        assert_eq!(log.len(), 3);
        let messages: Vec<_> = log.iter().map(|e| e.message.clone()).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = LogBuffer::new(0);
        assert_eq!(log.capacity(), 1);
        log.push(LogEntry::now("a"));
        log.push(LogEntry::now("b"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().unwrap().message, "b");
    }
}
