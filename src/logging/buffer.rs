//! In-memory log buffer for real-time viewing
//!
//! A fixed-capacity circular store of the most recent records, used by UIs
//! to render a scrollback. Oldest records are overwritten first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::level::LogLevel;
use super::listener::LogListener;
use super::message::LogMessage;

struct Ring {
    slots: Vec<Option<LogMessage>>,
    /// Slot the next record is written to
    cursor: usize,
    /// Valid records, at most the capacity
    held: usize,
    /// Records ever received; never wraps
    count: u64,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        self.held
    }

    /// Slot holding the `i`-th oldest valid record
    fn slot_of(&self, i: usize) -> usize {
        let capacity = self.capacity();
        (self.cursor + capacity - self.len() + i) % capacity
    }

    fn get(&self, i: usize) -> Option<&LogMessage> {
        if i >= self.len() {
            return None;
        }
        self.slots[self.slot_of(i)].as_ref()
    }
}

/// Thread-safe ring buffer of recent log records
pub struct RingBufferSink {
    ring: RwLock<Ring>,
    enabled: AtomicBool,
}

impl RingBufferSink {
    /// Create a buffer with room for `capacity` records (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: RwLock::new(Ring {
                slots: vec![None; capacity],
                cursor: 0,
                held: 0,
                count: 0,
            }),
            enabled: AtomicBool::new(true),
        }
    }

    /// Maximum number of records retained
    pub fn capacity(&self) -> usize {
        self.ring.read().map(|r| r.capacity()).unwrap_or(0)
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.ring.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total records ever received, independent of wraparound
    pub fn total_count(&self) -> u64 {
        self.ring.read().map(|r| r.count).unwrap_or(0)
    }

    /// Logical index of the `i`-th held record
    ///
    /// Logical indices count every record ever received, so a UI can tell
    /// which records scrolled out between two reads.
    pub fn logical_index(&self, i: usize) -> u64 {
        self.ring
            .read()
            .map(|r| r.count - r.len() as u64 + i as u64)
            .unwrap_or(0)
    }

    /// Body of the `i`-th held record, oldest first
    pub fn text_at(&self, i: usize) -> Option<String> {
        self.ring
            .read()
            .ok()
            .and_then(|r| r.get(i).map(|m| m.msg.clone()))
    }

    /// Severity of the `i`-th held record, oldest first
    pub fn level_at(&self, i: usize) -> Option<LogLevel> {
        self.ring.read().ok().and_then(|r| r.get(i).map(|m| m.level))
    }

    /// Snapshot of all held records in chronological order
    pub fn entries(&self) -> Vec<LogMessage> {
        self.ring
            .read()
            .map(|r| (0..r.len()).filter_map(|i| r.get(i).cloned()).collect())
            .unwrap_or_default()
    }

    /// Drop all held records; the total count is kept
    pub fn clear(&self) {
        if let Ok(mut ring) = self.ring.write() {
            ring.slots.iter_mut().for_each(|s| *s = None);
            ring.held = 0;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

impl LogListener for RingBufferSink {
    fn log(&self, message: &LogMessage) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut ring) = self.ring.write() {
            let cursor = ring.cursor;
            ring.slots[cursor] = Some(message.clone());
            ring.cursor = (cursor + 1) % ring.capacity();
            ring.held = (ring.held + 1).min(ring.capacity());
            ring.count += 1;
        }
    }
}
