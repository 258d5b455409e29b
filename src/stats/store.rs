//! Time-series storage for control-plane events
//!
//! Stores historical stream events with automatic cleanup of old data.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::milan::registry::StreamKey;

/// Maximum number of events to keep in history
const MAX_EVENT_HISTORY: usize = 1024;

/// Kind of control-plane event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Stream passed compliance and was enabled
    Enabled,
    /// Enable was rejected by the compliance gate
    EnableRejected,
    /// Stream connected
    Connected,
    /// Connect was rejected (wrong state or non-compliant)
    ConnectRejected,
    /// Stream disconnected back to enabled
    Disconnected,
    /// Stream was reset to disabled
    Disabled,
    /// An error was reported with the given code
    ErrorReported(u32),
    /// A redundant pair was bound (recorded against the primary)
    PairBound,
}

/// A single recorded event
#[derive(Debug, Clone)]
pub struct StreamEvent {
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Stream the event belongs to
    pub key: StreamKey,
    /// What happened
    pub kind: EventKind,
}

/// Capped history of control-plane events
///
/// Oldest events are dropped once the cap is reached.
#[derive(Debug)]
pub struct EventLog {
    events: VecDeque<StreamEvent>,
    max_size: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create an event log with the default cap
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENT_HISTORY)
    }

    /// Create an event log with an explicit cap
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_size.min(MAX_EVENT_HISTORY)),
            max_size,
        }
    }

    /// Record an event, timestamped now
    pub fn record(&mut self, key: StreamKey, kind: EventKind) {
        self.events.push_back(StreamEvent {
            timestamp: Utc::now(),
            key,
            kind,
        });
        while self.events.len() > self.max_size {
            self.events.pop_front();
        }
    }

    /// Iterate events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &StreamEvent> {
        self.events.iter()
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<&StreamEvent> {
        self.events.back()
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of retained events for one stream
    pub fn count_for(&self, key: StreamKey) -> usize {
        self.events.iter().filter(|e| e.key == key).count()
    }

    /// Drop all retained events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
