//! Flow events with a bounded history and passive listeners.
//!
//! The controller emits events while it handles a call and delivers them to
//! listeners just before returning, so listeners always observe a settled
//! state. Delivered events are kept in a fixed-capacity [`EventBuffer`]; the
//! oldest are dropped when it fills.
//!
//! Event kinds can be suppressed via [`FlowEventBus::suppress`]. Suppressed
//! events are neither delivered nor recorded.

use crate::flow::FlowState;
use crate::id::{Cursor, RunId, SpawnHandle};
use crate::resource::{ColorKind, ShapeKind};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    StateChanged {
        from: FlowState,
        to: FlowState,
    },
    EventStarted {
        run: RunId,
        cursor: Cursor,
        name: String,
    },
    ResourceAdded {
        handle: SpawnHandle,
        shape: ShapeKind,
        color: ColorKind,
    },
    ResourceTransformed {
        handle: SpawnHandle,
        shape: ShapeKind,
        color: ColorKind,
    },
    ResourceRemoved {
        handle: SpawnHandle,
    },
    DeliveryReady {
        ready: bool,
    },
    Delivered {
        run: RunId,
    },
    EventCompleted {
        run: RunId,
        cursor: Cursor,
    },
    DayStarted {
        day: usize,
    },
    TimeExpired {
        run: RunId,
    },
    LoopRestarted,
    LoopExhausted,
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowEventKind {
    StateChanged,
    EventStarted,
    ResourceAdded,
    ResourceTransformed,
    ResourceRemoved,
    DeliveryReady,
    Delivered,
    EventCompleted,
    DayStarted,
    TimeExpired,
    LoopRestarted,
    LoopExhausted,
}

const EVENT_KIND_COUNT: usize = 12;

impl FlowEvent {
    pub fn kind(&self) -> FlowEventKind {
        match self {
            FlowEvent::StateChanged { .. } => FlowEventKind::StateChanged,
            FlowEvent::EventStarted { .. } => FlowEventKind::EventStarted,
            FlowEvent::ResourceAdded { .. } => FlowEventKind::ResourceAdded,
            FlowEvent::ResourceTransformed { .. } => FlowEventKind::ResourceTransformed,
            FlowEvent::ResourceRemoved { .. } => FlowEventKind::ResourceRemoved,
            FlowEvent::DeliveryReady { .. } => FlowEventKind::DeliveryReady,
            FlowEvent::Delivered { .. } => FlowEventKind::Delivered,
            FlowEvent::EventCompleted { .. } => FlowEventKind::EventCompleted,
            FlowEvent::DayStarted { .. } => FlowEventKind::DayStarted,
            FlowEvent::TimeExpired { .. } => FlowEventKind::TimeExpired,
            FlowEvent::LoopRestarted => FlowEventKind::LoopRestarted,
            FlowEvent::LoopExhausted => FlowEventKind::LoopExhausted,
        }
    }
}

impl FlowEventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<FlowEvent>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    total_written: u64,
    /// Overwritten since the last clear.
    dropped: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: FlowEvent) {
        let capacity = self.capacity();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        } else {
            self.dropped += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of events overwritten because the buffer was full, since
    /// the last [`clear`](Self::clear).
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &FlowEvent> + '_ {
        // head is the oldest entry once the buffer has wrapped.
        let start = if self.len < self.capacity() { 0 } else { self.head };
        (0..self.len).filter_map(move |i| {
            self.events[(start + i) % self.capacity()].as_ref()
        })
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
        self.dropped = 0;
    }
}

// ---------------------------------------------------------------------------
// FlowEventBus
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&FlowEvent)>;

pub struct FlowEventBus {
    pending: Vec<FlowEvent>,
    history: EventBuffer,
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: Vec<(Option<FlowEventKind>, PassiveListener)>,
}

impl std::fmt::Debug for FlowEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowEventBus")
            .field("pending", &self.pending)
            .field("history", &self.history)
            .field("suppressed", &self.suppressed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FlowEventBus {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: EventBuffer::new(history_capacity),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Vec::new(),
        }
    }

    pub fn suppress(&mut self, kind: FlowEventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn unsuppress(&mut self, kind: FlowEventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: FlowEventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Queue an event for the next delivery. No-op if suppressed.
    pub fn emit(&mut self, event: FlowEvent) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        self.pending.push(event);
    }

    /// Listen to one event kind.
    pub fn on(&mut self, kind: FlowEventKind, listener: PassiveListener) {
        self.listeners.push((Some(kind), listener));
    }

    /// Listen to every event kind.
    pub fn on_any(&mut self, listener: PassiveListener) {
        self.listeners.push((None, listener));
    }

    /// Hand queued events to listeners in emission order, then record them.
    pub fn deliver(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.pending);
        for event in events {
            let kind = event.kind();
            for (filter, listener) in &mut self.listeners {
                if (*filter).is_none_or(|k| k == kind) {
                    listener(&event);
                }
            }
            self.history.push(event);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn history(&self) -> &EventBuffer {
        &self.history
    }

    /// Take every recorded event, oldest first, and empty the history.
    pub fn drain_history(&mut self) -> Vec<FlowEvent> {
        let events: Vec<FlowEvent> = self.history.iter().cloned().collect();
        self.history.clear();
        events
    }
}
