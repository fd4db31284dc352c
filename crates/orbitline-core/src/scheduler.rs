//! Delayed callbacks for the host layer.
//!
//! The controller never waits. When a transition needs a pause (the beat
//! after a delivery, the alert before a time-up dialog) it asks the host to
//! schedule a [`FlowCallback`] and reacts once the host hands it back via
//! `GameFlowController::on_scheduled`. [`Scheduler`] is a ready-made,
//! cancellable queue hosts can drive from their frame update.

use crate::id::{RunId, TimerHandle};
use slotmap::SlotMap;

/// Work the controller asked to be resumed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowCallback {
    /// Finish the event of this run and move on.
    CompleteEvent(RunId),
    /// Start the time-up dialog for this run.
    ShowTimeUpDialog(RunId),
}

impl FlowCallback {
    pub fn run(&self) -> RunId {
        match self {
            FlowCallback::CompleteEvent(run) | FlowCallback::ShowTimeUpDialog(run) => *run,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    due: f64,
    seq: u64,
    callback: FlowCallback,
}

/// A clock plus a set of pending callbacks.
#[derive(Debug, Default)]
pub struct Scheduler {
    entries: SlotMap<TimerHandle, Entry>,
    now: f64,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since creation.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Queue `callback` to fire `delay` seconds from now. Negative delays
    /// are treated as zero.
    pub fn schedule_after(&mut self, delay: f32, callback: FlowCallback) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(Entry {
            due: self.now + f64::from(delay.max(0.0)),
            seq,
            callback,
        })
    }

    /// Drop a pending callback. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(handle).is_some()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(handle)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Move the clock forward and return every callback now due, earliest
    /// first. Callbacks due at the same instant keep scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<FlowCallback> {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;

        let due: Vec<TimerHandle> = self
            .entries
            .iter()
            .filter(|(_, e)| e.due <= now)
            .map(|(h, _)| h)
            .collect();

        let mut fired: Vec<Entry> = due
            .into_iter()
            .filter_map(|h| self.entries.remove(h))
            .collect();
        fired.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        fired.into_iter().map(|e| e.callback).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(1.0, FlowCallback::CompleteEvent(RunId(1)));

        assert!(scheduler.advance(0.5).is_empty());
        assert_eq!(
            scheduler.advance(0.5),
            vec![FlowCallback::CompleteEvent(RunId(1))]
        );
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(0.0, FlowCallback::ShowTimeUpDialog(RunId(2)));
        assert_eq!(scheduler.advance(0.0).len(), 1);
    }

    #[test]
    fn cancelled_entries_never_fire() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_after(1.0, FlowCallback::CompleteEvent(RunId(1)));
        assert!(scheduler.is_pending(handle));
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.advance(5.0).is_empty());
    }

    #[test]
    fn fires_in_due_order_then_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(2.0, FlowCallback::CompleteEvent(RunId(3)));
        scheduler.schedule_after(1.0, FlowCallback::CompleteEvent(RunId(1)));
        scheduler.schedule_after(1.0, FlowCallback::ShowTimeUpDialog(RunId(2)));

        let fired = scheduler.advance(3.0);
        let runs: Vec<u64> = fired.iter().map(|c| c.run().0).collect();
        assert_eq!(runs, vec![1, 2, 3]);
    }
}
