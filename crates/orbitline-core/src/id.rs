use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a record in a [`ProductionLine`](crate::line::ProductionLine).
    /// Generational, so a key never aliases a record appended after removal.
    pub struct LineKey;

    /// Identifies a pending entry in a [`Scheduler`](crate::scheduler::Scheduler).
    pub struct TimerHandle;
}

/// Correlation handle issued by the host's spawn layer for one resource
/// visual. Opaque to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpawnHandle(pub u64);

/// Identifies one execution of an event. Every call to
/// `run_current_event` issues a fresh id; callbacks carrying an older id
/// are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> Self {
        RunId(self.0 + 1)
    }
}

/// Position of the timeline cursor inside the current loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub day: usize,
    pub event: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_next_increments() {
        assert_eq!(RunId(0).next(), RunId(1));
        assert_eq!(RunId(41).next().next(), RunId(43));
    }

    #[test]
    fn spawn_handles_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(SpawnHandle(7), "orb");
        assert_eq!(map[&SpawnHandle(7)], "orb");
    }

    #[test]
    fn cursor_defaults_to_origin() {
        assert_eq!(Cursor::default(), Cursor { day: 0, event: 0 });
    }
}
