//! Soft-failure taxonomy.
//!
//! Nothing in the core propagates as a hard failure to the host. Operations
//! that cannot apply return [`Outcome::Ignored`] carrying the reason, after
//! logging it.

use crate::flow::FlowState;
use crate::id::{LineKey, SpawnHandle};

/// Errors raised by [`ProductionLine`](crate::line::ProductionLine).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// The key does not refer to a record currently in the line.
    #[error("no record for line key {0:?}")]
    InvalidIndex(LineKey),
}

/// Why a controller operation was ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// No current day or event. The controller moves to `Exhausted`.
    #[error("no event configured at the current cursor")]
    ConfigurationAbsent,

    /// A resource handle the production line does not know.
    #[error("resource {0:?} is not in the production line")]
    InvalidIndex(SpawnHandle),

    /// The operation is not valid in the current state.
    #[error("{operation} ignored while {state:?}")]
    WrongState {
        operation: &'static str,
        state: FlowState,
    },

    /// A callback for a run that is no longer current, or already completed.
    #[error("stale callback for run {0}")]
    StaleRun(u64),

    /// Accepted input that nothing can act on.
    #[error("no-op: {reason}")]
    NoOpAction { reason: &'static str },
}

impl From<LineError> for FlowError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::InvalidIndex(_) => FlowError::NoOpAction {
                reason: "line key no longer valid",
            },
        }
    }
}

/// Result of a controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(FlowError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    /// The reason an operation was ignored, if it was.
    pub fn reason(&self) -> Option<&FlowError> {
        match self {
            Outcome::Applied => None,
            Outcome::Ignored(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = FlowError::InvalidIndex(SpawnHandle(9));
        assert!(e.to_string().contains("SpawnHandle(9)"));

        let e = FlowError::WrongState {
            operation: "deliver",
            state: FlowState::Idle,
        };
        let msg = e.to_string();
        assert!(msg.contains("deliver"));
        assert!(msg.contains("Idle"));

        let e = FlowError::NoOpAction {
            reason: "demands not satisfied",
        };
        assert!(e.to_string().contains("demands not satisfied"));
    }

    #[test]
    fn outcome_reason() {
        assert!(Outcome::Applied.is_applied());
        assert_eq!(Outcome::Applied.reason(), None);

        let ignored = Outcome::Ignored(FlowError::ConfigurationAbsent);
        assert!(!ignored.is_applied());
        assert_eq!(ignored.reason(), Some(&FlowError::ConfigurationAbsent));
    }

    #[test]
    fn line_error_converts_to_noop() {
        let err: FlowError = LineError::InvalidIndex(LineKey::default()).into();
        assert!(matches!(err, FlowError::NoOpAction { .. }));
    }
}
