//! Controller tuning.

use crate::layout::LayoutTuning;
use serde::{Deserialize, Serialize};

/// What happens once the time-up dialog finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeUpPolicy {
    /// Rewind the timeline to the start of the loop.
    #[default]
    RestartLoop,
    /// Run the same event again.
    RetryEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Pause between a delivery and the next event, in seconds.
    pub delivery_delay: f32,
    /// Pause between time running out and the time-up dialog, in seconds.
    pub time_up_dialog_delay: f32,
    pub time_up_policy: TimeUpPolicy,
    /// Number of delivered flow events kept in history.
    pub event_history_capacity: usize,
    pub layout: LayoutTuning,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            delivery_delay: 0.0,
            time_up_dialog_delay: 0.0,
            time_up_policy: TimeUpPolicy::default(),
            event_history_capacity: 256,
            layout: LayoutTuning::default(),
        }
    }
}

impl FlowConfig {
    pub fn with_delivery_delay(mut self, seconds: f32) -> Self {
        self.delivery_delay = seconds;
        self
    }

    pub fn with_time_up_dialog_delay(mut self, seconds: f32) -> Self {
        self.time_up_dialog_delay = seconds;
        self
    }

    pub fn with_time_up_policy(mut self, policy: TimeUpPolicy) -> Self {
        self.time_up_policy = policy;
        self
    }
}
