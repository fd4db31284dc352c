//! Seams to the engine-side layer.
//!
//! The controller owns one value implementing [`FlowHost`] and calls into it
//! whenever a transition needs rendering, audio, scene changes or timing.
//! Each concern is its own trait so hosts can implement them on separate
//! components and tests can stub only what they observe. Every method is
//! fire-and-forget except the spawn request and timer query.

use crate::id::{RunId, SpawnHandle, TimerHandle};
use crate::layout::SpawnPlan;
use crate::scheduler::FlowCallback;

/// Creates and removes the visuals for a gameplay event.
pub trait SpawnLayer {
    /// Create resources and machines for `plan`. Returns the correlation
    /// handles later passed to `on_resource_produced`.
    fn request_spawn(&mut self, plan: &SpawnPlan) -> Vec<SpawnHandle>;

    /// Remove everything spawned for the current event.
    fn clear_spawned(&mut self);

    /// Lock or unlock machine interaction.
    fn set_machines_locked(&mut self, locked: bool);
}

/// Countdown for gameplay events. Expiry is reported back through
/// `GameFlowController::on_time_expired`.
pub trait GameTimer {
    fn start_timer(&mut self, seconds: f32);
    fn stop_timer(&mut self);
    fn is_time_remaining(&self) -> bool;
}

/// Shows narrative text. Calls `on_narrative_complete(run)` when done.
pub trait NarrativeDriver {
    fn start_narrative(&mut self, text_key: &str, run: RunId);
}

/// Plays cutscenes. Calls `on_dialog_complete(run)` when done.
pub trait DialogDriver {
    fn start_dialog(&mut self, cutscene_key: &str, run: RunId);
}

/// Scene transitions.
pub trait SceneDirector {
    fn goto_menu(&mut self);
    fn goto_day(&mut self);
    fn goto_level(&mut self);
    fn goto_loop(&mut self);
    fn goto_narrative_scene(&mut self);
}

/// Delayed callbacks. Fired callbacks go to `on_scheduled`.
pub trait CallbackScheduler {
    fn schedule_after(&mut self, seconds: f32, callback: FlowCallback) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// The player-facing "Deliver" button.
pub trait DeliveryPanel {
    fn set_delivery_ready(&mut self, ready: bool);
}

/// Everything the controller needs from its host.
pub trait FlowHost:
    SpawnLayer + GameTimer + NarrativeDriver + DialogDriver + SceneDirector + CallbackScheduler + DeliveryPanel
{
}

impl<T> FlowHost for T where
    T: SpawnLayer
        + GameTimer
        + NarrativeDriver
        + DialogDriver
        + SceneDirector
        + CallbackScheduler
        + DeliveryPanel
{
}
