//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::config::FlowConfig;
use crate::flow::GameFlowController;
use crate::host::*;
use crate::id::{RunId, SpawnHandle, TimerHandle};
use crate::layout::{LayoutParameters, SpawnPlan};
use crate::resource::{ColorKind, Demand, MachineKind, ShapeKind};
use crate::scheduler::{FlowCallback, Scheduler};
use crate::timeline::{Day, EventConfig, Loop};

// ===========================================================================
// Recording host
// ===========================================================================

/// Every call the controller made into the host, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    RequestSpawn { resources: usize, machines: usize },
    ClearSpawned,
    SetMachinesLocked(bool),
    StartTimer(f32),
    StopTimer,
    StartNarrative(String, RunId),
    StartDialog(String, RunId),
    GotoMenu,
    GotoDay,
    GotoLevel,
    GotoLoop,
    GotoNarrativeScene,
    Schedule(f32, FlowCallback),
    Cancel(TimerHandle),
    SetDeliveryReady(bool),
}

/// A host that records calls and drives a real [`Scheduler`].
#[derive(Debug)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub scheduler: Scheduler,
    pub time_remaining: bool,
    pub last_plan: Option<SpawnPlan>,
    next_handle: u64,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            scheduler: Scheduler::new(),
            time_remaining: true,
            last_plan: None,
            next_handle: 1,
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn narratives(&self) -> Vec<(String, RunId)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::StartNarrative(key, run) => Some((key.clone(), *run)),
                _ => None,
            })
            .collect()
    }

    pub fn dialogs(&self) -> Vec<(String, RunId)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::StartDialog(key, run) => Some((key.clone(), *run)),
                _ => None,
            })
            .collect()
    }
}

impl SpawnLayer for RecordingHost {
    fn request_spawn(&mut self, plan: &SpawnPlan) -> Vec<SpawnHandle> {
        self.calls.push(HostCall::RequestSpawn {
            resources: plan.resources.positions.len(),
            machines: plan.machines.placements.len(),
        });
        self.last_plan = Some(plan.clone());
        let start = self.next_handle;
        self.next_handle += plan.resources.positions.len() as u64;
        (start..self.next_handle).map(SpawnHandle).collect()
    }

    fn clear_spawned(&mut self) {
        self.calls.push(HostCall::ClearSpawned);
    }

    fn set_machines_locked(&mut self, locked: bool) {
        self.calls.push(HostCall::SetMachinesLocked(locked));
    }
}

impl GameTimer for RecordingHost {
    fn start_timer(&mut self, seconds: f32) {
        self.calls.push(HostCall::StartTimer(seconds));
    }

    fn stop_timer(&mut self) {
        self.calls.push(HostCall::StopTimer);
    }

    fn is_time_remaining(&self) -> bool {
        self.time_remaining
    }
}

impl NarrativeDriver for RecordingHost {
    fn start_narrative(&mut self, text_key: &str, run: RunId) {
        self.calls
            .push(HostCall::StartNarrative(text_key.to_string(), run));
    }
}

impl DialogDriver for RecordingHost {
    fn start_dialog(&mut self, cutscene_key: &str, run: RunId) {
        self.calls
            .push(HostCall::StartDialog(cutscene_key.to_string(), run));
    }
}

impl SceneDirector for RecordingHost {
    fn goto_menu(&mut self) {
        self.calls.push(HostCall::GotoMenu);
    }
    fn goto_day(&mut self) {
        self.calls.push(HostCall::GotoDay);
    }
    fn goto_level(&mut self) {
        self.calls.push(HostCall::GotoLevel);
    }
    fn goto_loop(&mut self) {
        self.calls.push(HostCall::GotoLoop);
    }
    fn goto_narrative_scene(&mut self) {
        self.calls.push(HostCall::GotoNarrativeScene);
    }
}

impl CallbackScheduler for RecordingHost {
    fn schedule_after(&mut self, seconds: f32, callback: FlowCallback) -> TimerHandle {
        self.calls.push(HostCall::Schedule(seconds, callback));
        self.scheduler.schedule_after(seconds, callback)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.calls.push(HostCall::Cancel(handle));
        self.scheduler.cancel(handle);
    }
}

impl DeliveryPanel for RecordingHost {
    fn set_delivery_ready(&mut self, ready: bool) {
        self.calls.push(HostCall::SetDeliveryReady(ready));
    }
}

// ===========================================================================
// Controller helpers
// ===========================================================================

pub type TestController = GameFlowController<RecordingHost>;

pub fn controller() -> TestController {
    GameFlowController::new(RecordingHost::new(), FlowConfig::default())
}

pub fn controller_with(config: FlowConfig) -> TestController {
    GameFlowController::new(RecordingHost::new(), config)
}

/// Advance the host's scheduler and feed due callbacks to the controller.
pub fn pump(controller: &mut TestController, dt: f32) -> usize {
    let due = controller.host_mut().scheduler.advance(dt);
    let fired = due.len();
    for callback in due {
        let _ = controller.on_scheduled(callback);
    }
    fired
}

// ===========================================================================
// Data constructors
// ===========================================================================

pub fn demand(shape: ShapeKind, color: ColorKind) -> Demand {
    Demand::new(shape, color)
}

pub fn red_circle() -> Demand {
    demand(ShapeKind::Circle, ColorKind::Red)
}

pub fn blue_square() -> Demand {
    demand(ShapeKind::Square, ColorKind::Blue)
}

pub fn small_layout(objects: usize) -> LayoutParameters {
    LayoutParameters::new(objects, 2.0, 0.5).with_machines(vec![
        MachineKind::Shapeshifter(ShapeKind::Square),
        MachineKind::Huehopper(ColorKind::Blue),
    ])
}

pub fn gameplay(name: &str, demands: Vec<Demand>) -> EventConfig {
    EventConfig::gameplay(name, demands, small_layout(4))
}

pub fn narrative(name: &str) -> EventConfig {
    EventConfig::narrative(name, format!("{name}_text"))
}

pub fn dialog(name: &str) -> EventConfig {
    EventConfig::dialog(name, format!("{name}_cutscene"))
}

/// A loop with one day holding `events`.
pub fn single_day_loop(events: Vec<EventConfig>) -> Loop {
    Loop::new("loop", vec![Day::new("day", events)])
}
