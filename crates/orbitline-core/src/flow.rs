//! The game flow state machine.
//!
//! [`GameFlowController`] walks the [`EventTimeline`], runs each event through
//! its host, collects produced resources into a [`ProductionLine`] and gates
//! delivery on the active demand set.
//!
//! # States
//!
//! ```text
//!            run_current_event
//!   Idle ───────────────┬──────────────┬─────────────────┐
//!                       ▼              ▼                 ▼
//!              RunningNarrative  RunningGameplay   RunningDialog
//!                       │              │ deliver()       │
//!                       │              │ on_time_expired ┘ (time-up interrupt)
//!                       └── complete ──┴── advance ──► next event / Exhausted
//! ```
//!
//! # Runs
//!
//! Every event execution gets a fresh [`RunId`]. Host callbacks carry the
//! run they belong to, and a run completes at most once, so a duplicated or
//! late callback can never advance the timeline twice.
//!
//! # Soft failures
//!
//! Operations that do not apply in the current state return
//! [`Outcome::Ignored`] and log; nothing panics or propagates.

use crate::config::{FlowConfig, TimeUpPolicy};
use crate::error::{FlowError, LineError, Outcome};
use crate::event::{FlowEvent, FlowEventBus};
use crate::host::FlowHost;
use crate::id::{LineKey, RunId, SpawnHandle, TimerHandle};
use crate::layout::{LayoutParameters, plan_event};
use crate::line::ProductionLine;
use crate::matcher::{self, MatchMode};
use crate::resource::{ColorKind, Demand, MachineKind, ResourceRecord, ShapeKind};
use crate::scheduler::FlowCallback;
use crate::timeline::{Advance, EventConfig, EventKind, EventTimeline, Loop};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    /// Nothing running, or waiting for a scheduled completion.
    Idle,
    RunningNarrative,
    RunningGameplay,
    RunningDialog,
    /// The loop has no more events.
    Exhausted,
}

fn ignored(err: FlowError) -> Outcome {
    match err {
        FlowError::InvalidIndex(_) => log::warn!("{err}"),
        _ => log::debug!("{err}"),
    }
    Outcome::Ignored(err)
}

pub struct GameFlowController<H: FlowHost> {
    host: H,
    config: FlowConfig,
    timeline: EventTimeline,
    state: FlowState,
    run: RunId,
    /// Most recent run whose completion has been processed.
    completed_run: Option<RunId>,

    active_demands: Vec<Demand>,
    match_mode: MatchMode,
    line: ProductionLine,
    spawned: Vec<SpawnHandle>,
    spawn_active: bool,
    timed: bool,
    delivery_ready: bool,
    machines_locked: bool,

    /// The running dialog is a time-up interrupt, not an authored event.
    time_up: bool,
    /// The time-up dialog has been handed to the host.
    time_up_dialog_shown: bool,
    /// `complete_current_event` applied and no other input arrived since.
    completion_settled: bool,
    pending_timer: Option<TimerHandle>,
    events: FlowEventBus,
}

impl<H: FlowHost> std::fmt::Debug for GameFlowController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameFlowController")
            .field("state", &self.state)
            .field("run", &self.run)
            .field("cursor", &self.timeline.cursor())
            .field("line_len", &self.line.len())
            .field("delivery_ready", &self.delivery_ready)
            .field("time_up", &self.time_up)
            .finish_non_exhaustive()
    }
}

impl<H: FlowHost> GameFlowController<H> {
    pub fn new(host: H, config: FlowConfig) -> Self {
        let events = FlowEventBus::new(config.event_history_capacity);
        Self {
            host,
            config,
            timeline: EventTimeline::default(),
            state: FlowState::Idle,
            run: RunId(0),
            completed_run: None,
            active_demands: Vec::new(),
            match_mode: MatchMode::default(),
            line: ProductionLine::new(),
            spawned: Vec::new(),
            spawn_active: false,
            timed: false,
            delivery_ready: false,
            machines_locked: false,
            time_up: false,
            time_up_dialog_shown: false,
            completion_settled: false,
            pending_timer: None,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn current_run(&self) -> RunId {
        self.run
    }

    pub fn timeline(&self) -> &EventTimeline {
        &self.timeline
    }

    pub fn current_event(&self) -> Option<&EventConfig> {
        self.timeline.current_event()
    }

    pub fn line(&self) -> &ProductionLine {
        &self.line
    }

    pub fn active_demands(&self) -> &[Demand] {
        &self.active_demands
    }

    /// Demands the current line does not cover yet.
    pub fn missing_demands(&self) -> Vec<Demand> {
        matcher::missing_demands(&self.line.snapshot(), &self.active_demands)
    }

    /// Handles returned by the last spawn request.
    pub fn spawned(&self) -> &[SpawnHandle] {
        &self.spawned
    }

    pub fn is_delivery_ready(&self) -> bool {
        self.delivery_ready
    }

    pub fn machines_locked(&self) -> bool {
        self.machines_locked
    }

    pub fn is_time_up_interrupt(&self) -> bool {
        self.time_up
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn events(&self) -> &FlowEventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut FlowEventBus {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Timeline control
    // -----------------------------------------------------------------------

    /// Install a loop and run its first event.
    pub fn start_loop(&mut self, new_loop: Loop) -> Outcome {
        log::info!("starting loop '{}'", new_loop.name);
        self.completion_settled = false;
        self.interrupt_current();
        self.timeline.set_loop(new_loop);
        let outcome = self.enter_loop();
        self.flush();
        outcome
    }

    /// Rewind to the first event of the current loop. `completed` flags
    /// are kept.
    pub fn restart_loop(&mut self) -> Outcome {
        self.completion_settled = false;
        self.interrupt_current();
        self.timeline.restart();
        self.events.emit(FlowEvent::LoopRestarted);
        let outcome = self.enter_loop();
        self.flush();
        outcome
    }

    /// Start whatever event the cursor points at.
    pub fn run_current_event(&mut self) -> Outcome {
        self.completion_settled = false;
        self.interrupt_current();
        let outcome = self.start_current();
        self.flush();
        outcome
    }

    /// Skip the current event without marking it completed.
    pub fn advance_event(&mut self) -> Outcome {
        self.completion_settled = false;
        if self.state == FlowState::Exhausted {
            return ignored(FlowError::WrongState {
                operation: "advance_event",
                state: self.state,
            });
        }
        self.interrupt_current();
        self.advance_cursor();
        let outcome = self.start_current();
        self.flush();
        outcome
    }

    /// Complete the current run and move on.
    ///
    /// A repeated call with no other input in between is ignored, so the
    /// timeline advances once however often this is called.
    pub fn complete_current_event(&mut self) -> Outcome {
        if self.completion_settled {
            return ignored(FlowError::StaleRun(self.run.0));
        }
        let run = self.run;
        let outcome = self.finish_run(run);
        self.completion_settled = outcome.is_applied();
        self.flush();
        outcome
    }

    /// Complete `run` if it is still current. A run completes at most once.
    pub fn complete_run(&mut self, run: RunId) -> Outcome {
        self.completion_settled = false;
        let outcome = self.finish_run(run);
        self.flush();
        outcome
    }

    // -----------------------------------------------------------------------
    // Host callbacks
    // -----------------------------------------------------------------------

    pub fn on_narrative_complete(&mut self, run: RunId) -> Outcome {
        self.completion_settled = false;
        if self.state != FlowState::RunningNarrative {
            return ignored(FlowError::WrongState {
                operation: "on_narrative_complete",
                state: self.state,
            });
        }
        self.complete_run(run)
    }

    pub fn on_dialog_complete(&mut self, run: RunId) -> Outcome {
        self.completion_settled = false;
        if self.state != FlowState::RunningDialog {
            return ignored(FlowError::WrongState {
                operation: "on_dialog_complete",
                state: self.state,
            });
        }
        if run != self.run {
            return ignored(FlowError::StaleRun(run.0));
        }
        if self.time_up && !self.time_up_dialog_shown {
            return ignored(FlowError::NoOpAction {
                reason: "time-up dialog not shown yet",
            });
        }
        let outcome = if self.time_up {
            self.resolve_time_up()
        } else {
            self.finish_run(run)
        };
        self.flush();
        outcome
    }

    /// A callback scheduled through the host has fired.
    pub fn on_scheduled(&mut self, callback: FlowCallback) -> Outcome {
        self.completion_settled = false;
        if callback.run() != self.run {
            return ignored(FlowError::StaleRun(callback.run().0));
        }
        self.pending_timer = None;
        let outcome = match callback {
            FlowCallback::CompleteEvent(run) => self.finish_run(run),
            FlowCallback::ShowTimeUpDialog(run) => {
                if self.state == FlowState::RunningDialog && self.time_up {
                    self.show_time_up_dialog(run);
                    Outcome::Applied
                } else {
                    ignored(FlowError::WrongState {
                        operation: "show_time_up_dialog",
                        state: self.state,
                    })
                }
            }
        };
        self.flush();
        outcome
    }

    /// A resource entered the production line.
    pub fn on_resource_produced(
        &mut self,
        handle: SpawnHandle,
        shape: ShapeKind,
        color: ColorKind,
    ) -> Outcome {
        self.completion_settled = false;
        if let Err(err) = self.require_gameplay("on_resource_produced") {
            return ignored(err);
        }
        if self.line.contains(handle) {
            return ignored(FlowError::NoOpAction {
                reason: "resource already in line",
            });
        }
        self.line.append(ResourceRecord::new(handle, shape, color));
        self.events.emit(FlowEvent::ResourceAdded {
            handle,
            shape,
            color,
        });
        self.refresh_delivery();
        self.flush();
        Outcome::Applied
    }

    /// A machine rewrote part of a resource's classification.
    pub fn on_machine_transform(
        &mut self,
        handle: SpawnHandle,
        shape: Option<ShapeKind>,
        color: Option<ColorKind>,
    ) -> Outcome {
        self.transform_resource("on_machine_transform", handle, |line, key| {
            line.update_at(key, shape, color)
        })
    }

    /// Run a resource through a machine of the given kind.
    pub fn on_machine_applied(&mut self, handle: SpawnHandle, machine: MachineKind) -> Outcome {
        self.transform_resource("on_machine_applied", handle, |line, key| {
            line.apply_machine(key, machine)
        })
    }

    fn transform_resource(
        &mut self,
        operation: &'static str,
        handle: SpawnHandle,
        apply: impl FnOnce(&mut ProductionLine, LineKey) -> Result<bool, LineError>,
    ) -> Outcome {
        self.completion_settled = false;
        if let Err(err) = self.require_gameplay(operation) {
            return ignored(err);
        }
        if self.machines_locked {
            return ignored(FlowError::NoOpAction {
                reason: "machines are locked",
            });
        }
        let Some(key) = self.line.key_of(handle) else {
            return ignored(FlowError::InvalidIndex(handle));
        };
        if let Err(err) = apply(&mut self.line, key) {
            return ignored(err.into());
        }
        if let Some(record) = self.line.get(key) {
            self.events.emit(FlowEvent::ResourceTransformed {
                handle,
                shape: record.shape,
                color: record.color,
            });
        }
        self.refresh_delivery();
        self.flush();
        Outcome::Applied
    }

    /// A resource left the line without being delivered.
    pub fn on_resource_removed(&mut self, handle: SpawnHandle) -> Outcome {
        self.completion_settled = false;
        if let Err(err) = self.require_gameplay("on_resource_removed") {
            return ignored(err);
        }
        let Some(key) = self.line.key_of(handle) else {
            return ignored(FlowError::InvalidIndex(handle));
        };
        if let Err(err) = self.line.remove_at(key) {
            return ignored(err.into());
        }
        self.events.emit(FlowEvent::ResourceRemoved { handle });
        self.refresh_delivery();
        self.flush();
        Outcome::Applied
    }

    /// The gameplay timer ran out. Production stops and a time-up dialog
    /// interrupts the event; the event is not completed.
    pub fn on_time_expired(&mut self) -> Outcome {
        self.completion_settled = false;
        if let Err(err) = self.require_gameplay("on_time_expired") {
            return ignored(err);
        }
        let run = self.run;
        log::info!("time expired during '{}'", self.event_name());
        self.events.emit(FlowEvent::TimeExpired { run });

        self.machines_locked = true;
        self.host.set_machines_locked(true);
        self.line.clear();
        self.set_delivery_ready(false);
        self.timed = false;
        self.time_up = true;
        self.time_up_dialog_shown = false;
        self.set_state(FlowState::RunningDialog);

        if self.config.time_up_dialog_delay > 0.0 {
            let handle = self.host.schedule_after(
                self.config.time_up_dialog_delay,
                FlowCallback::ShowTimeUpDialog(run),
            );
            self.pending_timer = Some(handle);
        } else {
            self.show_time_up_dialog(run);
        }
        self.flush();
        Outcome::Applied
    }

    // -----------------------------------------------------------------------
    // Demands and delivery
    // -----------------------------------------------------------------------

    /// Whether the line matches the active demands while time remains.
    /// Updates the host's delivery panel; never advances on its own.
    pub fn check_demand_satisfaction(&mut self) -> bool {
        let ready = self.refresh_delivery();
        self.flush();
        ready
    }

    /// Submit the line. Applies only while gameplay is running and the
    /// demands are satisfied; otherwise nothing happens.
    pub fn deliver(&mut self) -> Outcome {
        self.completion_settled = false;
        if let Err(err) = self.require_gameplay("deliver") {
            return ignored(err);
        }
        if !self.refresh_delivery() {
            self.flush();
            return ignored(FlowError::NoOpAction {
                reason: "demands not satisfied",
            });
        }

        let run = self.run;
        log::info!("delivered '{}'", self.event_name());
        self.events.emit(FlowEvent::Delivered { run });
        self.leave_gameplay();
        if let Some(event) = self.timeline.current_event_mut() {
            event.completed = true;
        }

        let outcome = if self.config.delivery_delay > 0.0 {
            self.set_state(FlowState::Idle);
            let handle = self
                .host
                .schedule_after(self.config.delivery_delay, FlowCallback::CompleteEvent(run));
            self.pending_timer = Some(handle);
            Outcome::Applied
        } else {
            self.finish_run(run)
        };
        self.flush();
        outcome
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_gameplay(&self, operation: &'static str) -> Result<(), FlowError> {
        if self.state == FlowState::RunningGameplay {
            Ok(())
        } else {
            Err(FlowError::WrongState {
                operation,
                state: self.state,
            })
        }
    }

    fn event_name(&self) -> &str {
        self.timeline
            .current_event()
            .map(|e| e.name.as_str())
            .unwrap_or("<none>")
    }

    fn flush(&mut self) {
        self.events.deliver();
    }

    fn set_state(&mut self, to: FlowState) {
        let from = self.state;
        if from == to {
            return;
        }
        log::debug!("flow state {from:?} -> {to:?}");
        self.state = to;
        self.events.emit(FlowEvent::StateChanged { from, to });
    }

    fn set_delivery_ready(&mut self, ready: bool) {
        if self.delivery_ready == ready {
            return;
        }
        self.delivery_ready = ready;
        self.host.set_delivery_ready(ready);
        self.events.emit(FlowEvent::DeliveryReady { ready });
    }

    fn refresh_delivery(&mut self) -> bool {
        if self.state != FlowState::RunningGameplay {
            self.set_delivery_ready(false);
            return false;
        }
        let matched = matcher::matches(self.match_mode, &self.line.snapshot(), &self.active_demands);
        let ready = matched && (!self.timed || self.host.is_time_remaining());
        self.set_delivery_ready(ready);
        ready
    }

    /// Cancel anything belonging to the run in progress.
    fn interrupt_current(&mut self) {
        if let Some(handle) = self.pending_timer.take() {
            self.host.cancel(handle);
        }
        self.leave_gameplay();
        self.time_up = false;
        self.time_up_dialog_shown = false;
    }

    /// Tear down gameplay state. Safe to call when nothing is running.
    fn leave_gameplay(&mut self) {
        self.line.clear();
        self.active_demands.clear();
        self.set_delivery_ready(false);
        if self.timed {
            self.host.stop_timer();
            self.timed = false;
        }
        if self.spawn_active {
            self.host.clear_spawned();
            self.spawn_active = false;
        }
        self.spawned.clear();
    }

    fn enter_loop(&mut self) -> Outcome {
        self.host.goto_loop();
        if self.timeline.current_day().is_some() {
            self.events.emit(FlowEvent::DayStarted { day: 0 });
            self.host.goto_day();
        }
        self.start_current()
    }

    fn advance_cursor(&mut self) {
        if self.timeline.advance_event() == Advance::NextDay {
            self.day_started();
        }
    }

    fn day_started(&mut self) {
        let day = self.timeline.cursor().day;
        log::info!("day {day} started");
        self.events.emit(FlowEvent::DayStarted { day });
        self.host.goto_day();
    }

    fn finish_run(&mut self, run: RunId) -> Outcome {
        if run != self.run || self.completed_run == Some(run) {
            return ignored(FlowError::StaleRun(run.0));
        }
        if self.state == FlowState::Exhausted || self.time_up {
            return ignored(FlowError::WrongState {
                operation: "complete_run",
                state: self.state,
            });
        }
        self.completed_run = Some(run);
        if let Some(handle) = self.pending_timer.take() {
            self.host.cancel(handle);
        }
        self.leave_gameplay();

        let cursor = self.timeline.cursor();
        if let Some(event) = self.timeline.current_event_mut() {
            event.completed = true;
            log::debug!("event '{}' completed", event.name);
        }
        self.events.emit(FlowEvent::EventCompleted { run, cursor });

        self.advance_cursor();
        self.start_current()
    }

    fn resolve_time_up(&mut self) -> Outcome {
        self.interrupt_current();
        self.machines_locked = false;
        self.host.set_machines_locked(false);
        match self.config.time_up_policy {
            TimeUpPolicy::RestartLoop => {
                self.timeline.restart();
                self.events.emit(FlowEvent::LoopRestarted);
                self.enter_loop()
            }
            TimeUpPolicy::RetryEvent => self.start_current(),
        }
    }

    fn show_time_up_dialog(&mut self, run: RunId) {
        let key = self
            .timeline
            .current_event()
            .map(|e| e.time_up_dialog_key().to_string())
            .unwrap_or_else(|| crate::timeline::DEFAULT_TIME_UP_DIALOG.to_string());
        self.time_up_dialog_shown = true;
        self.host.start_dialog(&key, run);
    }

    /// Issue a new run for the event under the cursor.
    fn start_current(&mut self) -> Outcome {
        while self.timeline.current_event().is_none() && self.timeline.current_day().is_some() {
            log::warn!("day {} has no events, skipping", self.timeline.cursor().day);
            if self.timeline.advance_day() == Advance::NextDay {
                self.day_started();
            }
        }

        self.run = self.run.next();
        let run = self.run;

        let Some(event) = self.timeline.current_event().cloned() else {
            if self.state != FlowState::Exhausted {
                log::info!("timeline exhausted, returning to menu");
                self.set_state(FlowState::Exhausted);
                self.events.emit(FlowEvent::LoopExhausted);
                self.host.goto_menu();
            }
            return ignored(FlowError::ConfigurationAbsent);
        };

        self.events.emit(FlowEvent::EventStarted {
            run,
            cursor: self.timeline.cursor(),
            name: event.name.clone(),
        });

        match event.kind {
            EventKind::Narrative => {
                self.set_state(FlowState::RunningNarrative);
                self.host.goto_narrative_scene();
                self.host.start_narrative(&event.description, run);
            }
            EventKind::Dialog => {
                self.set_state(FlowState::RunningDialog);
                self.host.start_dialog(event.cutscene_key(), run);
            }
            EventKind::Gameplay if event.demands.is_empty() => {
                log::debug!("gameplay event '{}' has no demands, auto-completing", event.name);
                return self.finish_run(run);
            }
            EventKind::Gameplay => self.start_gameplay(&event),
        }
        Outcome::Applied
    }

    fn start_gameplay(&mut self, event: &EventConfig) {
        self.set_state(FlowState::RunningGameplay);
        self.active_demands = event.demands.clone();
        self.match_mode = event.match_mode;
        self.line.clear();

        let plan = match &event.layout {
            Some(layout) => plan_event(layout, &self.config.layout),
            None => {
                log::warn!("gameplay event '{}' has no layout", event.name);
                plan_event(&LayoutParameters::new(0, 0.0, 0.0), &self.config.layout)
            }
        };

        self.host.goto_level();
        self.spawned = self.host.request_spawn(&plan);
        self.spawn_active = true;
        self.machines_locked = false;
        self.host.set_machines_locked(false);

        if let Some(limit) = event.time_limit {
            self.host.start_timer(limit);
            self.timed = true;
        }
        self.refresh_delivery();
    }
}
