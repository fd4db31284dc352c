//! Orbitline Core -- the demand/sequence progression engine.
//!
//! The player classifies orbiting resources by shape and color, running
//! them through machines, to satisfy the demands of the current gameplay
//! event. Events are grouped into days and days into loops; narrative and
//! dialog beats sit between the puzzles.
//!
//! This crate holds everything that does not depend on a game engine: the
//! timeline, the production line, demand matching, spawn geometry and the
//! state machine tying them together. Rendering, audio, timers and scene
//! changes are reached through the traits in [`host`].
//!
//! # Flow
//!
//! 1. [`flow::GameFlowController`] reads the current
//!    [`timeline::EventConfig`] from the [`timeline::EventTimeline`].
//! 2. Gameplay events get a [`layout::SpawnPlan`] and the host spawns it.
//! 3. Produced and transformed resources land in the
//!    [`line::ProductionLine`].
//! 4. [`matcher`] compares the line with the active demands; when they
//!    match and time remains, delivery becomes available.
//! 5. `deliver()` completes the event and the cursor advances.
//!
//! ```rust,ignore
//! let mut flow = GameFlowController::new(host, FlowConfig::default());
//! flow.start_loop(first_loop);
//! flow.on_resource_produced(handle, ShapeKind::Circle, ColorKind::Red);
//! if flow.check_demand_satisfaction() {
//!     flow.deliver();
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod flow;
pub mod host;
pub mod id;
pub mod layout;
pub mod line;
pub mod matcher;
pub mod resource;
pub mod scheduler;
pub mod timeline;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{FlowConfig, TimeUpPolicy};
pub use error::{FlowError, LineError, Outcome};
pub use flow::{FlowState, GameFlowController};
pub use host::FlowHost;
pub use resource::{ColorKind, Demand, MachineKind, ResourceRecord, ShapeKind};
pub use timeline::{Day, EventConfig, EventKind, EventTimeline, Loop};
