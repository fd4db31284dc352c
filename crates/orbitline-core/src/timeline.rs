//! Loop → Day → Event hierarchy and the cursor that walks it.
//!
//! The cursor is always either a valid (day, event) position inside the
//! current loop or exhausted, in which case `day == days.len()` and every
//! lookup returns `None`. Advancing an exhausted timeline does nothing.

use crate::id::Cursor;
use crate::layout::LayoutParameters;
use crate::matcher::MatchMode;
use crate::resource::Demand;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event configuration
// ---------------------------------------------------------------------------

/// What kind of beat an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Text shown line by line.
    Narrative,
    /// A production puzzle with demands.
    Gameplay,
    /// A cutscene.
    Dialog,
}

/// Fallback dialog key for a time-up interrupt.
pub const DEFAULT_TIME_UP_DIALOG: &str = "time_up";

/// One beat of the game. Static authoring data; only `completed` changes
/// at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub name: String,
    pub kind: EventKind,
    /// Narrative text key. Free-form description for other kinds.
    #[serde(default)]
    pub description: String,
    /// Dialog cutscene key. Defaults to `name` when absent.
    #[serde(default)]
    pub cutscene: Option<String>,
    #[serde(default)]
    pub demands: Vec<Demand>,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub layout: Option<LayoutParameters>,
    /// Seconds the player has for a gameplay event. `None` means no timer.
    #[serde(default)]
    pub time_limit: Option<f32>,
    /// Dialog played when the timer runs out.
    #[serde(default)]
    pub time_up_dialog: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl EventConfig {
    pub fn narrative(name: impl Into<String>, text_key: impl Into<String>) -> Self {
        Self::bare(name.into(), EventKind::Narrative, text_key.into())
    }

    pub fn dialog(name: impl Into<String>, cutscene: impl Into<String>) -> Self {
        let mut event = Self::bare(name.into(), EventKind::Dialog, String::new());
        event.cutscene = Some(cutscene.into());
        event
    }

    pub fn gameplay(name: impl Into<String>, demands: Vec<Demand>, layout: LayoutParameters) -> Self {
        let mut event = Self::bare(name.into(), EventKind::Gameplay, String::new());
        event.demands = demands;
        event.layout = Some(layout);
        event
    }

    fn bare(name: String, kind: EventKind, description: String) -> Self {
        Self {
            name,
            kind,
            description,
            cutscene: None,
            demands: Vec::new(),
            match_mode: MatchMode::default(),
            layout: None,
            time_limit: None,
            time_up_dialog: None,
            completed: false,
        }
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_time_limit(mut self, seconds: f32) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_time_up_dialog(mut self, key: impl Into<String>) -> Self {
        self.time_up_dialog = Some(key.into());
        self
    }

    pub fn cutscene_key(&self) -> &str {
        self.cutscene.as_deref().unwrap_or(&self.name)
    }

    pub fn time_up_dialog_key(&self) -> &str {
        self.time_up_dialog.as_deref().unwrap_or(DEFAULT_TIME_UP_DIALOG)
    }
}

/// A day: an ordered list of events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Day {
    pub name: String,
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

impl Day {
    pub fn new(name: impl Into<String>, events: Vec<EventConfig>) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }
}

/// A loop: an ordered list of days.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Loop {
    pub name: String,
    #[serde(default)]
    pub days: Vec<Day>,
}

impl Loop {
    pub fn new(name: impl Into<String>, days: Vec<Day>) -> Self {
        Self {
            name: name.into(),
            days,
        }
    }

    /// Total number of events across all days.
    pub fn event_count(&self) -> usize {
        self.days.iter().map(|d| d.events.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Result of moving the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Still inside the same day.
    SameDay,
    /// Moved to the first event of the next day.
    NextDay,
    /// Past the last day of the loop.
    Exhausted,
}

#[derive(Debug, Clone, Default)]
pub struct EventTimeline {
    current_loop: Loop,
    cursor: Cursor,
}

impl EventTimeline {
    pub fn new(current_loop: Loop) -> Self {
        Self {
            current_loop,
            cursor: Cursor::default(),
        }
    }

    /// Replace the loop and reset the cursor.
    pub fn set_loop(&mut self, current_loop: Loop) {
        self.current_loop = current_loop;
        self.cursor = Cursor::default();
    }

    pub fn current_loop(&self) -> &Loop {
        &self.current_loop
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn current_day(&self) -> Option<&Day> {
        self.current_loop.days.get(self.cursor.day)
    }

    pub fn current_event(&self) -> Option<&EventConfig> {
        self.current_day()?.events.get(self.cursor.event)
    }

    pub fn current_event_mut(&mut self) -> Option<&mut EventConfig> {
        self.current_loop
            .days
            .get_mut(self.cursor.day)?
            .events
            .get_mut(self.cursor.event)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.day >= self.current_loop.days.len()
    }

    /// Move to the next event, rolling over into the next day when the
    /// current one runs out.
    pub fn advance_event(&mut self) -> Advance {
        let Some(day) = self.current_day() else {
            return Advance::Exhausted;
        };
        let event_count = day.events.len();
        self.cursor.event += 1;
        if self.cursor.event >= event_count {
            self.advance_day()
        } else {
            Advance::SameDay
        }
    }

    /// Move to the first event of the next day.
    pub fn advance_day(&mut self) -> Advance {
        if self.is_exhausted() {
            return Advance::Exhausted;
        }
        self.cursor.event = 0;
        self.cursor.day += 1;
        if self.is_exhausted() {
            log::info!("loop '{}' exhausted", self.current_loop.name);
            Advance::Exhausted
        } else {
            Advance::NextDay
        }
    }

    /// Rewind to the first event. `completed` flags are kept.
    pub fn restart(&mut self) {
        self.cursor = Cursor::default();
    }

    /// Clear every `completed` flag in the loop.
    pub fn reset_progress(&mut self) {
        for event in self
            .current_loop
            .days
            .iter_mut()
            .flat_map(|d| d.events.iter_mut())
        {
            event.completed = false;
        }
    }
}
