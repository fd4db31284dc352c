//! Serde data file structs for campaign definitions.
//!
//! These structs define the on-disk format for loops, days and events. They
//! are deserialized from RON, JSON, or TOML data files and then resolved
//! into core types by [`crate::campaign`].

use orbitline_core::{ColorKind, MachineKind, ShapeKind};
use serde::Deserialize;

// ===========================================================================
// Campaign structure
// ===========================================================================

/// Top level of a `campaign` data file.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignData {
    pub title: String,
    #[serde(default)]
    pub loops: Vec<LoopData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoopData {
    pub name: String,
    #[serde(default)]
    pub days: Vec<DayData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayData {
    pub name: String,
    #[serde(default)]
    pub events: Vec<EventData>,
}

// ===========================================================================
// Events
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKindData {
    Narrative,
    Gameplay,
    Dialog,
}

/// An event definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub name: String,
    pub kind: EventKindData,
    /// Narrative text key, or a free-form note for other kinds.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cutscene: Option<String>,
    #[serde(default)]
    pub demands: Vec<DemandData>,
    /// Demands must be produced in order.
    #[serde(default)]
    pub sequence: bool,
    #[serde(default)]
    pub layout: Option<LayoutData>,
    #[serde(default)]
    pub time_limit: Option<f32>,
    #[serde(default)]
    pub time_up_dialog: Option<String>,
}

// ===========================================================================
// Classification
// ===========================================================================

/// Shapes as written in data files. There is no "none" shape on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeData {
    Triangle,
    Square,
    Circle,
}

impl From<ShapeData> for ShapeKind {
    fn from(shape: ShapeData) -> Self {
        match shape {
            ShapeData::Triangle => ShapeKind::Triangle,
            ShapeData::Square => ShapeKind::Square,
            ShapeData::Circle => ShapeKind::Circle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorData {
    Red,
    Green,
    Blue,
}

impl From<ColorData> for ColorKind {
    fn from(color: ColorData) -> Self {
        match color {
            ColorData::Red => ColorKind::Red,
            ColorData::Green => ColorKind::Green,
            ColorData::Blue => ColorKind::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DemandData {
    pub shape: ShapeData,
    pub color: ColorData,
}

// ===========================================================================
// Layout
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineData {
    /// Rewrites the shape.
    Shapeshifter(ShapeData),
    /// Rewrites the color.
    Huehopper(ColorData),
}

impl From<MachineData> for MachineKind {
    fn from(machine: MachineData) -> Self {
        match machine {
            MachineData::Shapeshifter(shape) => MachineKind::Shapeshifter(shape.into()),
            MachineData::Huehopper(color) => MachineKind::Huehopper(color.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutData {
    pub object_count: usize,
    pub min_radius: f32,
    pub radius_per_object: f32,
    #[serde(default)]
    pub angular_speed: f32,
    #[serde(default)]
    pub machines: Vec<MachineData>,
    #[serde(default = "default_machine_distance")]
    pub machine_distance: f32,
}

fn default_machine_distance() -> f32 {
    1.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_defaults_from_ron() {
        let event: EventData = ron::from_str(r#"(name: "wake_up", kind: narrative)"#).unwrap();
        assert_eq!(event.kind, EventKindData::Narrative);
        assert!(event.demands.is_empty());
        assert!(!event.sequence);
        assert!(event.layout.is_none());
    }

    #[test]
    fn machines_from_json() {
        let layout: LayoutData = serde_json::from_str(
            r#"{
                "object_count": 3,
                "min_radius": 2.0,
                "radius_per_object": 0.5,
                "machines": [{"shapeshifter": "square"}, {"huehopper": "blue"}]
            }"#,
        )
        .unwrap();
        assert_eq!(layout.machine_distance, 1.5);
        assert_eq!(
            layout.machines,
            vec![
                MachineData::Shapeshifter(ShapeData::Square),
                MachineData::Huehopper(ColorData::Blue),
            ]
        );
    }

    #[test]
    fn none_shape_is_not_a_data_value() {
        let result: Result<DemandData, _> =
            serde_json::from_str(r#"{"shape": "none", "color": "red"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn conversions_into_core() {
        assert_eq!(ShapeKind::from(ShapeData::Circle), ShapeKind::Circle);
        assert_eq!(ColorKind::from(ColorData::Green), ColorKind::Green);
        assert_eq!(
            MachineKind::from(MachineData::Huehopper(ColorData::Red)),
            MachineKind::Huehopper(ColorKind::Red)
        );
    }
}
