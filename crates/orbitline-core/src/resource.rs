//! Resource data model: shapes, colors, demands and machine transforms.

use crate::id::SpawnHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Shape and color
// ---------------------------------------------------------------------------

/// The shape half of a resource's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    Triangle,
    Square,
    Circle,
    /// Unclassified.
    #[default]
    None,
}

/// The color half of a resource's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum ColorKind {
    Red,
    Green,
    Blue,
    /// Unclassified.
    #[default]
    None,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Triangle,
        ShapeKind::Square,
        ShapeKind::Circle,
        ShapeKind::None,
    ];

    pub fn is_none(self) -> bool {
        self == ShapeKind::None
    }
}

impl ColorKind {
    pub const ALL: [ColorKind; 4] = [
        ColorKind::Red,
        ColorKind::Green,
        ColorKind::Blue,
        ColorKind::None,
    ];

    pub fn is_none(self) -> bool {
        self == ColorKind::None
    }
}

// ---------------------------------------------------------------------------
// Records and demands
// ---------------------------------------------------------------------------

/// A resource currently sitting in the production line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: SpawnHandle,
    pub shape: ShapeKind,
    pub color: ColorKind,
}

impl ResourceRecord {
    pub fn new(id: SpawnHandle, shape: ShapeKind, color: ColorKind) -> Self {
        Self { id, shape, color }
    }

    /// The (shape, color) pair used for matching.
    pub fn classification(&self) -> (ShapeKind, ColorKind) {
        (self.shape, self.color)
    }

    /// Whether both halves of the classification are set.
    pub fn is_classified(&self) -> bool {
        !self.shape.is_none() && !self.color.is_none()
    }
}

/// A (shape, color) pair an event requires the player to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Demand {
    pub shape: ShapeKind,
    pub color: ColorKind,
}

impl Demand {
    pub fn new(shape: ShapeKind, color: ColorKind) -> Self {
        Self { shape, color }
    }

    /// Whether a produced (shape, color) pair satisfies this demand exactly.
    pub fn accepts(&self, shape: ShapeKind, color: ColorKind) -> bool {
        self.shape == shape && self.color == color
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.color, self.shape)
    }
}

// ---------------------------------------------------------------------------
// Machines
// ---------------------------------------------------------------------------

/// A fixed machine placed around the orbit. Each kind rewrites one half of
/// a resource's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineKind {
    /// Rewrites the shape.
    Shapeshifter(ShapeKind),
    /// Rewrites the color.
    Huehopper(ColorKind),
}

impl MachineKind {
    /// The (shape, color) change this machine applies, as optional halves.
    pub fn transform(self) -> (Option<ShapeKind>, Option<ColorKind>) {
        match self {
            MachineKind::Shapeshifter(shape) => (Some(shape), None),
            MachineKind::Huehopper(color) => (None, Some(color)),
        }
    }
}

/// Apply a machine to a record in place. Returns true if the record changed.
pub fn apply_machine(kind: MachineKind, record: &mut ResourceRecord) -> bool {
    let (shape, color) = kind.transform();
    apply_transform(record, shape, color)
}

/// Overwrite whichever halves are present. Returns true if the record changed.
pub fn apply_transform(
    record: &mut ResourceRecord,
    shape: Option<ShapeKind>,
    color: Option<ColorKind>,
) -> bool {
    let before = *record;
    if let Some(shape) = shape {
        record.shape = shape;
    }
    if let Some(color) = color {
        record.color = color;
    }
    *record != before
}
