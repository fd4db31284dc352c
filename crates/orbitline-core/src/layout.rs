//! Spawn geometry for orbiting resources and the machines around them.
//!
//! Everything here is a pure function of its inputs. Positions lie on a
//! horizontal circle: `x = r cos θ`, `z = r sin θ`, `y` a fixed height.

use crate::resource::MachineKind;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// A point in the host's world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Angle of the point around the vertical axis, in `[0, 2π)`.
    pub fn planar_angle(&self) -> f32 {
        self.z.atan2(self.x).rem_euclid(TAU)
    }

    /// Distance from the vertical axis.
    pub fn planar_radius(&self) -> f32 {
        self.x.hypot(self.z)
    }
}

/// Per-event layout authored alongside the demands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutParameters {
    /// Number of orbiting resources to spawn.
    pub object_count: usize,
    pub min_radius: f32,
    pub radius_per_object: f32,
    /// Orbit speed in radians per second, passed through to the host.
    #[serde(default)]
    pub angular_speed: f32,
    #[serde(default)]
    pub machines: Vec<MachineKind>,
    #[serde(default = "default_machine_distance")]
    pub machine_distance_multiplier: f32,
}

fn default_machine_distance() -> f32 {
    1.5
}

impl LayoutParameters {
    pub fn new(object_count: usize, min_radius: f32, radius_per_object: f32) -> Self {
        Self {
            object_count,
            min_radius,
            radius_per_object,
            angular_speed: 0.0,
            machines: Vec::new(),
            machine_distance_multiplier: default_machine_distance(),
        }
    }

    pub fn with_machines(mut self, machines: Vec<MachineKind>) -> Self {
        self.machines = machines;
        self
    }

    pub fn with_angular_speed(mut self, speed: f32) -> Self {
        self.angular_speed = speed;
        self
    }
}

/// Global tuning constants for the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    /// Numerator of the per-object scale: `scale_constant / count`.
    pub scale_constant: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub orbit_height: f32,
    pub machine_height: f32,
    pub machine_scale: f32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            scale_constant: 3.0,
            scale_min: 0.3,
            scale_max: 1.0,
            orbit_height: 1.0,
            machine_height: 0.0,
            machine_scale: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLayout {
    pub radius: f32,
    /// Angle between neighbours. Zero when there are no resources.
    pub angle_step: f32,
    pub angles: Vec<f32>,
    pub positions: Vec<Vec3>,
    pub scale: f32,
    pub angular_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachinePlacement {
    pub kind: MachineKind,
    pub position: Vec3,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineLayout {
    pub radius: f32,
    pub placements: Vec<MachinePlacement>,
    pub scale: f32,
}

/// Everything the spawn layer needs for one gameplay event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlan {
    pub resources: ResourceLayout,
    pub machines: MachineLayout,
}

fn even_angles(count: usize) -> (f32, Vec<f32>) {
    if count == 0 {
        return (0.0, Vec::new());
    }
    let step = TAU / count as f32;
    (step, (0..count).map(|i| i as f32 * step).collect())
}

fn on_circle(radius: f32, angle: f32, height: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), height, radius * angle.sin())
}

/// Orbit geometry for `count` resources.
///
/// radius = max(min_radius, count × radius_per_object), and
/// scale = clamp(scale_constant / count, scale_min, scale_max). An empty
/// orbit gets `scale_max`.
pub fn plan_resource_layout(
    count: usize,
    min_radius: f32,
    radius_per_object: f32,
    tuning: &LayoutTuning,
) -> ResourceLayout {
    let radius = min_radius.max(count as f32 * radius_per_object);
    let scale = if count == 0 {
        tuning.scale_max
    } else {
        (tuning.scale_constant / count as f32).clamp(tuning.scale_min, tuning.scale_max)
    };
    let (angle_step, angles) = even_angles(count);
    let positions = angles
        .iter()
        .map(|&a| on_circle(radius, a, tuning.orbit_height))
        .collect();

    ResourceLayout {
        radius,
        angle_step,
        angles,
        positions,
        scale,
        angular_speed: 0.0,
    }
}

/// Machine ring outside the orbit: radius = resource_radius × multiplier.
pub fn plan_machine_layout(
    machines: &[MachineKind],
    resource_radius: f32,
    distance_multiplier: f32,
    tuning: &LayoutTuning,
) -> MachineLayout {
    let radius = resource_radius * distance_multiplier;
    let (_, angles) = even_angles(machines.len());
    let placements = machines
        .iter()
        .zip(angles)
        .map(|(&kind, angle)| MachinePlacement {
            kind,
            position: on_circle(radius, angle, tuning.machine_height),
            angle,
        })
        .collect();

    MachineLayout {
        radius,
        placements,
        scale: tuning.machine_scale,
    }
}

/// Combine both layouts for an event.
pub fn plan_event(layout: &LayoutParameters, tuning: &LayoutTuning) -> SpawnPlan {
    let mut resources = plan_resource_layout(
        layout.object_count,
        layout.min_radius,
        layout.radius_per_object,
        tuning,
    );
    resources.angular_speed = layout.angular_speed;
    let machines = plan_machine_layout(
        &layout.machines,
        resources.radius,
        layout.machine_distance_multiplier,
        tuning,
    );
    SpawnPlan {
        resources,
        machines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ColorKind, ShapeKind};

    const EPS: f32 = 1e-4;

    #[test]
    fn radius_uses_minimum_for_few_objects() {
        let tuning = LayoutTuning::default();
        let layout = plan_resource_layout(2, 5.0, 1.0, &tuning);
        assert_eq!(layout.radius, 5.0);

        let layout = plan_resource_layout(8, 5.0, 1.0, &tuning);
        assert_eq!(layout.radius, 8.0);
    }

    #[test]
    fn scale_is_clamped() {
        let tuning = LayoutTuning::default();
        assert_eq!(plan_resource_layout(1, 1.0, 1.0, &tuning).scale, 1.0);
        assert!((plan_resource_layout(6, 1.0, 1.0, &tuning).scale - 0.5).abs() < EPS);
        assert_eq!(plan_resource_layout(100, 1.0, 1.0, &tuning).scale, 0.3);
    }

    #[test]
    fn empty_orbit() {
        let tuning = LayoutTuning::default();
        let layout = plan_resource_layout(0, 3.0, 1.0, &tuning);
        assert!(layout.positions.is_empty());
        assert_eq!(layout.angle_step, 0.0);
        assert_eq!(layout.radius, 3.0);
        assert_eq!(layout.scale, tuning.scale_max);
    }

    #[test]
    fn positions_sit_on_the_orbit_at_fixed_height() {
        let tuning = LayoutTuning::default();
        let layout = plan_resource_layout(5, 2.0, 1.0, &tuning);
        assert_eq!(layout.positions.len(), 5);
        for (pos, angle) in layout.positions.iter().zip(&layout.angles) {
            assert!((pos.planar_radius() - layout.radius).abs() < EPS);
            assert!((pos.planar_angle() - angle).abs() < EPS);
            assert_eq!(pos.y, tuning.orbit_height);
        }
    }

    #[test]
    fn machines_ring_outside_orbit() {
        let tuning = LayoutTuning::default();
        let machines = [
            MachineKind::Shapeshifter(ShapeKind::Square),
            MachineKind::Huehopper(ColorKind::Blue),
        ];
        let layout = plan_machine_layout(&machines, 4.0, 1.5, &tuning);
        assert_eq!(layout.radius, 6.0);
        assert_eq!(layout.placements.len(), 2);
        assert_eq!(layout.placements[0].kind, machines[0]);
        assert!((layout.placements[1].angle - std::f32::consts::PI).abs() < EPS);
        assert_eq!(layout.placements[1].position.y, tuning.machine_height);
    }

    #[test]
    fn plan_event_chains_radii() {
        let params = LayoutParameters::new(10, 2.0, 0.5)
            .with_machines(vec![MachineKind::Huehopper(ColorKind::Red)])
            .with_angular_speed(0.25);
        let plan = plan_event(&params, &LayoutTuning::default());
        assert_eq!(plan.resources.radius, 5.0);
        assert_eq!(plan.resources.angular_speed, 0.25);
        assert_eq!(plan.machines.radius, 7.5);
    }
}
