//! Environment sensing: ground, walls and mantle ledges.
//!
//! Every probe is a plain query against a [`SceneQuery`]. A probe that
//! finds nothing returns `false` or `None` and the caller carries on with
//! airborne physics.

use glam::Vec3;

use crate::collision::SceneQuery;

use super::config::MovementConfig;
use super::rig::CapsuleVolume;

/// Radius of the sphere under the feet used for the grounded test.
pub const GROUND_PROBE_RADIUS: f32 = 0.15;

/// Which side of the character a wall is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

/// A wall suitable for wall-running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub normal: Vec3,
    pub side: WallSide,
}

/// Shape queries around the character.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentSensor {
    capsule: CapsuleVolume,
    ground_anchor: Vec3,
}

impl EnvironmentSensor {
    /// `ground_anchor` is the offset of the ground probe from the capsule center.
    pub fn new(capsule: CapsuleVolume, ground_anchor: Vec3) -> Self {
        Self {
            capsule,
            ground_anchor,
        }
    }

    /// Default ground probe offset: just above the bottom of the standing capsule.
    pub fn default_ground_anchor(capsule: CapsuleVolume) -> Vec3 {
        Vec3::new(0.0, -(capsule.height * 0.5 - 0.1), 0.0)
    }

    pub fn capsule(&self) -> CapsuleVolume {
        self.capsule
    }

    /// Small-sphere overlap under the feet. Wall tops count as ground.
    pub fn is_grounded(&self, scene: &dyn SceneQuery, position: Vec3, config: &MovementConfig) -> bool {
        scene.overlap_sphere(
            position + self.ground_anchor,
            GROUND_PROBE_RADIUS,
            config.grounded_layers(),
        )
    }

    /// Probe left then right from chest height for a steep enough wall.
    pub fn detect_wall(
        &self,
        scene: &dyn SceneQuery,
        position: Vec3,
        right: Vec3,
        config: &MovementConfig,
    ) -> Option<WallContact> {
        let origin = position + Vec3::Y * (self.capsule.height * 0.25);
        let max_normal_y = config.min_wall_angle_deg.to_radians().cos();

        [-right, right].into_iter().find_map(|direction| {
            let hit = scene.raycast(origin, direction, config.wall_check_distance, config.wall_mask)?;
            if hit.normal.y >= max_normal_y {
                return None;
            }
            // A normal pointing to our right means the wall is on our left
            let side = if right.dot(hit.normal) > 0.0 {
                WallSide::Left
            } else {
                WallSide::Right
            };
            Some(WallContact {
                normal: hit.normal,
                side,
            })
        })
    }

    /// Look for a ledge in front that the character can be lifted onto.
    ///
    /// Returns the capsule center to mantle to.
    pub fn detect_mantle_ledge(
        &self,
        scene: &dyn SceneQuery,
        position: Vec3,
        forward: Vec3,
        config: &MovementConfig,
    ) -> Option<Vec3> {
        let layers = config.mantle_layers();
        let radius = self.capsule.radius;

        let origin = position + self.ground_anchor + Vec3::Y * config.mantle_check_height;
        let sweep_radius = (radius * 0.9).max(0.1);
        let front = scene.sphere_cast(
            origin,
            sweep_radius,
            forward,
            config.mantle_forward_distance,
            layers,
        )?;

        // Probe the top from just past the lip so the ray lands on the top face
        let inset = (radius * 0.5).clamp(0.1, 0.5);
        let top_origin = front.point + forward * (inset * 2.0) + Vec3::Y * (config.mantle_max_height + 0.1);
        let top = scene.raycast(top_origin, -Vec3::Y, config.mantle_max_height + 0.2, layers)?;
        if top.normal.y < 0.7 {
            return None;
        }

        let forward_on_plane = (forward - top.normal * forward.dot(top.normal)).normalize_or_zero();
        let mut target = top.point - forward_on_plane * inset;
        target.y = top.point.y + self.capsule.height * 0.5 + 0.05;

        let blocked = scene
            .overlap_capsule(target, radius, self.capsule.height, layers)
            .into_iter()
            .any(|brush| Some(brush) != top.brush);
        if blocked {
            return None;
        }

        Some(target)
    }
}
