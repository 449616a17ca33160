//! A scene with hand-written answers, for driving the movement core in tests.

use std::cell::Cell;

use glam::Vec3;

use super::flags::{CollisionFlags, ContentFlags};
use super::mover::MoveResult;
use super::query::SceneQuery;
use super::trace::{BrushId, RayHit};

/// Scripted [`SceneQuery`] answers.
///
/// Rays are matched by direction against `rays`; the mover applies the full
/// displacement and reports `BELOW` when grounded and moving down, `ABOVE`
/// when `ceiling` is set and moving up.
#[derive(Debug, Default)]
pub(crate) struct ScriptedScene {
    pub grounded: bool,
    pub ceiling: bool,
    pub rays: Vec<(Vec3, RayHit)>,
    pub sphere_hit: Option<RayHit>,
    pub capsule_overlaps: Vec<BrushId>,
    pub moves: Cell<usize>,
}

impl ScriptedScene {
    pub fn grounded() -> Self {
        Self {
            grounded: true,
            ..Default::default()
        }
    }

    pub fn airborne() -> Self {
        Self::default()
    }

    /// Answer rays cast along `direction` with a hit on a surface facing `normal`.
    pub fn with_ray(mut self, direction: Vec3, normal: Vec3, point: Vec3, brush: BrushId) -> Self {
        self.rays.push((
            direction.normalize(),
            RayHit {
                point,
                normal,
                fraction: 0.5,
                brush: Some(brush),
            },
        ));
        self
    }
}

impl SceneQuery for ScriptedScene {
    fn overlap_sphere(&self, _center: Vec3, _radius: f32, _mask: ContentFlags) -> bool {
        self.grounded
    }

    fn raycast(
        &self,
        _origin: Vec3,
        direction: Vec3,
        _max_distance: f32,
        _mask: ContentFlags,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        self.rays
            .iter()
            .find(|(dir, _)| dir.dot(direction) > 0.99)
            .map(|(_, hit)| *hit)
    }

    fn sphere_cast(
        &self,
        _origin: Vec3,
        _radius: f32,
        _direction: Vec3,
        _max_distance: f32,
        _mask: ContentFlags,
    ) -> Option<RayHit> {
        self.sphere_hit
    }

    fn overlap_capsule(
        &self,
        _center: Vec3,
        _radius: f32,
        _height: f32,
        _mask: ContentFlags,
    ) -> Vec<BrushId> {
        self.capsule_overlaps.clone()
    }

    fn move_character(
        &self,
        center: Vec3,
        _radius: f32,
        _height: f32,
        displacement: Vec3,
        _mask: ContentFlags,
    ) -> MoveResult {
        self.moves.set(self.moves.get() + 1);

        let mut flags = CollisionFlags::NONE;
        if self.grounded && displacement.y < 0.0 {
            flags |= CollisionFlags::BELOW;
        }
        if self.ceiling && displacement.y > 0.0 {
            flags |= CollisionFlags::ABOVE;
        }
        MoveResult {
            position: center + displacement,
            flags,
        }
    }
}
