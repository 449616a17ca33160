//! The scene query interface the movement core runs against.

use glam::Vec3;

use super::flags::ContentFlags;
use super::mover::{self, MoveResult};
use super::trace::{BrushId, RayHit, TraceShape};
use super::world::CollisionWorld;

/// Collision queries the movement core needs from the scene.
///
/// [`CollisionWorld`] is the production implementation. Tests can script
/// their own answers to drive the state machine deterministically.
pub trait SceneQuery {
    /// Does a sphere at `center` overlap anything in `mask`?
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: ContentFlags) -> bool;

    /// Cast a ray and return the nearest hit within `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: ContentFlags)
        -> Option<RayHit>;

    /// Sweep a sphere and return the nearest hit within `max_distance`.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
    ) -> Option<RayHit>;

    /// Brushes overlapped by a vertical capsule centered at `center`.
    fn overlap_capsule(&self, center: Vec3, radius: f32, height: f32, mask: ContentFlags)
        -> Vec<BrushId>;

    /// Move a capsule by `displacement`, sliding along surfaces.
    fn move_character(
        &self,
        center: Vec3,
        radius: f32,
        height: f32,
        displacement: Vec3,
        mask: ContentFlags,
    ) -> MoveResult;
}

impl SceneQuery for CollisionWorld {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: ContentFlags) -> bool {
        self.shape_in_solid(center, TraceShape::Sphere { radius }, mask)
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
    ) -> Option<RayHit> {
        CollisionWorld::raycast(self, origin, direction, max_distance, mask).into_hit()
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
    ) -> Option<RayHit> {
        CollisionWorld::sphere_cast(self, origin, radius, direction, max_distance, mask).into_hit()
    }

    fn overlap_capsule(
        &self,
        center: Vec3,
        radius: f32,
        height: f32,
        mask: ContentFlags,
    ) -> Vec<BrushId> {
        self.overlapping_brushes(center, TraceShape::Capsule { radius, height }, mask)
    }

    fn move_character(
        &self,
        center: Vec3,
        radius: f32,
        height: f32,
        displacement: Vec3,
        mask: ContentFlags,
    ) -> MoveResult {
        mover::move_character(
            self,
            center,
            TraceShape::Capsule { radius, height },
            displacement,
            mask,
        )
    }
}
