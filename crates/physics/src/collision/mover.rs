//! Collision-aware character mover.
//!
//! Moves a capsule by a displacement, sliding along every surface it touches
//! (the classic Quake slide move, driven by displacement rather than
//! velocity) and reports which sides were touched.

use glam::Vec3;

use super::flags::{CollisionFlags, ContentFlags};
use super::trace::TraceShape;
use super::world::CollisionWorld;

/// Maximum number of collision planes to track during one move.
const MAX_CLIP_PLANES: usize = 5;

/// Surfaces with a normal at least this vertical count as floors or ceilings.
pub const MIN_FLOOR_NORMAL_Y: f32 = 0.7;

/// Slightly more than one so the mover does not stick to surfaces.
const OVERBOUNCE: f32 = 1.001;

/// Result of a character move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    /// Final capsule center.
    pub position: Vec3,
    /// Sides that touched geometry during the move.
    pub flags: CollisionFlags,
}

/// Clip a vector against a surface normal.
///
/// Removes the component going into the surface, with a small overbounce.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal);
    let adjusted_backoff = if backoff < 0.0 {
        backoff * overbounce
    } else {
        backoff / overbounce
    };
    velocity - normal * adjusted_backoff
}

/// Move a capsule centered at `center` by `displacement`.
///
/// A capsule that starts inside or against geometry is pushed out to one
/// skin away first; a capsule already resting one skin away is left alone.
pub fn move_character(
    world: &CollisionWorld,
    center: Vec3,
    shape: TraceShape,
    displacement: Vec3,
    mask: ContentFlags,
) -> MoveResult {
    let mut position = world.resolve_penetration(center, shape, mask);

    let mut flags = CollisionFlags::NONE;
    let mut remaining = displacement;
    let mut planes = [Vec3::ZERO; MAX_CLIP_PLANES];
    let mut num_planes = 0;

    for _ in 0..MAX_CLIP_PLANES {
        if remaining.length_squared() < 1e-10 {
            break;
        }

        let trace = world.trace(position, position + remaining, shape, mask);
        if trace.all_solid {
            break;
        }

        position = trace.end_position;
        if !trace.hit_something() {
            break;
        }

        let normal = trace.normal_or_up();
        flags |= CollisionFlags::from_normal(normal, MIN_FLOOR_NORMAL_Y);
        remaining *= 1.0 - trace.fraction;

        if num_planes < MAX_CLIP_PLANES {
            planes[num_planes] = normal;
            num_planes += 1;
        }

        // Find a clip that does not push into any plane touched so far
        let mut next = None;
        for i in 0..num_planes {
            let clipped = clip_velocity(remaining, planes[i], OVERBOUNCE);
            let valid = (0..num_planes)
                .filter(|&j| j != i)
                .all(|j| clipped.dot(planes[j]) >= -0.0001);
            if valid {
                next = Some(clipped);
                break;
            }
        }

        remaining = match next {
            Some(clipped) => clipped,
            // Wedged in a crease: slide along the crease line
            None if num_planes >= 2 => {
                let crease = planes[0].cross(planes[1]).normalize_or_zero();
                crease * remaining.dot(crease)
            }
            None => Vec3::ZERO,
        };
    }

    MoveResult { position, flags }
}
