//! Velocity integration helpers.
//!
//! Horizontal velocity is blended toward a target with a rate-limited lerp;
//! vertical velocity follows gravity, eases toward a fall speed on walls and
//! is always clamped to terminal velocity.

use glam::Vec3;

use super::config::MovementConfig;

/// Blend `current` toward `target` by `clamp01(rate * dt)`.
///
/// The result is flattened so horizontal velocity never gains a `y`.
pub fn blend_horizontal(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    flatten(current.lerp(target, (rate * dt).clamp(0.0, 1.0)))
}

/// Drop the vertical component.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Direction of `v` on the horizontal plane, or `fallback` if it is too small.
pub fn horizontal_direction_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let flat = flatten(v);
    if flat.length_squared() > 0.01 {
        flat.normalize()
    } else {
        flatten(fallback).normalize_or_zero()
    }
}

/// Speed the input drives toward: slide beats sprint beats walk.
pub fn speed_tier(config: &MovementConfig, sprinting: bool, sliding: bool) -> f32 {
    if sliding {
        config.slide_speed
    } else if sprinting {
        config.sprint_speed
    } else {
        config.walk_speed
    }
}

/// Apply gravity scaled by `scale`.
#[inline]
pub fn fall(vertical: f32, gravity: f32, scale: f32, dt: f32) -> f32 {
    vertical - gravity * scale * dt
}

/// Ease vertical velocity toward `target` by `clamp01(rate * dt)`.
#[inline]
pub fn ease_vertical(vertical: f32, target: f32, rate: f32, dt: f32) -> f32 {
    vertical + (target - vertical) * (rate * dt).clamp(0.0, 1.0)
}

/// Clamp to terminal velocity.
#[inline]
pub fn clamp_terminal(vertical: f32, terminal: f32) -> f32 {
    vertical.max(terminal)
}

/// Along-wall run direction, flipped to agree with the facing.
pub fn along_wall(normal: Vec3, forward: Vec3) -> Vec3 {
    let along = normal.cross(Vec3::Y).normalize_or_zero();
    if along.dot(forward) < 0.0 {
        -along
    } else {
        along
    }
}
