//! Query results and shapes for collision queries.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::ContentFlags;

/// Identifier of a brush in a [`CollisionWorld`](super::CollisionWorld).
pub type BrushId = u32;

/// Result of a ray or shape cast.
///
/// Casts sweep a ray or shape from an origin along a direction and report
/// the first brush they touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceResult {
    /// How far along the cast we got before hitting something.
    ///
    /// - `1.0` = traveled the full distance (no hit)
    /// - `0.0` = hit something immediately at the origin
    pub fraction: f32,

    /// Position of the cast origin (ray point or shape center) at the stop.
    pub end_position: Vec3,

    /// Contact point on the surface that was hit.
    ///
    /// For a ray this equals `end_position`; for a sphere it is the sphere
    /// center pushed one radius against the normal.
    pub hit_point: Vec3,

    /// Surface normal at the impact point. `None` if nothing was hit.
    pub hit_normal: Option<Vec3>,

    /// Layer flags of what was hit.
    pub hit_contents: ContentFlags,

    /// Brush that was hit, if any.
    pub hit_brush: Option<BrushId>,

    /// Whether the cast started inside solid geometry.
    pub started_in_solid: bool,

    /// Whether the cast could not move at all.
    pub all_solid: bool,
}

impl Default for TraceResult {
    fn default() -> Self {
        Self::no_hit(Vec3::ZERO)
    }
}

impl TraceResult {
    /// A result indicating nothing was hit.
    pub fn no_hit(end_position: Vec3) -> Self {
        Self {
            fraction: 1.0,
            end_position,
            hit_point: end_position,
            hit_normal: None,
            hit_contents: ContentFlags::EMPTY,
            hit_brush: None,
            started_in_solid: false,
            all_solid: false,
        }
    }

    /// A result indicating a hit on `brush`.
    pub fn hit(fraction: f32, end_position: Vec3, normal: Vec3, brush: BrushId) -> Self {
        Self {
            fraction,
            end_position,
            hit_point: end_position,
            hit_normal: Some(normal),
            hit_contents: ContentFlags::GROUND,
            hit_brush: Some(brush),
            started_in_solid: false,
            all_solid: false,
        }
    }

    /// Check if this cast hit something.
    #[inline]
    pub fn hit_something(&self) -> bool {
        self.fraction < 1.0
    }

    /// Get the hit normal, defaulting to up if none.
    #[inline]
    pub fn normal_or_up(&self) -> Vec3 {
        self.hit_normal.unwrap_or(Vec3::Y)
    }

    /// Collapse into a [`RayHit`] when something was hit.
    pub fn into_hit(self) -> Option<RayHit> {
        if !self.hit_something() {
            return None;
        }
        Some(RayHit {
            point: self.hit_point,
            normal: self.normal_or_up(),
            fraction: self.fraction,
            brush: self.hit_brush,
        })
    }
}

/// A surface hit reported to the movement core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Contact point on the surface.
    pub point: Vec3,
    /// Unit surface normal.
    pub normal: Vec3,
    /// Fraction of the cast distance at which the hit happened.
    pub fraction: f32,
    /// Collider that was hit. Used to exclude the ledge surface from
    /// clearance checks.
    pub brush: Option<BrushId>,
}

/// Shape used for collision queries.
///
/// All shapes are positioned by their **center**.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceShape {
    /// A vertical capsule (cylinder with hemisphere caps).
    Capsule {
        /// Radius of the cylinder and end caps.
        radius: f32,
        /// Total height from the bottom of the lower cap to the top of the upper cap.
        height: f32,
    },

    /// A sphere, used for the feet overlap and the ledge sweep.
    Sphere {
        radius: f32,
    },

    /// An axis-aligned box given by half-extents.
    Box {
        half_extents: Vec3,
    },

    /// A single point, used for ray casts.
    Point,
}

impl TraceShape {
    /// Get the effective horizontal radius of this shape.
    pub fn radius(&self) -> f32 {
        match self {
            Self::Capsule { radius, .. } => *radius,
            Self::Sphere { radius } => *radius,
            Self::Box { half_extents } => half_extents.x.max(half_extents.z),
            Self::Point => 0.0,
        }
    }

    /// Get the height of this shape.
    pub fn height(&self) -> f32 {
        match self {
            Self::Capsule { height, .. } => *height,
            Self::Sphere { radius } => radius * 2.0,
            Self::Box { half_extents } => half_extents.y * 2.0,
            Self::Point => 0.0,
        }
    }

    /// Get a center-relative bounding box that contains this shape.
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        let half = Vec3::new(self.radius(), self.height() / 2.0, self.radius());
        match self {
            Self::Box { half_extents } => (-*half_extents, *half_extents),
            _ => (-half, half),
        }
    }
}

impl Default for TraceShape {
    fn default() -> Self {
        Self::Capsule {
            radius: 0.5,
            height: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_result_no_hit() {
        let result = TraceResult::no_hit(Vec3::new(10.0, 0.0, 0.0));
        assert!(!result.hit_something());
        assert_eq!(result.fraction, 1.0);
        assert!(result.hit_normal.is_none());
        assert!(result.into_hit().is_none());
    }

    #[test]
    fn test_trace_result_into_hit() {
        let result = TraceResult::hit(0.5, Vec3::new(5.0, 0.0, 0.0), Vec3::X, 7);
        assert!(result.hit_something());

        let hit = result.into_hit().unwrap();
        assert_eq!(hit.normal, Vec3::X);
        assert_eq!(hit.brush, Some(7));
        assert_eq!(hit.fraction, 0.5);
    }

    #[test]
    fn test_shape_bounding_box() {
        let capsule = TraceShape::Capsule {
            radius: 0.5,
            height: 2.0,
        };
        let (min, max) = capsule.bounding_box();
        assert_eq!(min, Vec3::new(-0.5, -1.0, -0.5));
        assert_eq!(max, Vec3::new(0.5, 1.0, 0.5));

        let sphere = TraceShape::Sphere { radius: 0.15 };
        assert!((sphere.height() - 0.3).abs() < 1e-6);
    }
}
