//! Collision world containing all static level geometry.
//!
//! The collision world stores brushes and answers the queries the movement
//! core needs: ray casts, sphere casts, shape overlaps and shape traces.
//! Every shape is positioned by its center.
//!
//! Round shapes (points, spheres, capsules) are measured against brushes by
//! projecting their core segment onto the brush, so overlaps, depenetration
//! and traces all agree on the same signed distance.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{contact, Ray};
use parry3d::shape::SharedShape;

use super::flags::ContentFlags;
use super::trace::{BrushId, TraceResult, TraceShape};

/// Number of bisection steps when refining a trace hit.
const TRACE_REFINE_STEPS: usize = 12;

/// Smallest sub-step used when sweeping a shape for tunneling checks.
const MIN_SWEEP_STEP: f32 = 0.05;

/// Gap kept between a moved shape and the surface it stopped against.
pub const CONTACT_SKIN: f32 = 0.002;

/// A shape closer than this to a brush is blocked by it.
///
/// Smaller than [`CONTACT_SKIN`], so a shape resting one skin away can
/// slide along the surface without the trace reporting it again.
const CONTACT_HIT: f32 = CONTACT_SKIN * 0.5;

/// Passes made when pushing a shape out of several brushes at once.
const DEPENETRATION_PASSES: usize = 4;

/// Ternary search steps when finding the closest point of a capsule core.
const SEGMENT_SEARCH_STEPS: usize = 20;

/// Beyond this clearance a brush is reported by a lower bound only.
const NEAR_DISTANCE: f32 = 0.25;

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct CollisionBrush {
    /// Unique identifier for this brush.
    pub id: BrushId,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// Layer flags used for mask filtering.
    pub contents: ContentFlags,
}

/// The collision world containing all geometry.
///
/// Supports axis-aligned boxes, boxes rotated about the vertical axis and
/// convex hulls (ramps, wedges).
///
/// The world is immutable while the simulation queries it, so it can be
/// shared across threads.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: BrushId,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            brushes: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `contents` - Layer flags for mask filtering
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, contents: ContentFlags) -> BrushId {
        self.add_oriented_box(center, half_extents, 0.0, contents)
    }

    /// Add a box rotated by `yaw` radians about the vertical axis.
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        yaw: f32,
        contents: ContentFlags,
    ) -> BrushId {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let transform = Isometry::new(
            Vector::new(center.x, center.y, center.z),
            Vector::y() * yaw,
        );
        self.push_brush(shape, transform, contents)
    }

    /// Add a convex hull to the world.
    ///
    /// Returns `None` if the hull couldn't be computed (degenerate input).
    pub fn add_convex_hull(&mut self, points: &[Vec3], contents: ContentFlags) -> Option<BrushId> {
        let parry_points: Vec<Point<Real>> =
            points.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();
        let shape = SharedShape::convex_hull(&parry_points)?;
        Some(self.push_brush(shape, Isometry::identity(), contents))
    }

    fn push_brush(
        &mut self,
        shape: SharedShape,
        transform: Isometry<Real>,
        contents: ContentFlags,
    ) -> BrushId {
        let id = self.next_id;
        self.next_id += 1;
        self.brushes.push(CollisionBrush {
            id,
            shape,
            transform,
            contents,
        });
        id
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.brushes.clear();
    }

    /// Get the number of collision brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Look up a brush by id.
    pub fn brush(&self, id: BrushId) -> Option<&CollisionBrush> {
        self.brushes.iter().find(|b| b.id == id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Sweep a shape from `start` to `end` and report the first contact.
    ///
    /// The path is sampled in steps no longer than half the shape radius, so
    /// thin brushes are not skipped. The first blocked step is refined by
    /// bisection and the shape stops [`CONTACT_SKIN`] short of the surface.
    pub fn trace(&self, start: Vec3, end: Vec3, shape: TraceShape, mask: ContentFlags) -> TraceResult {
        let delta = end - start;
        let distance = delta.length();
        let started_in_solid = self.shape_in_solid(start, shape, mask);

        if distance < 0.0001 {
            if !started_in_solid {
                return TraceResult::no_hit(start);
            }
            let mut result = self.blocked_result(0.0, start, start, Vec3::ZERO, shape, mask);
            result.started_in_solid = true;
            result.all_solid = true;
            return result;
        }

        let direction = delta / distance;
        let step = (shape.radius() * 0.5).max(MIN_SWEEP_STEP);
        let samples = (distance / step).ceil().max(1.0) as usize;

        let mut lo = 0.0_f32;
        let mut blocked_at = None;
        for i in 1..=samples {
            let t = i as f32 / samples as f32;
            if self.clearance(start + delta * t, shape, mask) < CONTACT_HIT {
                blocked_at = Some(t);
                break;
            }
            lo = t;
        }

        let Some(mut hi) = blocked_at else {
            let mut result = TraceResult::no_hit(end);
            result.started_in_solid = started_in_solid;
            return result;
        };

        // Settle one skin away from the surface
        for _ in 0..TRACE_REFINE_STEPS {
            let mid = (lo + hi) * 0.5;
            if self.clearance(start + delta * mid, shape, mask) < CONTACT_SKIN {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let end_position = start + delta * lo;
        let blocked = start + delta * hi;
        let mut result = self.blocked_result(lo, end_position, blocked, direction, shape, mask);
        result.started_in_solid = started_in_solid;
        result.all_solid = started_in_solid && lo < 0.001;
        result
    }


    /// Cast a ray through the world.
    ///
    /// # Arguments
    ///
    /// * `origin` - Ray starting position
    /// * `direction` - Ray direction (will be normalized)
    /// * `max_distance` - Maximum trace distance
    /// * `mask` - Layer flags to collide with
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
    ) -> TraceResult {
        let dir = direction.normalize_or_zero();
        if dir.length_squared() < 0.5 || max_distance <= 0.0 {
            return TraceResult::no_hit(origin);
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut closest: Option<(f32, &CollisionBrush)> = None;
        for brush in self.brushes.iter().filter(|b| mask.intersects(b.contents)) {
            if let Some(toi) = brush.shape.cast_ray(&brush.transform, &ray, max_distance, true) {
                if closest.map_or(true, |(best, _)| toi < best) {
                    closest = Some((toi, brush));
                }
            }
        }

        let Some((distance, brush)) = closest else {
            return TraceResult::no_hit(origin + dir * max_distance);
        };

        let normal = Self::ray_normal(&ray, distance, brush);
        let end_position = origin + dir * distance;
        let mut result = TraceResult::hit(distance / max_distance, end_position, normal, brush.id);
        result.hit_contents = brush.contents;
        result
    }

    /// Sweep a sphere along `direction` for up to `max_distance`.
    ///
    /// `hit_point` is the contact on the surface, one radius from the
    /// sphere center against the hit normal.
    pub fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
    ) -> TraceResult {
        let dir = direction.normalize_or_zero();
        let shape = TraceShape::Sphere { radius };
        let mut result = self.trace(origin, origin + dir * max_distance, shape, mask);
        if let Some(normal) = result.hit_normal {
            result.hit_point = result.end_position - normal * radius;
        }
        result
    }

    /// Check if a shape centered at `position` overlaps solid geometry.
    ///
    /// A shape that only touches a surface is not in solid.
    pub fn shape_in_solid(&self, position: Vec3, shape: TraceShape, mask: ContentFlags) -> bool {
        self.clearance(position, shape, mask) < 0.0
    }

    /// Collect every brush the shape centered at `position` overlaps.
    pub fn overlapping_brushes(
        &self,
        position: Vec3,
        shape: TraceShape,
        mask: ContentFlags,
    ) -> Vec<BrushId> {
        self.brush_contacts(position, shape, mask)
            .filter(|c| c.distance < 0.0)
            .map(|c| c.brush.id)
            .collect()
    }

    /// Distance from the shape surface to the closest brush in `mask`.
    ///
    /// Negative when the shape overlaps a brush. Brushes further than a
    /// short range away report a lower bound rather than the exact gap.
    pub fn clearance(&self, position: Vec3, shape: TraceShape, mask: ContentFlags) -> f32 {
        self.nearest_contact(position, shape, mask)
            .map_or(f32::INFINITY, |c| c.distance)
    }

    /// Push a shape out of solid geometry.
    ///
    /// Every brush closer than the hit distance pushes the shape out along
    /// its surface normal until the shape sits one skin away. A shape that
    /// is already clear is returned unchanged.
    pub fn resolve_penetration(&self, position: Vec3, shape: TraceShape, mask: ContentFlags) -> Vec3 {
        let mut resolved = position;
        for _ in 0..DEPENETRATION_PASSES {
            let correction: Vec3 = self
                .brush_contacts(resolved, shape, mask)
                .filter(|c| c.distance < CONTACT_HIT)
                .map(|c| c.normal * (CONTACT_SKIN - c.distance))
                .sum();
            if correction == Vec3::ZERO {
                break;
            }
            resolved += correction;
        }
        resolved
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn brush_contacts<'a>(
        &'a self,
        position: Vec3,
        shape: TraceShape,
        mask: ContentFlags,
    ) -> impl Iterator<Item = BrushContact<'a>> + 'a {
        self.brushes
            .iter()
            .filter(move |b| mask.intersects(b.contents))
            .map(move |brush| {
                let (distance, normal) = Self::measure(position, shape, brush);
                BrushContact {
                    brush,
                    distance,
                    normal,
                }
            })
    }

    fn nearest_contact(
        &self,
        position: Vec3,
        shape: TraceShape,
        mask: ContentFlags,
    ) -> Option<BrushContact<'_>> {
        self.brush_contacts(position, shape, mask)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Signed distance and outward normal between a shape and one brush.
    fn measure(position: Vec3, shape: TraceShape, brush: &CollisionBrush) -> (f32, Vec3) {
        match shape {
            TraceShape::Capsule { radius, height } => {
                let half = (height - 2.0 * radius).max(0.0) / 2.0;
                let (distance, normal) = Self::segment_distance(
                    brush,
                    position - Vec3::Y * half,
                    position + Vec3::Y * half,
                    radius,
                );
                (distance - radius, normal)
            }
            TraceShape::Sphere { radius } => {
                let (distance, normal) = Self::point_distance(brush, position);
                (distance - radius, normal)
            }
            TraceShape::Point => Self::point_distance(brush, position),
            TraceShape::Box { half_extents } => {
                let test_shape =
                    SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
                let test_transform = Isometry::translation(position.x, position.y, position.z);
                match contact(
                    &test_transform,
                    test_shape.as_ref(),
                    &brush.transform,
                    brush.shape.as_ref(),
                    NEAR_DISTANCE,
                ) {
                    // normal2 points out of the brush, towards our shape
                    Ok(Some(hit)) => (hit.dist, Vec3::new(hit.normal2.x, hit.normal2.y, hit.normal2.z)),
                    _ => (NEAR_DISTANCE, Vec3::Y),
                }
            }
        }
    }

    /// Signed distance from a point to a brush, negative inside.
    fn point_distance(brush: &CollisionBrush, point: Vec3) -> (f32, Vec3) {
        let projection =
            brush
                .shape
                .project_point(&brush.transform, &Point::new(point.x, point.y, point.z), false);
        let surface = Vec3::new(projection.point.x, projection.point.y, projection.point.z);
        let offset = point - surface;
        let distance = offset.length();
        if projection.is_inside {
            (-distance, (-offset).try_normalize().unwrap_or(Vec3::Y))
        } else {
            (distance, offset.try_normalize().unwrap_or(Vec3::Y))
        }
    }

    /// Smallest signed distance from a segment to a brush.
    ///
    /// The signed distance to a convex brush is convex along the segment, so
    /// a ternary search finds the closest point. Both ends are checked too,
    /// which keeps flat floors and walls exact. A segment swept by `radius`
    /// that cannot come near the brush gets a lower bound instead.
    fn segment_distance(brush: &CollisionBrush, a: Vec3, b: Vec3, radius: f32) -> (f32, Vec3) {
        let at = |t: f32| Self::point_distance(brush, a.lerp(b, t));
        let from_a = at(0.0);
        let length = a.distance(b);
        if length < 1e-4 {
            return from_a;
        }
        let from_b = at(1.0);
        let mut best = if from_b.0 < from_a.0 { from_b } else { from_a };

        // The core cannot get closer than this
        let bound = best.0 - length * 0.5;
        if bound - radius > NEAR_DISTANCE {
            return (bound, best.1);
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        for _ in 0..SEGMENT_SEARCH_STEPS {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if at(m1).0 <= at(m2).0 {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        let inner = at((lo + hi) * 0.5);
        if inner.0 < best.0 {
            best = inner;
        }
        best
    }

    /// Build the blocked part of a trace result.
    ///
    /// The normal comes from the closest brush at `blocked`; if that is
    /// degenerate the reversed horizontal travel direction is used.
    fn blocked_result(
        &self,
        fraction: f32,
        end_position: Vec3,
        blocked: Vec3,
        direction: Vec3,
        shape: TraceShape,
        mask: ContentFlags,
    ) -> TraceResult {
        let nearest = self
            .nearest_contact(blocked, shape, mask)
            .filter(|c| c.distance < CONTACT_SKIN);
        let normal = match nearest {
            Some(c) => c.normal,
            None => {
                let horizontal = Vec3::new(-direction.x, 0.0, -direction.z);
                if horizontal.length_squared() > 0.1 {
                    horizontal.normalize()
                } else {
                    Vec3::Y
                }
            }
        };

        TraceResult {
            fraction,
            end_position,
            hit_point: end_position,
            hit_normal: Some(normal),
            hit_contents: nearest.map_or(ContentFlags::EMPTY, |c| c.brush.contents),
            hit_brush: nearest.map(|c| c.brush.id),
            started_in_solid: false,
            all_solid: false,
        }
    }

    fn ray_normal(ray: &Ray, toi: f32, brush: &CollisionBrush) -> Vec3 {
        match brush
            .shape
            .cast_ray_and_get_normal(&brush.transform, ray, toi + 0.01, true)
        {
            Some(intersection) => Vec3::new(
                intersection.normal.x,
                intersection.normal.y,
                intersection.normal.z,
            ),
            None => -Vec3::new(ray.dir.x, ray.dir.y, ray.dir.z).normalize_or_zero(),
        }
    }
}

/// How far a shape is from one brush.
#[derive(Debug, Clone, Copy)]
struct BrushContact<'a> {
    brush: &'a CollisionBrush,
    /// Signed gap between the shape and the brush, negative when overlapping.
    distance: f32,
    /// Unit normal pointing out of the brush towards the shape.
    normal: Vec3,
}

// ============================================================================
// Tests
// ============================================================================
