//! Layer and contact flags for collision filtering.
//!
//! [`ContentFlags`] say what layer a brush belongs to and are used as masks
//! for every sensor query. [`CollisionFlags`] report which sides of the
//! character touched geometry during the last move.

use serde::{Deserialize, Serialize};

/// Layer flags describing what kind of geometry a brush is.
///
/// Sensor queries take a mask of these; a brush is considered only if its
/// flags intersect the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Nothing.
    pub const EMPTY: Self = Self(0);

    /// Walkable floors, ramps and platforms.
    pub const GROUND: Self = Self(1 << 0);

    /// Vertical surfaces that can be wall-run. Their tops still count as ground.
    pub const WALL: Self = Self(1 << 1);

    /// Ledges that can be mantled onto when no dedicated mask is configured.
    pub const MANTLE: Self = Self(1 << 2);

    /// Invisible blockers that stop the character but are never sensed.
    pub const PLAYER_CLIP: Self = Self(1 << 3);

    /// Trigger volumes (checkpoints, kill zones). Never blocks movement.
    pub const TRIGGER: Self = Self(1 << 4);

    /// Everything the character mover collides with.
    pub const MASK_MOVER_SOLID: Self = Self(
        Self::GROUND.0 | Self::WALL.0 | Self::MANTLE.0 | Self::PLAYER_CLIP.0,
    );

    /// Layers used for the feet overlap test.
    pub const MASK_GROUNDED: Self = Self(Self::GROUND.0 | Self::WALL.0 | Self::MANTLE.0);

    /// Check if these flags contain every flag in `other`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Check if no flag is set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for ContentFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Which sides of the character touched geometry during a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollisionFlags(pub u8);

impl CollisionFlags {
    /// No contact.
    pub const NONE: Self = Self(0);

    /// Touched something below (floor-like normal).
    pub const BELOW: Self = Self(1 << 0);

    /// Touched something to the side.
    pub const SIDES: Self = Self(1 << 1);

    /// Touched something above (ceiling-like normal).
    pub const ABOVE: Self = Self(1 << 2);

    /// Classify a contact normal.
    ///
    /// `min_floor_y` is the cosine of the steepest walkable slope; normals
    /// pointing down at least as steeply count as ceilings.
    pub fn from_normal(normal: glam::Vec3, min_floor_y: f32) -> Self {
        if normal.y >= min_floor_y {
            Self::BELOW
        } else if normal.y <= -min_floor_y {
            Self::ABOVE
        } else {
            Self::SIDES
        }
    }

    #[inline]
    pub fn below(self) -> bool {
        (self.0 & Self::BELOW.0) != 0
    }

    #[inline]
    pub fn sides(self) -> bool {
        (self.0 & Self::SIDES.0) != 0
    }

    #[inline]
    pub fn above(self) -> bool {
        (self.0 & Self::ABOVE.0) != 0
    }
}

impl std::ops::BitOr for CollisionFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for CollisionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_content_flags_operations() {
        let combined = ContentFlags::GROUND | ContentFlags::WALL;

        assert!(combined.contains(ContentFlags::GROUND));
        assert!(combined.contains(ContentFlags::WALL));
        assert!(!combined.contains(ContentFlags::MANTLE));
        assert!(combined.intersects(ContentFlags::WALL | ContentFlags::TRIGGER));
        assert!(!combined.intersects(ContentFlags::TRIGGER));
    }

    #[test]
    fn test_mover_mask_ignores_triggers() {
        let mask = ContentFlags::MASK_MOVER_SOLID;
        assert!(mask.contains(ContentFlags::GROUND));
        assert!(mask.contains(ContentFlags::PLAYER_CLIP));
        assert!(!mask.intersects(ContentFlags::TRIGGER));
    }

    #[test]
    fn test_collision_flags_from_normal() {
        assert!(CollisionFlags::from_normal(Vec3::Y, 0.7).below());
        assert!(CollisionFlags::from_normal(-Vec3::Y, 0.7).above());
        assert!(CollisionFlags::from_normal(Vec3::X, 0.7).sides());

        let mut flags = CollisionFlags::NONE;
        flags |= CollisionFlags::ABOVE;
        flags |= CollisionFlags::SIDES;
        assert!(flags.above() && flags.sides() && !flags.below());
    }
}
