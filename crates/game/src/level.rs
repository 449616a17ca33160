//! Levels: collision geometry, spawn points and the kill plane.

use freerun_physics::{CollisionWorld, ContentFlags};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A game level containing collision geometry and spawn points.
#[derive(Debug)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Collision world for physics.
    pub collision: CollisionWorld,

    /// Player spawn points.
    pub spawn_points: Vec<SpawnPoint>,

    /// Anything whose center falls below this height is out of the level.
    pub kill_plane_y: f32,
}

/// A spawn point for players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Standing capsule center in world space.
    pub position: Vec3,

    /// Initial facing direction (yaw in radians).
    pub facing: f32,
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str, kill_plane_y: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn_points: Vec::new(),
            kill_plane_y,
        }
    }

    /// A short parkour course along +X.
    ///
    /// Start pad, a wall-run wall over a pit, a landing pad with a
    /// mantle ledge at its far end.
    pub fn parkour_course() -> Self {
        let mut level = Self::new("parkour_course", "Parkour Course", -20.0);
        let world = &mut level.collision;

        // Start pad, top at y=0, x in [-10, 30]
        world.add_box(
            Vec3::new(10.0, -0.5, 0.0),
            Vec3::new(20.0, 0.5, 10.0),
            ContentFlags::GROUND,
        );

        // Landing pad past the pit, x in [50, 90]
        world.add_box(
            Vec3::new(70.0, -0.5, 0.0),
            Vec3::new(20.0, 0.5, 10.0),
            ContentFlags::GROUND,
        );

        // Run wall along the pit on the right (+Z), face at z=3
        world.add_box(
            Vec3::new(40.0, 4.0, 3.5),
            Vec3::new(14.0, 6.0, 0.5),
            ContentFlags::WALL,
        );

        // Mantle ledge on the landing pad, face at x=80, top at y=1.5
        world.add_box(
            Vec3::new(84.0, 0.75, 0.0),
            Vec3::new(4.0, 0.75, 6.0),
            ContentFlags::GROUND | ContentFlags::MANTLE,
        );

        // Angled kicker wall on the start pad
        world.add_oriented_box(
            Vec3::new(0.0, 2.0, -6.0),
            Vec3::new(3.0, 2.0, 0.5),
            0.4,
            ContentFlags::WALL,
        );

        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(0.0, 1.0, 0.0),
            facing: 0.0,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(0.0, 1.0, 4.0),
            facing: 0.0,
        });

        log::debug!(
            "built level '{}' with {} brushes",
            level.id,
            level.collision.brush_count()
        );
        level
    }

    /// Get a player spawn point by index.
    pub fn get_player_spawn(&self, index: usize) -> Option<&SpawnPoint> {
        self.spawn_points.get(index)
    }

    /// Get the number of player spawn points.
    pub fn player_spawn_count(&self) -> usize {
        self.spawn_points.len()
    }

    /// Spawn point for the `n`th player, cycling through the list.
    pub fn spawn_for(&self, n: usize) -> SpawnPoint {
        let count = self.player_spawn_count();
        if count == 0 {
            return SpawnPoint {
                position: Vec3::new(0.0, 1.0, 0.0),
                facing: 0.0,
            };
        }
        self.spawn_points[n % count]
    }

    pub fn is_below_kill_plane(&self, position: Vec3) -> bool {
        position.y < self.kill_plane_y
    }
}
