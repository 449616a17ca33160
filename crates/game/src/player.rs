//! Player entity: movement state, its controller and input history.

use freerun_physics::movement::{CharacterRig, DashCharges, TickReport};
use freerun_physics::{CollisionWorld, MovementConfig, MovementEvent, MovementState, PlayerController};
use glam::Vec3;

use crate::input::{InputSampler, PlayerInput};
use crate::level::SpawnPoint;

/// Unique identifier for entities.
pub type EntityId = u32;

/// A player in the game.
#[derive(Debug)]
pub struct Player {
    /// Unique player ID.
    pub id: EntityId,

    /// Player name/handle.
    pub name: String,

    /// Movement physics state.
    pub movement: MovementState,

    /// Where this player comes back after falling out.
    pub spawn: SpawnPoint,

    /// Times this player has respawned.
    pub respawns: u32,

    /// `None` when the rig could not be driven; the player then stands still.
    controller: Option<PlayerController>,

    sampler: InputSampler,
}

impl Player {
    /// Create a new player at a spawn point with a rig sized from `config`.
    pub fn new(id: EntityId, name: String, spawn: SpawnPoint, config: &MovementConfig) -> Self {
        Self::with_rig(id, name, spawn, config, CharacterRig::from_config(config))
    }

    /// Create a player for a specific character rig.
    ///
    /// A rig the controller rejects leaves the player without movement.
    pub fn with_rig(
        id: EntityId,
        name: String,
        spawn: SpawnPoint,
        config: &MovementConfig,
        rig: CharacterRig,
    ) -> Self {
        let controller = match PlayerController::new(config.clone(), rig) {
            Ok(controller) => Some(controller),
            Err(err) => {
                log::error!("player {} '{}': {}, movement disabled", id, name, err);
                None
            }
        };

        let movement = match &controller {
            Some(controller) => controller.spawn_state(spawn.position),
            None => MovementState::new(
                spawn.position,
                DashCharges::new(config.dash_charges, config.dash_recharge_delay),
                config.standing_height,
            ),
        };

        let mut player = Self {
            id,
            name,
            movement,
            spawn,
            respawns: 0,
            controller,
            sampler: InputSampler::new(spawn.facing),
        };
        player.movement.facing_yaw = spawn.facing;
        player
    }

    /// Get the player's current position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.movement.position
    }

    /// Get the player's eye position (for camera).
    pub fn eye_position(&self) -> Vec3 {
        match &self.controller {
            Some(controller) => controller.eye_position(&self.movement),
            None => self.movement.position,
        }
    }

    /// Get the player's forward direction (horizontal only).
    #[inline]
    pub fn forward_direction(&self) -> Vec3 {
        self.movement.forward_direction()
    }

    /// Check if the player is on the ground.
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.movement.grounded
    }

    /// Whether the player has a working controller.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<&PlayerController> {
        self.controller.as_ref()
    }

    pub fn controller_mut(&mut self) -> Option<&mut PlayerController> {
        self.controller.as_mut()
    }

    /// Sample input and advance movement one tick.
    ///
    /// Returns `None` for a disabled player.
    pub fn advance(
        &mut self,
        input: &PlayerInput,
        world: &CollisionWorld,
        mouse_sensitivity: f32,
        delta_time: f32,
    ) -> Option<TickReport> {
        let command = self.sampler.sample(input, mouse_sensitivity);
        let controller = self.controller.as_mut()?;
        Some(controller.advance(&mut self.movement, &command, world, delta_time))
    }

    /// Put the player back at its spawn point with fresh movement state.
    ///
    /// Returns the events that closed out what the player was doing.
    pub fn respawn(&mut self) -> Vec<MovementEvent> {
        self.respawns += 1;
        let position = self.spawn.position + Vec3::Y * 0.1;
        let events = match self.controller.as_mut() {
            Some(controller) => controller.respawn(&mut self.movement, position),
            None => {
                self.movement.position = position;
                Vec::new()
            }
        };
        self.movement.facing_yaw = self.spawn.facing;
        self.sampler.reset(self.spawn.facing);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn spawn() -> SpawnPoint {
        SpawnPoint {
            position: Vec3::new(0.0, 1.0, 0.0),
            facing: 0.0,
        }
    }

    #[test]
    fn test_player_creation() {
        let config = MovementConfig::default();
        let player = Player::new(1, "Test".to_string(), spawn(), &config);

        assert!(player.is_enabled());
        assert!(player.on_ground());
        assert_eq!(player.position(), Vec3::new(0.0, 1.0, 0.0));
        assert!(player.eye_position().y > player.position().y);
    }

    #[test]
    fn test_rig_without_volume_disables_movement() {
        let config = MovementConfig::default();
        let rig = CharacterRig {
            collision_volume: None,
            ..CharacterRig::from_config(&config)
        };
        let mut player = Player::with_rig(2, "Ghost".to_string(), spawn(), &config, rig);
        assert!(!player.is_enabled());

        let level = Level::parkour_course();
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        assert!(player.advance(&input, &level.collision, 1.0, 1.0 / 60.0).is_none());
        assert_eq!(player.position(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_walks_forward() {
        let config = MovementConfig::default();
        let level = Level::parkour_course();
        let mut player = Player::new(1, "Runner".to_string(), spawn(), &config);

        let mut input = PlayerInput::default();
        input.movement.forward = true;
        for _ in 0..30 {
            player.advance(&input, &level.collision, 1.0, 1.0 / 60.0);
        }

        // Speed eases toward walk speed at the momentum rate, about 5.2m in half a second
        let rate = 1.0 - config.momentum_lerp / 60.0;
        let expected: f32 = (1..=30)
            .map(|k| config.walk_speed * (1.0 - rate.powi(k)) / 60.0)
            .sum();
        assert!(
            (player.position().x - expected).abs() < 0.1,
            "walked {} instead of {}",
            player.position().x,
            expected
        );
        assert!((player.position().y - 1.0).abs() < 0.01);
        assert!(player.position().z.abs() < 1e-3);
        assert!(player.on_ground());
    }

    #[test]
    fn test_respawn_resets_movement() {
        let config = MovementConfig::default();
        let mut player = Player::new(1, "Test".to_string(), spawn(), &config);
        player.movement.position = Vec3::new(40.0, -30.0, 0.0);
        player.movement.vertical_velocity = -50.0;

        player.respawn();
        assert_eq!(player.respawns, 1);
        assert!((player.position() - Vec3::new(0.0, 1.1, 0.0)).length() < 1e-5);
        assert_eq!(player.movement.vertical_velocity, 0.0);
    }
}
