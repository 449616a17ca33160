//! Game simulation - the fixed-tick game loop.

use freerun_physics::MovementEvent;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::input::PlayerInput;
use crate::level::Level;
use crate::player::{EntityId, Player};

/// A movement event tagged with the player it happened to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerEvent {
    pub player: EntityId,
    pub event: MovementEvent,
}

/// The main game simulation.
///
/// Advances every player by one fixed step per [`tick`](Self::tick). Given
/// the same inputs it always produces the same results.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u64,

    /// Simulation configuration.
    pub config: SimulationConfig,

    /// Current level.
    pub level: Level,

    /// All players in the game.
    pub players: Vec<Player>,

    /// Next entity ID to assign.
    next_entity_id: EntityId,
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: SimulationConfig, mut level: Level) -> Self {
        if let Some(kill_plane_y) = config.kill_plane_y {
            level.kill_plane_y = kill_plane_y;
        }

        Self {
            frame: 0,
            config,
            level,
            players: Vec::new(),
            next_entity_id: 1,
        }
    }

    /// Create a simulation with default configuration and the parkour course.
    pub fn test() -> Self {
        Self::new(SimulationConfig::default(), Level::parkour_course())
    }

    /// Add a player to the simulation.
    ///
    /// Returns the player's ID.
    pub fn add_player(&mut self, name: &str) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;

        let spawn = self.level.spawn_for(self.players.len());
        let player = Player::new(id, name.to_string(), spawn, &self.config.movement);
        log::info!("player {} '{}' joined at {:?}", id, name, spawn.position);

        self.players.push(player);
        id
    }

    /// Remove a player from the simulation.
    pub fn remove_player(&mut self, player_id: EntityId) {
        self.players.retain(|p| p.id != player_id);
    }

    /// Get a player by ID.
    pub fn get_player(&self, player_id: EntityId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Get a mutable reference to a player by ID.
    pub fn get_player_mut(&mut self, player_id: EntityId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    /// Advance the simulation by one tick.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Player inputs indexed by player position in the `players` array
    ///
    /// Returns every movement event of the tick, in player order.
    pub fn tick(&mut self, inputs: &[PlayerInput]) -> Vec<PlayerEvent> {
        let delta_time = self.config.delta_time();
        let mut events = Vec::new();

        for (i, player) in self.players.iter_mut().enumerate() {
            // Missing input means no keys held
            let input = inputs.get(i).cloned().unwrap_or_default();

            if let Some(report) = player.advance(
                &input,
                &self.level.collision,
                self.config.mouse_sensitivity,
                delta_time,
            ) {
                events.extend(report.events.into_iter().map(|event| PlayerEvent {
                    player: player.id,
                    event,
                }));
            }

            if self.level.is_below_kill_plane(player.position()) {
                log::info!(
                    "player {} fell out at {:?}, respawning",
                    player.id,
                    player.position()
                );
                let closing = player.respawn();
                events.extend(closing.into_iter().map(|event| PlayerEvent {
                    player: player.id,
                    event,
                }));
            }
        }

        self.frame += 1;
        events
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

// ============================================================================
// Tests
// ============================================================================
