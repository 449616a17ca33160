//! Freerun Game Layer
//!
//! This crate wraps the movement core in a playable simulation:
//!
//! - Raw key input turned into movement commands with press edges
//! - A parkour test course with spawn points and a kill plane
//! - Players that own their movement controller and state
//! - A fixed-tick simulation loop with respawns
//! - HUD bindings fed from the movement event bus
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      Simulation                           │
//! │  ┌─────────┐    ┌────────────┐    ┌───────────────────┐   │
//! │  │ Input   │───►│ Controller │───►│ Movement events   │   │
//! │  │ Sampler │    │ (per       │    │ (HUD, logging)    │   │
//! │  └─────────┘    │  player)   │    └───────────────────┘   │
//! │                 └─────┬──────┘                            │
//! │                       ▼                                   │
//! │                 Level collision                           │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod hud;
pub mod input;
pub mod level;
pub mod player;
pub mod simulation;

// Re-export main types
pub use config::{ConfigError, SimulationConfig};
pub use hud::DashMeter;
pub use input::{InputSampler, PlayerInput};
pub use level::Level;
pub use player::Player;
pub use simulation::Simulation;

// Re-export physics types for convenience
pub use freerun_physics::{
    CollisionWorld, ContentFlags, MovementConfig, MovementEvent, MovementState, PlayerCommand,
    PlayerController,
};
