//! Freerun Physics
//!
//! The movement core of a first-person parkour game: a character controller
//! with sprinting, slides, dashes, wall-runs, mantles and landing rolls, on
//! top of a small brush-based collision world.
//!
//! # Architecture
//!
//! The crate is split into two main systems:
//!
//! - **Collision**: Brushes, traces, probes and the sliding character mover
//! - **Movement**: Uses collision queries to run the player's movement state machine
//!
//! The movement core only talks to the world through
//! [`SceneQuery`](collision::SceneQuery), so it can run against the built-in
//! [`CollisionWorld`] or any other engine's queries.

pub mod collision;
pub mod error;
pub mod movement;

// Re-export commonly used types
pub use collision::{CollisionFlags, CollisionWorld, ContentFlags, RayHit, SceneQuery, TraceResult, TraceShape};
pub use error::MovementError;
pub use movement::{
    CharacterRig, CommandButtons, MovementConfig, MovementEvent, MovementMode, MovementState,
    PlayerCommand, PlayerController, TickReport,
};
