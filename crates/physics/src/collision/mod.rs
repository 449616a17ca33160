//! Collision detection for character movement.
//!
//! This module provides world collision testing with capsule, sphere and box
//! shapes on top of parry3d.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: The collision environment containing all geometry
//! - [`SceneQuery`]: The query interface the movement core is written against
//! - [`TraceResult`]: Output from a ray or shape cast
//! - [`CollisionFlags`]: Which sides of the character touched geometry
//!
//! # Tracing Algorithm
//!
//! Traces sweep a shape through the world and return:
//! - How far the shape traveled (fraction 0.0-1.0)
//! - The final position
//! - Surface normal and brush at impact (if any)

mod flags;
mod mover;
mod query;
#[cfg(test)]
pub(crate) mod scripted;
mod trace;
mod world;

pub use flags::{CollisionFlags, ContentFlags};
pub use mover::{clip_velocity, move_character, MoveResult, MIN_FLOOR_NORMAL_Y};
pub use query::SceneQuery;
pub use trace::{BrushId, RayHit, TraceResult, TraceShape};
pub use world::{CollisionBrush, CollisionWorld};
