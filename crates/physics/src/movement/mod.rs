//! Parkour movement for a first-person character.
//!
//! This module implements the movement core:
//!
//! - Momentum-blended ground and air movement with sprint
//! - Coyote time, jump buffering and bunny-hop chains
//! - Slides, dashes with a charge pool, and landing rolls
//! - Wall-running and wall jumps
//! - Mantling onto ledges
//!
//! # Design
//!
//! Movement is driven by the [`PlayerController`], which takes a
//! [`PlayerCommand`] each tick and updates the character's [`MovementState`]
//! through any [`SceneQuery`](crate::collision::SceneQuery). Only one
//! exclusive [`MovementMode`] is active at a time.
//!
//! The same state, commands and scene always produce the same result.

mod behaviors;
mod config;
mod controller;
mod events;
mod intent;
mod rig;
mod sensor;
mod state;
mod task;
mod timers;
mod velocity;

pub use behaviors::{DashTask, MantleTask, MovementMode, RollTask, SlideTask, WallRunTask};
pub use config::MovementConfig;
pub use controller::{PlayerController, TickReport};
pub use events::{MovementEvent, NotificationBus, SubscriptionId};
pub use intent::MovementIntent;
pub use rig::{CapsuleVolume, CharacterRig, CollisionVolume};
pub use sensor::{EnvironmentSensor, WallContact, WallSide, GROUND_PROBE_RADIUS};
pub use state::{forward_from_yaw, right_from_yaw, CommandButtons, MovementState, PlayerCommand};
pub use task::TaskTimer;
pub use timers::DashCharges;
