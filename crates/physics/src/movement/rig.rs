//! The body a controller drives: collision capsule and attachment points.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::config::MovementConfig;

/// Standing collision capsule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleVolume {
    pub radius: f32,
    pub height: f32,
}

/// Attachments a controller is built against.
///
/// Offsets are relative to the standing capsule center. The collision
/// volume is required; the anchors fall back to defaults derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterRig {
    pub collision_volume: Option<CapsuleVolume>,

    /// Point under the feet where the ground probe sits.
    pub ground_anchor: Option<Vec3>,

    /// Camera position.
    pub camera_mount: Option<Vec3>,
}

impl CharacterRig {
    /// A complete rig sized from the config.
    pub fn from_config(config: &MovementConfig) -> Self {
        let half_height = config.standing_height * 0.5;
        Self {
            collision_volume: Some(CapsuleVolume {
                radius: config.player_radius,
                height: config.standing_height,
            }),
            ground_anchor: Some(Vec3::new(0.0, -(half_height - 0.1), 0.0)),
            camera_mount: Some(Vec3::new(0.0, half_height * 0.8, 0.0)),
        }
    }
}

/// The collision capsule as it currently is.
///
/// The capsule keeps its feet in place as it shrinks, so its center sits
/// `center_offset` below the standing center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionVolume {
    pub radius: f32,
    pub height: f32,
    pub center_offset: Vec3,
}

impl CollisionVolume {
    pub fn new(radius: f32, standing_height: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            center_offset: Vec3::new(0.0, (height - standing_height) * 0.5, 0.0),
        }
    }
}
