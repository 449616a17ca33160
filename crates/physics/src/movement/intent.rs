//! Input sampling: raw command axes and buttons to movement intents.

use glam::Vec3;

use super::state::{forward_from_yaw, right_from_yaw, PlayerCommand};

/// What the player wants to do this tick, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementIntent {
    /// Unit world-space input direction, or zero with no input.
    pub direction: Vec3,

    /// Input strength in `[0, 1]`.
    pub magnitude: f32,

    /// Raw strafe axis, used for wall-run steering.
    pub strafe: f32,

    /// Facing basis from the camera yaw.
    pub forward: Vec3,
    pub right: Vec3,

    pub jump_pressed: bool,
    pub dash_pressed: bool,
    pub sprint_held: bool,

    /// Slide pressed this tick while the forward key is held.
    pub slide_requested: bool,
}

impl MovementIntent {
    /// Sample a command. Axes are clamped to `[-1, 1]`.
    pub fn sample(command: &PlayerCommand) -> Self {
        let forward = forward_from_yaw(command.yaw);
        let right = right_from_yaw(command.yaw);

        let strafe = sanitize_axis(command.right_move);
        let advance = sanitize_axis(command.forward_move);

        let raw = right * strafe + forward * advance;
        let magnitude = raw.length().clamp(0.0, 1.0);
        let direction = if magnitude > 0.001 {
            raw.normalize()
        } else {
            Vec3::ZERO
        };

        Self {
            direction,
            magnitude,
            strafe,
            forward,
            right,
            jump_pressed: command.jump_pressed(),
            dash_pressed: command.dash_pressed(),
            sprint_held: command.sprint_held(),
            slide_requested: command.slide_pressed() && command.forward_held(),
        }
    }

    /// Input direction, or the facing when there is no input.
    pub fn direction_or_facing(&self) -> Vec3 {
        if self.direction.length_squared() > 0.01 {
            self.direction
        } else {
            self.forward
        }
    }
}

fn sanitize_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
