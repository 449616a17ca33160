//! Movement state and input structures.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::behaviors::MovementMode;
use super::task::TaskTimer;
use super::timers::DashCharges;

/// Complete movement state for one character.
///
/// Owned by the caller and mutated only inside
/// [`PlayerController::advance`](super::PlayerController::advance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Center of the standing capsule in world space.
    pub position: Vec3,

    /// Horizontal velocity (meters/second). `y` is always zero.
    pub horizontal_velocity: Vec3,

    /// Vertical velocity (meters/second, up is positive).
    pub vertical_velocity: f32,

    /// Feet are touching ground this tick.
    pub grounded: bool,

    /// Feet were touching ground last tick.
    pub was_grounded: bool,

    /// Remaining coyote window.
    pub coyote_timer: f32,

    /// Remaining jump buffer window.
    pub jump_buffer_timer: f32,

    /// Exclusive movement mode, carrying its task.
    pub mode: MovementMode,

    pub slide_cooldown: f32,

    /// Minimum time left before another dash can start.
    pub dash_cooldown: f32,

    pub dash_charges: DashCharges,

    pub bunny_hop_chain: u32,

    /// Clock time of the last ground jump.
    pub last_jump_time: Option<f32>,

    /// Accumulated simulated time (seconds).
    pub clock: f32,

    /// Current collision capsule height.
    pub capsule_height: f32,

    /// Camera yaw from the last command (radians).
    pub facing_yaw: f32,

    /// Sprint state as last published.
    pub sprinting: bool,

    /// Gravity ramp running after a wall-run ended.
    pub gravity_restore: Option<TaskTimer>,

    /// A wall-run ran out of time; no new one until the feet touch ground.
    pub wall_run_spent: bool,
}

impl MovementState {
    /// Spawn defaults: grounded, charges full, timers zero.
    pub fn new(position: Vec3, dash_charges: DashCharges, standing_height: f32) -> Self {
        Self {
            position,
            horizontal_velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            grounded: true,
            was_grounded: true,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            mode: MovementMode::None,
            slide_cooldown: 0.0,
            dash_cooldown: 0.0,
            dash_charges,
            bunny_hop_chain: 0,
            last_jump_time: None,
            clock: 0.0,
            capsule_height: standing_height,
            facing_yaw: 0.0,
            sprinting: false,
            gravity_restore: None,
            wall_run_spent: false,
        }
    }

    /// Full velocity (horizontal plus vertical).
    pub fn velocity(&self) -> Vec3 {
        self.horizontal_velocity + Vec3::Y * self.vertical_velocity
    }

    /// Get current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        self.horizontal_velocity.length()
    }

    /// Forward direction from the facing yaw (horizontal only).
    pub fn forward_direction(&self) -> Vec3 {
        forward_from_yaw(self.facing_yaw)
    }

    /// Right direction from the facing yaw (horizontal only).
    pub fn right_direction(&self) -> Vec3 {
        right_from_yaw(self.facing_yaw)
    }
}

/// Horizontal forward vector for a yaw angle. Yaw 0 faces +X.
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vec3::new(cos_yaw, 0.0, sin_yaw)
}

/// Horizontal right vector for a yaw angle.
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vec3::new(-sin_yaw, 0.0, cos_yaw)
}

/// Input command from the player for a single tick.
///
/// Axes and held buttons describe the current input; `pressed` holds the
/// buttons that went down this tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// Forward/backward movement (-1.0 to 1.0). Positive = forward.
    pub forward_move: f32,

    /// Strafe left/right (-1.0 to 1.0). Positive = right.
    pub right_move: f32,

    /// Camera yaw (radians).
    pub yaw: f32,

    /// Buttons currently held.
    pub held: CommandButtons,

    /// Buttons that went down this tick.
    pub pressed: CommandButtons,
}

/// Button state flags for player commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandButtons(pub u16);

impl CommandButtons {
    pub const JUMP: u16 = 1 << 0;
    pub const DASH: u16 = 1 << 1;
    pub const SLIDE: u16 = 1 << 2;
    pub const SPRINT: u16 = 1 << 3;

    /// The dedicated forward key, which a slide requires.
    pub const FORWARD: u16 = 1 << 4;

    /// Check if a button is set.
    #[inline]
    pub fn pressed(self, button: u16) -> bool {
        (self.0 & button) != 0
    }

    /// Set a button.
    #[inline]
    pub fn press(&mut self, button: u16) {
        self.0 |= button;
    }

    /// Clear a button.
    #[inline]
    pub fn release(&mut self, button: u16) {
        self.0 &= !button;
    }

    /// Buttons set here but not in `previous`.
    #[inline]
    pub fn rising_edges(self, previous: Self) -> Self {
        Self(self.0 & !previous.0)
    }
}

impl PlayerCommand {
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.pressed.pressed(CommandButtons::JUMP)
    }

    #[inline]
    pub fn dash_pressed(&self) -> bool {
        self.pressed.pressed(CommandButtons::DASH)
    }

    #[inline]
    pub fn slide_pressed(&self) -> bool {
        self.pressed.pressed(CommandButtons::SLIDE)
    }

    #[inline]
    pub fn sprint_held(&self) -> bool {
        self.held.pressed(CommandButtons::SPRINT)
    }

    #[inline]
    pub fn forward_held(&self) -> bool {
        self.held.pressed(CommandButtons::FORWARD)
    }
}
