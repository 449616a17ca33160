//! Player input handling.
//!
//! This module converts raw key and mouse state into commands for the
//! movement core. Commands carry both held buttons and the buttons that
//! went down this tick, so the sampler remembers the previous tick.

use freerun_physics::movement::{CommandButtons, PlayerCommand};
use serde::{Deserialize, Serialize};

/// Raw player input for a single frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementInput,

    /// Horizontal mouse delta this frame (pixels).
    pub mouse_dx: f32,

    /// Action buttons held.
    pub actions: ActionInput,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    pub jump: bool,
    pub dash: bool,
    pub slide: bool,
    pub sprint: bool,
}

impl PlayerInput {
    /// Buttons held in this frame.
    pub fn held_buttons(&self) -> CommandButtons {
        let mut buttons = CommandButtons::default();
        let mapping = [
            (self.actions.jump, CommandButtons::JUMP),
            (self.actions.dash, CommandButtons::DASH),
            (self.actions.slide, CommandButtons::SLIDE),
            (self.actions.sprint, CommandButtons::SPRINT),
            (self.movement.forward, CommandButtons::FORWARD),
        ];
        for (down, button) in mapping {
            if down {
                buttons.press(button);
            }
        }
        buttons
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward || self.movement.backward || self.movement.left || self.movement.right
    }
}

/// Turns a stream of [`PlayerInput`] frames into [`PlayerCommand`]s.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    previous: CommandButtons,
    yaw: f32,
}

impl InputSampler {
    pub fn new(yaw: f32) -> Self {
        Self {
            previous: CommandButtons::default(),
            yaw,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Build this tick's command.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw input for this frame
    /// * `mouse_sensitivity` - Radians of yaw per 1000 pixels
    pub fn sample(&mut self, input: &PlayerInput, mouse_sensitivity: f32) -> PlayerCommand {
        let mut cmd = PlayerCommand::default();

        // Movement axes
        if input.movement.forward {
            cmd.forward_move += 1.0;
        }
        if input.movement.backward {
            cmd.forward_move -= 1.0;
        }
        if input.movement.right {
            cmd.right_move += 1.0;
        }
        if input.movement.left {
            cmd.right_move -= 1.0;
        }

        // Mouse right turns right
        if input.mouse_dx.is_finite() {
            self.yaw = (self.yaw + input.mouse_dx * mouse_sensitivity * 0.001)
                .rem_euclid(std::f32::consts::TAU);
        }
        cmd.yaw = self.yaw;

        let held = input.held_buttons();
        cmd.held = held;
        cmd.pressed = held.rising_edges(self.previous);
        self.previous = held;

        cmd
    }

    /// Forget held buttons, so the next held button counts as a fresh press.
    pub fn reset(&mut self, yaw: f32) {
        *self = Self::new(yaw);
    }
}
