//! Exclusive movement modes and their task objects.
//!
//! Each mode owns a [`TaskTimer`] and the data it needs while active. Task
//! methods take only the pieces of state they touch, so the controller
//! stays the single owner of [`MovementState`](super::MovementState).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::config::MovementConfig;
use super::sensor::WallSide;
use super::task::TaskTimer;
use super::velocity::{along_wall, blend_horizontal};

/// The active exclusive movement mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    None,
    Sliding(SlideTask),
    WallRunning(WallRunTask),
    Dashing(DashTask),
    Mantling(MantleTask),
    Rolling(RollTask),
}

impl MovementMode {
    /// A new exclusive mode may start from here. A roll only biases
    /// velocity, so it can be pre-empted.
    pub fn accepts_entry(&self) -> bool {
        matches!(self, Self::None | Self::Rolling(_))
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self, Self::Sliding(_))
    }

    pub fn is_wall_running(&self) -> bool {
        matches!(self, Self::WallRunning(_))
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self, Self::Dashing(_))
    }

    pub fn is_mantling(&self) -> bool {
        matches!(self, Self::Mantling(_))
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self, Self::Rolling(_))
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sliding(_) => "sliding",
            Self::WallRunning(_) => "wall-running",
            Self::Dashing(_) => "dashing",
            Self::Mantling(_) => "mantling",
            Self::Rolling(_) => "rolling",
        }
    }

    /// Remaining time of the active task, zero with no mode.
    pub fn remaining(&self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Sliding(task) => task.timer.remaining(),
            Self::WallRunning(task) => task.timer.remaining(),
            Self::Dashing(task) => task.timer.remaining(),
            Self::Mantling(task) => task.timer.remaining(),
            Self::Rolling(task) => task.timer.remaining(),
        }
    }
}

// ============================================================================
// Slide
// ============================================================================

/// Crouched burst along the current heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideTask {
    pub timer: TaskTimer,
    pub direction: Vec3,
}

impl SlideTask {
    /// Start a slide: adds the entry burst along `direction`.
    pub fn start(horizontal: &mut Vec3, direction: Vec3, config: &MovementConfig) -> Self {
        *horizontal += direction * config.slide_speed * config.slide_boost_factor;
        Self {
            timer: TaskTimer::new(config.slide_duration),
            direction,
        }
    }

    /// Returns `true` when the slide is over.
    pub fn update(&mut self, dt: f32) -> bool {
        self.timer.advance(dt)
    }

    /// Arms the slide cooldown.
    pub fn finish(&self, slide_cooldown: &mut f32, config: &MovementConfig) {
        *slide_cooldown = config.slide_cooldown;
    }
}

// ============================================================================
// Wall Run
// ============================================================================

/// Running along a wall with reduced fall speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallRunTask {
    pub timer: TaskTimer,
    pub normal: Vec3,
    pub side: WallSide,
}

impl WallRunTask {
    pub fn start(normal: Vec3, side: WallSide, config: &MovementConfig) -> Self {
        Self {
            timer: TaskTimer::new(config.wall_run_duration),
            normal,
            side,
        }
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.timer.advance(dt)
    }

    /// Horizontal target: along the wall plus half-speed strafe.
    pub fn target_velocity(&self, forward: Vec3, right: Vec3, strafe: f32, speed: f32) -> Vec3 {
        along_wall(self.normal, forward) * speed + right * strafe * (speed * 0.5)
    }

    /// Ease vertical velocity toward the wall-run fall speed.
    pub fn steer_vertical(&self, vertical: f32, config: &MovementConfig, dt: f32) -> f32 {
        super::velocity::ease_vertical(
            vertical,
            config.wall_run_fall_speed,
            config.wall_run_gravity_ease,
            dt,
        )
    }

    /// Clamp a hard fall and start the gravity ramp.
    pub fn finish(
        &self,
        vertical: &mut f32,
        gravity_restore: &mut Option<TaskTimer>,
        config: &MovementConfig,
    ) {
        if *vertical < config.wall_exit_fall_threshold {
            *vertical = config.wall_exit_fall_speed;
        }
        *gravity_restore = Some(TaskTimer::new(config.gravity_restore_time));
    }
}

// ============================================================================
// Dash
// ============================================================================

/// Short high-speed burst with vertical velocity held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashTask {
    pub timer: TaskTimer,
    pub direction: Vec3,
    pub saved_vertical_velocity: f32,
}

impl DashTask {
    pub fn start(direction: Vec3, vertical: f32, config: &MovementConfig) -> Self {
        Self {
            timer: TaskTimer::new(config.dash_duration),
            direction,
            saved_vertical_velocity: vertical,
        }
    }

    pub fn steer(&self, horizontal: Vec3, config: &MovementConfig, dt: f32) -> Vec3 {
        blend_horizontal(
            horizontal,
            self.direction * config.dash_speed,
            config.dash_lerp,
            dt,
        )
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.timer.advance(dt)
    }

    /// Give back the vertical velocity held at entry.
    pub fn finish(&self, vertical: &mut f32) {
        *vertical = self.saved_vertical_velocity;
    }
}

// ============================================================================
// Mantle
// ============================================================================

/// Scripted lift from the current position onto a ledge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MantleTask {
    pub timer: TaskTimer,
    pub start: Vec3,
    pub end: Vec3,
}

impl MantleTask {
    pub fn start(start: Vec3, end: Vec3, config: &MovementConfig) -> Self {
        Self {
            timer: TaskTimer::new(config.mantle_duration),
            start,
            end,
        }
    }

    /// Advance and return the interpolated position and whether the lift is done.
    pub fn update(&mut self, dt: f32) -> (Vec3, bool) {
        let finished = self.timer.advance(dt);
        (self.start.lerp(self.end, self.timer.progress()), finished)
    }

    /// Snap to the target and stop.
    pub fn finish(&self, position: &mut Vec3, horizontal: &mut Vec3, vertical: &mut f32) {
        *position = self.end;
        *horizontal = Vec3::ZERO;
        *vertical = 0.0;
    }
}

// ============================================================================
// Landing Roll
// ============================================================================

/// Momentum-keeping roll after a hard landing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollTask {
    pub timer: TaskTimer,
    pub direction: Vec3,
}

impl RollTask {
    /// Start a roll: adds the burst along `direction`.
    pub fn start(horizontal: &mut Vec3, direction: Vec3, config: &MovementConfig) -> Self {
        *horizontal += direction * config.roll_speed_burst;
        Self {
            timer: TaskTimer::new(config.roll_duration),
            direction,
        }
    }

    pub fn steer(&self, horizontal: Vec3, config: &MovementConfig, dt: f32) -> Vec3 {
        let target = self.direction * (config.walk_speed + config.roll_speed_burst);
        blend_horizontal(horizontal, target, config.roll_lerp, dt)
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.timer.advance(dt)
    }
}
