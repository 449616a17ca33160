//! Movement tuning constants.
//!
//! All movement parameters are grouped here for easy tuning. Values use
//! metric units (meters, seconds). Gravity is a positive magnitude; upward
//! vertical velocity is positive.

use serde::{Deserialize, Serialize};

use crate::collision::ContentFlags;
use crate::error::MovementError;

/// Configuration for the parkour movement core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Character Dimensions
    // ========================================================================
    /// Collision radius (meters).
    pub player_radius: f32,

    /// Standing capsule height (meters).
    pub standing_height: f32,

    /// Capsule height while sliding (meters).
    pub crouch_height: f32,

    /// Rate at which the capsule eases back to standing after a slide (1/s).
    pub capsule_restore_rate: f32,

    // ========================================================================
    // Speeds
    // ========================================================================
    /// Walking speed (meters/second).
    pub walk_speed: f32,

    /// Sprinting speed (meters/second).
    pub sprint_speed: f32,

    /// Target speed while sliding (meters/second).
    pub slide_speed: f32,

    /// Dash target speed (meters/second).
    pub dash_speed: f32,

    // ========================================================================
    // Jumping and Gravity
    // ========================================================================
    /// Apex height of a ground jump (meters).
    pub jump_height: f32,

    /// Gravity acceleration (meters/second², positive).
    pub gravity: f32,

    /// Lowest allowed vertical velocity (meters/second, negative).
    pub terminal_velocity: f32,

    /// Grace window after leaving the ground in which a jump still counts.
    pub coyote_time: f32,

    /// How long an early jump press is remembered.
    pub jump_buffer_time: f32,

    /// Vertical velocity held while grounded so the character stays glued to slopes.
    pub landing_stick_velocity: f32,

    // ========================================================================
    // Momentum
    // ========================================================================
    /// Airborne blend rate toward the desired velocity (1/s).
    pub air_control: f32,

    /// Grounded blend rate toward the desired velocity (1/s).
    pub momentum_lerp: f32,

    // ========================================================================
    // Slide
    // ========================================================================
    pub slide_duration: f32,

    /// Delay after a slide ends before another can start.
    pub slide_cooldown: f32,

    /// Fraction of `slide_speed` added as an entry burst.
    pub slide_boost_factor: f32,

    // ========================================================================
    // Wall Run
    // ========================================================================
    /// Length of the side rays used to find a wall (meters).
    pub wall_check_distance: f32,

    pub wall_run_duration: f32,

    /// Vertical velocity approached while wall-running (meters/second, negative).
    pub wall_run_fall_speed: f32,

    /// Rate at which vertical velocity eases toward the fall speed (1/s).
    pub wall_run_gravity_ease: f32,

    /// Extra upward speed on a wall jump.
    pub wall_run_up_boost: f32,

    /// Horizontal push away from the wall on a wall jump.
    pub wall_jump_away: f32,

    /// Surfaces whose normal is further than this from up count as walls (degrees).
    pub min_wall_angle_deg: f32,

    /// Falling faster than this when a wall-run ends is clamped.
    pub wall_exit_fall_threshold: f32,

    /// Vertical velocity used when the exit clamp applies.
    pub wall_exit_fall_speed: f32,

    /// Time over which gravity ramps back in after a wall-run.
    pub gravity_restore_time: f32,

    // ========================================================================
    // Dash
    // ========================================================================
    /// Number of independently recharging dash charges.
    pub dash_charges: usize,

    pub dash_duration: f32,

    /// Time for a spent charge to come back.
    pub dash_recharge_delay: f32,

    /// Minimum time between two dashes.
    pub dash_cooldown: f32,

    /// Blend rate toward the dash velocity (1/s).
    pub dash_lerp: f32,

    // ========================================================================
    // Bunny Hop
    // ========================================================================
    /// Horizontal multiplier applied per chained jump.
    pub bunny_hop_boost: f32,

    pub max_bunny_chain: u32,

    /// Two jumps closer together than this chain.
    pub bunny_hop_window: f32,

    // ========================================================================
    // Landing Roll
    // ========================================================================
    /// Fall speed a landing must exceed to roll (meters/second, positive).
    pub min_fall_for_roll: f32,

    pub roll_speed_burst: f32,

    pub roll_duration: f32,

    /// Blend rate toward the roll velocity (1/s).
    pub roll_lerp: f32,

    // ========================================================================
    // Mantle
    // ========================================================================
    pub mantle_enabled: bool,

    /// Height above the feet of the forward ledge sweep.
    pub mantle_check_height: f32,

    /// Reach of the forward ledge sweep.
    pub mantle_forward_distance: f32,

    /// Highest ledge top that can be mantled, measured down from above the hit.
    pub mantle_max_height: f32,

    pub mantle_duration: f32,

    // ========================================================================
    // Layers
    // ========================================================================
    /// Layers the character can stand on.
    pub ground_mask: ContentFlags,

    /// Layers that can be wall-run.
    pub wall_mask: ContentFlags,

    /// Layers that can be mantled onto. `None` falls back to `ground_mask`.
    pub mantle_mask: Option<ContentFlags>,

    /// Layers the character mover collides with.
    pub mover_mask: ContentFlags,

    // ========================================================================
    // Simulation
    // ========================================================================
    /// Longest tick simulated in one step (seconds).
    pub max_tick: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            // Dimensions
            player_radius: 0.5,
            standing_height: 2.0,
            crouch_height: 0.9,
            capsule_restore_rate: 8.0,

            // Speeds
            walk_speed: 12.0,
            sprint_speed: 20.0,
            slide_speed: 30.0,
            dash_speed: 40.0,

            // Jumping and gravity
            jump_height: 3.0,
            gravity: 25.0,
            terminal_velocity: -53.0,
            coyote_time: 0.15,
            jump_buffer_time: 0.12,
            landing_stick_velocity: -2.0,

            // Momentum
            air_control: 0.6,
            momentum_lerp: 12.0,

            // Slide
            slide_duration: 0.9,
            slide_cooldown: 0.6,
            slide_boost_factor: 0.8,

            // Wall run
            wall_check_distance: 0.9,
            wall_run_duration: 1.2,
            wall_run_fall_speed: -4.0,
            wall_run_gravity_ease: 6.0,
            wall_run_up_boost: 2.0,
            wall_jump_away: 6.0,
            min_wall_angle_deg: 65.0,
            wall_exit_fall_threshold: -5.0,
            wall_exit_fall_speed: -1.0,
            gravity_restore_time: 0.25,

            // Dash: the global cooldown is shorter than a recharge so both
            // charges can be spent back to back
            dash_charges: 2,
            dash_duration: 0.18,
            dash_recharge_delay: 1.2,
            dash_cooldown: 0.25,
            dash_lerp: 20.0,

            // Bunny hop
            bunny_hop_boost: 1.06,
            max_bunny_chain: 5,
            bunny_hop_window: 0.35,

            // Landing roll
            min_fall_for_roll: 6.0,
            roll_speed_burst: 8.0,
            roll_duration: 0.45,
            roll_lerp: 2.0,

            // Mantle
            mantle_enabled: true,
            mantle_check_height: 1.0,
            mantle_forward_distance: 1.0,
            mantle_max_height: 1.5,
            mantle_duration: 0.25,

            // Layers
            ground_mask: ContentFlags::GROUND,
            wall_mask: ContentFlags::WALL,
            mantle_mask: None,
            mover_mask: ContentFlags::MASK_MOVER_SOLID,

            max_tick: 0.066,
        }
    }
}

impl MovementConfig {
    /// Low gravity, long wall-runs and generous air control.
    pub fn floaty() -> Self {
        Self {
            gravity: 15.0,
            terminal_velocity: -30.0,
            air_control: 1.5,
            wall_run_duration: 2.0,
            wall_run_fall_speed: -2.0,
            coyote_time: 0.2,
            jump_buffer_time: 0.2,
            roll_duration: 0.6,
            ..Default::default()
        }
    }

    /// Tighter timings and a third dash charge for skilled play.
    pub fn competitive() -> Self {
        Self {
            sprint_speed: 22.0,
            gravity: 30.0,
            coyote_time: 0.1,
            jump_buffer_time: 0.1,
            momentum_lerp: 16.0,
            air_control: 0.4,
            dash_charges: 3,
            dash_recharge_delay: 1.5,
            bunny_hop_window: 0.45,
            max_bunny_chain: 8,
            ..Default::default()
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "floaty" => Some(Self::floaty()),
            "competitive" => Some(Self::competitive()),
            _ => None,
        }
    }

    /// Layers queried for mantle ledges.
    pub fn mantle_layers(&self) -> ContentFlags {
        self.mantle_mask.unwrap_or(self.ground_mask)
    }

    /// Layers the feet overlap checks. Wall tops count as ground.
    pub fn grounded_layers(&self) -> ContentFlags {
        self.ground_mask | self.wall_mask
    }

    /// Take-off speed for a jump of `jump_height` under `gravity`.
    pub fn jump_velocity(&self) -> f32 {
        (2.0 * self.jump_height * self.gravity).sqrt()
    }

    /// Check that every value is physically meaningful.
    pub fn validate(&self) -> Result<(), MovementError> {
        let positive = [
            ("player_radius", self.player_radius),
            ("standing_height", self.standing_height),
            ("crouch_height", self.crouch_height),
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("slide_speed", self.slide_speed),
            ("dash_speed", self.dash_speed),
            ("jump_height", self.jump_height),
            ("gravity", self.gravity),
            ("slide_duration", self.slide_duration),
            ("wall_check_distance", self.wall_check_distance),
            ("wall_run_duration", self.wall_run_duration),
            ("dash_duration", self.dash_duration),
            ("dash_recharge_delay", self.dash_recharge_delay),
            ("bunny_hop_boost", self.bunny_hop_boost),
            ("roll_duration", self.roll_duration),
            ("mantle_duration", self.mantle_duration),
            ("max_tick", self.max_tick),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(MovementError::invalid(field, "must be positive"));
            }
        }

        let non_negative = [
            ("capsule_restore_rate", self.capsule_restore_rate),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("air_control", self.air_control),
            ("momentum_lerp", self.momentum_lerp),
            ("slide_cooldown", self.slide_cooldown),
            ("dash_cooldown", self.dash_cooldown),
            ("dash_lerp", self.dash_lerp),
            ("bunny_hop_window", self.bunny_hop_window),
            ("min_fall_for_roll", self.min_fall_for_roll),
            ("roll_lerp", self.roll_lerp),
            ("gravity_restore_time", self.gravity_restore_time),
            ("mantle_max_height", self.mantle_max_height),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(MovementError::invalid(field, "must not be negative"));
            }
        }

        if !self.terminal_velocity.is_finite() || self.terminal_velocity >= 0.0 {
            return Err(MovementError::invalid("terminal_velocity", "must be negative"));
        }
        if self.crouch_height > self.standing_height {
            return Err(MovementError::invalid("crouch_height", "must not exceed standing_height"));
        }
        if self.standing_height < self.player_radius * 2.0 {
            return Err(MovementError::invalid("standing_height", "must fit the capsule caps"));
        }
        if self.dash_charges == 0 {
            return Err(MovementError::invalid("dash_charges", "must be at least one"));
        }
        if !(0.0..90.0).contains(&self.min_wall_angle_deg) {
            return Err(MovementError::invalid("min_wall_angle_deg", "must be in [0, 90)"));
        }

        Ok(())
    }
}
