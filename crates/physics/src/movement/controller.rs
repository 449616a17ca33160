//! Player movement controller.
//!
//! This is the main entry point for character movement. Each tick it senses
//! the environment, runs the behavior state machine, integrates velocity,
//! moves the capsule through the scene and publishes what changed.

use glam::Vec3;

use crate::collision::{CollisionFlags, SceneQuery};
use crate::error::MovementError;

use super::behaviors::{DashTask, MantleTask, MovementMode, RollTask, SlideTask, WallRunTask};
use super::config::MovementConfig;
use super::events::{MovementEvent, NotificationBus};
use super::intent::MovementIntent;
use super::rig::{CapsuleVolume, CharacterRig, CollisionVolume};
use super::sensor::EnvironmentSensor;
use super::state::{MovementState, PlayerCommand};
use super::timers::{tick_down, DashCharges};
use super::velocity::{
    blend_horizontal, clamp_terminal, fall, flatten, horizontal_direction_or, speed_tier,
};

/// What one call to [`PlayerController::advance`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// The tick was rejected (non-positive or non-finite `dt`); nothing changed.
    pub skipped: bool,

    /// Simulated time after clamping.
    pub dt: f32,

    /// How far the character moved.
    pub displacement: Vec3,

    /// Contacts reported by the mover.
    pub collision: CollisionFlags,

    /// Collision capsule after the tick.
    pub volume: CollisionVolume,

    /// Time left on the active movement mode, zero with none.
    pub mode_remaining: f32,

    /// Events published this tick, in order.
    pub events: Vec<MovementEvent>,
}

/// Player movement controller.
///
/// Owns the tuning, the sensor built from the character rig and the
/// notification bus. All per-character data lives in [`MovementState`].
///
/// # Example
///
/// ```ignore
/// let config = MovementConfig::default();
/// let mut controller = PlayerController::new(config.clone(), CharacterRig::from_config(&config))?;
/// let mut state = controller.spawn_state(spawn_position);
///
/// // Each tick:
/// let report = controller.advance(&mut state, &command, &world, delta_time);
/// ```
#[derive(Debug)]
pub struct PlayerController {
    /// Movement configuration.
    pub config: MovementConfig,
    sensor: EnvironmentSensor,
    camera_mount: Vec3,
    bus: NotificationBus,
    pending_events: Vec<MovementEvent>,
    last_cooldown_fraction: f32,
}

impl PlayerController {
    /// Create a controller for a character rig.
    ///
    /// Fails if the config does not validate or the rig has no collision
    /// volume. Missing anchors fall back to positions derived from the capsule.
    pub fn new(config: MovementConfig, rig: CharacterRig) -> Result<Self, MovementError> {
        config.validate()?;

        let capsule = rig
            .collision_volume
            .ok_or(MovementError::MissingDependency("collision volume"))?;
        if !(capsule.radius > 0.0 && capsule.height >= capsule.radius * 2.0) {
            return Err(MovementError::invalid(
                "collision_volume",
                "must be a capsule with positive radius",
            ));
        }

        let ground_anchor = rig.ground_anchor.unwrap_or_else(|| {
            log::warn!("character rig has no ground anchor, probing under the capsule");
            EnvironmentSensor::default_ground_anchor(capsule)
        });
        let camera_mount = rig.camera_mount.unwrap_or_else(|| {
            log::warn!("character rig has no camera mount, using eye height");
            Vec3::Y * (capsule.height * 0.4)
        });

        Ok(Self {
            config,
            sensor: EnvironmentSensor::new(capsule, ground_anchor),
            camera_mount,
            bus: NotificationBus::new(),
            pending_events: Vec::new(),
            last_cooldown_fraction: 1.0,
        })
    }

    /// Create a controller with the default config and a matching rig.
    pub fn with_default_config() -> Result<Self, MovementError> {
        let config = MovementConfig::default();
        let rig = CharacterRig::from_config(&config);
        Self::new(config, rig)
    }

    /// Fresh spawn state at `position` (standing capsule center).
    pub fn spawn_state(&self, position: Vec3) -> MovementState {
        MovementState::new(
            position,
            DashCharges::new(self.config.dash_charges, self.config.dash_recharge_delay),
            self.capsule().height,
        )
    }

    /// Reset `state` to spawn defaults at `position`.
    ///
    /// Whatever the character was doing is closed out first: the end event
    /// of an active mode, a sprint stop and a full dash meter are published
    /// right away and returned.
    pub fn respawn(&mut self, state: &mut MovementState, position: Vec3) -> Vec<MovementEvent> {
        log::debug!("respawn at {:?}", position);
        self.pending_events.clear();

        let mut events = Vec::new();
        match state.mode {
            MovementMode::Sliding(_) => events.push(MovementEvent::SlideEnded),
            MovementMode::WallRunning(_) => events.push(MovementEvent::WallRunEnded),
            MovementMode::Dashing(_) => events.push(MovementEvent::DashEnded),
            MovementMode::Mantling(_) => events.push(MovementEvent::MantleEnded),
            MovementMode::Rolling(_) | MovementMode::None => {}
        }
        if state.sprinting {
            events.push(MovementEvent::SprintStopped);
        }

        *state = self.spawn_state(position);
        let fraction = state.dash_charges.cooldown_fraction();
        if (fraction - self.last_cooldown_fraction).abs() > f32::EPSILON {
            events.push(MovementEvent::DashCooldownChanged(fraction));
        }
        self.last_cooldown_fraction = fraction;

        for event in &events {
            self.bus.publish(event);
        }
        events
    }

    /// Standing capsule.
    pub fn capsule(&self) -> CapsuleVolume {
        self.sensor.capsule()
    }

    pub fn sensor(&self) -> &EnvironmentSensor {
        &self.sensor
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NotificationBus {
        &mut self.bus
    }

    /// Current collision capsule, including slide crouch.
    pub fn collision_volume(&self, state: &MovementState) -> CollisionVolume {
        let capsule = self.capsule();
        let height = state.capsule_height.max(capsule.radius * 2.0);
        CollisionVolume::new(capsule.radius, capsule.height, height)
    }

    /// Camera position, lowered with the capsule while crouched.
    pub fn eye_position(&self, state: &MovementState) -> Vec3 {
        let crouch_drop = self.capsule().height - state.capsule_height;
        state.position + self.camera_mount - Vec3::Y * crouch_drop.max(0.0)
    }

    /// Dash meter fill level in `[0, 1]`.
    pub fn dash_cooldown_fraction(&self, state: &MovementState) -> f32 {
        state.dash_charges.cooldown_fraction()
    }

    /// Start lifting the character to `target`.
    ///
    /// A no-op returning `false` while already mantling or while another
    /// exclusive mode is active.
    pub fn start_mantle(&mut self, state: &mut MovementState, target: Vec3) -> bool {
        if !self.begin_mantle(state, target) {
            return false;
        }
        self.pending_events.push(MovementEvent::MantleStarted);
        true
    }

    /// Advance one tick.
    ///
    /// # Arguments
    ///
    /// * `state` - The character's movement state (will be modified)
    /// * `command` - Input for this tick
    /// * `scene` - Collision queries
    /// * `delta_time` - Time step in seconds, clamped to `max_tick`
    pub fn advance(
        &mut self,
        state: &mut MovementState,
        command: &PlayerCommand,
        scene: &dyn SceneQuery,
        delta_time: f32,
    ) -> TickReport {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            log::debug!("skipping tick with dt={}", delta_time);
            return TickReport {
                skipped: true,
                dt: 0.0,
                displacement: Vec3::ZERO,
                collision: CollisionFlags::NONE,
                volume: self.collision_volume(state),
                mode_remaining: state.mode.remaining(),
                events: Vec::new(),
            };
        }

        // Clamp delta time to prevent physics explosions
        let dt = delta_time.min(self.config.max_tick);

        let mut events = std::mem::take(&mut self.pending_events);
        let start = state.position;
        let collision = self.step(state, command, scene, dt, &mut events);

        let fraction = state.dash_charges.cooldown_fraction();
        if (fraction - self.last_cooldown_fraction).abs() > f32::EPSILON {
            self.last_cooldown_fraction = fraction;
            events.push(MovementEvent::DashCooldownChanged(fraction));
        }

        for event in &events {
            self.bus.publish(event);
        }

        TickReport {
            skipped: false,
            dt,
            displacement: state.position - start,
            collision,
            volume: self.collision_volume(state),
            mode_remaining: state.mode.remaining(),
            events,
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    fn step(
        &self,
        state: &mut MovementState,
        command: &PlayerCommand,
        scene: &dyn SceneQuery,
        dt: f32,
        events: &mut Vec<MovementEvent>,
    ) -> CollisionFlags {
        let config = &self.config;
        let intent = MovementIntent::sample(command);
        state.facing_yaw = command.yaw;

        let prev_horizontal = state.horizontal_velocity;
        let prev_vertical = state.vertical_velocity;

        self.sense_ground(state, scene, dt);
        let landed = state.grounded && !state.was_grounded;

        // Mantling moves the transform directly; the mover stays idle
        if state.mode.is_mantling() {
            self.update_mantle(state, dt, events);
            tick_down(&mut state.jump_buffer_timer, dt);
            self.finish_tick(state, dt, events);
            return CollisionFlags::NONE;
        }

        self.update_wall_run(state, scene, &intent, dt, events);

        if intent.jump_pressed {
            state.jump_buffer_timer = config.jump_buffer_time;
        } else {
            tick_down(&mut state.jump_buffer_timer, dt);
        }

        if self.try_mantle(state, scene, &intent, events) {
            self.finish_tick(state, dt, events);
            return CollisionFlags::NONE;
        }

        self.update_slide(state, &intent, prev_horizontal, dt, events);

        let sliding = state.mode.is_sliding();
        let sprinting = intent.sprint_held && intent.magnitude > 0.1 && state.grounded && !sliding;
        if sprinting != state.sprinting {
            state.sprinting = sprinting;
            events.push(if sprinting {
                MovementEvent::SprintStarted
            } else {
                MovementEvent::SprintStopped
            });
        }
        let speed = speed_tier(config, sprinting, sliding);

        self.try_dash(state, &intent, events);
        self.blend_horizontal_velocity(state, &intent, speed, dt);
        self.try_jump(state, events);
        self.apply_gravity(state, dt);

        if landed && prev_vertical < -config.min_fall_for_roll {
            self.land_hard(state, &intent, prev_horizontal, prev_vertical, events);
        }

        let collision = self.move_capsule(state, scene, dt);

        // Ceiling bonk
        if collision.above() && state.vertical_velocity > 0.0 {
            state.vertical_velocity = 0.0;
        }

        // Stay glued to the ground
        if state.grounded && state.vertical_velocity < 0.0 {
            state.vertical_velocity = config.landing_stick_velocity;
        }

        self.restore_capsule(state, dt);
        self.finish_tick(state, dt, events);
        collision
    }

    fn sense_ground(&self, state: &mut MovementState, scene: &dyn SceneQuery, dt: f32) {
        state.grounded = self.sensor.is_grounded(scene, state.position, &self.config);

        if state.grounded {
            state.coyote_timer = self.config.coyote_time;
            state.wall_run_spent = false;
            if !state.was_grounded {
                state.dash_charges.refill();
                state.dash_cooldown = 0.0;
            }
        } else {
            tick_down(&mut state.coyote_timer, dt);
        }
    }

    /// Shared end of every tick: task completion, timers and the clock.
    fn finish_tick(&self, state: &mut MovementState, dt: f32, events: &mut Vec<MovementEvent>) {
        match &mut state.mode {
            MovementMode::Dashing(task) => {
                if task.update(dt) {
                    task.finish(&mut state.vertical_velocity);
                    state.mode = MovementMode::None;
                    events.push(MovementEvent::DashEnded);
                    log::debug!("dash ended");
                }
            }
            MovementMode::Rolling(task) => {
                if task.update(dt) {
                    state.mode = MovementMode::None;
                    log::debug!("roll ended");
                }
            }
            _ => {}
        }

        tick_down(&mut state.slide_cooldown, dt);
        tick_down(&mut state.dash_cooldown, dt);
        state.dash_charges.tick(dt);

        state.vertical_velocity = clamp_terminal(state.vertical_velocity, self.config.terminal_velocity);
        state.was_grounded = state.grounded;
        state.clock += dt;
    }

    // ========================================================================
    // Behaviors
    // ========================================================================

    fn update_wall_run(
        &self,
        state: &mut MovementState,
        scene: &dyn SceneQuery,
        intent: &MovementIntent,
        dt: f32,
        events: &mut Vec<MovementEvent>,
    ) {
        let can_enter = !state.grounded
            && !state.wall_run_spent
            && state.vertical_velocity < 0.0
            && state.mode.accepts_entry();
        if can_enter {
            if let Some(wall) = self.sensor.detect_wall(scene, state.position, intent.right, &self.config) {
                self.preempt_roll(state);
                state.mode = MovementMode::WallRunning(WallRunTask::start(wall.normal, wall.side, &self.config));
                events.push(MovementEvent::WallRunStarted { side: wall.side });
                log::debug!("wall-run started on the {:?}", wall.side);
            }
        }

        if let MovementMode::WallRunning(mut task) = state.mode {
            let expired = task.update(dt);
            if expired || state.grounded {
                state.wall_run_spent = expired && !state.grounded;
                self.end_wall_run(state, &task, events);
            } else {
                state.mode = MovementMode::WallRunning(task);
            }
        }
    }

    fn end_wall_run(&self, state: &mut MovementState, task: &WallRunTask, events: &mut Vec<MovementEvent>) {
        task.finish(&mut state.vertical_velocity, &mut state.gravity_restore, &self.config);
        state.mode = MovementMode::None;
        events.push(MovementEvent::WallRunEnded);
        log::debug!("wall-run ended");
    }

    fn try_mantle(
        &self,
        state: &mut MovementState,
        scene: &dyn SceneQuery,
        intent: &MovementIntent,
        events: &mut Vec<MovementEvent>,
    ) -> bool {
        if !self.config.mantle_enabled
            || !intent.jump_pressed
            || state.grounded
            || !state.mode.accepts_entry()
        {
            return false;
        }

        let Some(target) = self
            .sensor
            .detect_mantle_ledge(scene, state.position, intent.forward, &self.config)
        else {
            return false;
        };

        if !self.begin_mantle(state, target) {
            return false;
        }
        state.jump_buffer_timer = 0.0;
        events.push(MovementEvent::MantleStarted);
        true
    }

    fn begin_mantle(&self, state: &mut MovementState, target: Vec3) -> bool {
        if !state.mode.accepts_entry() {
            return false;
        }
        self.preempt_roll(state);
        state.mode = MovementMode::Mantling(MantleTask::start(state.position, target, &self.config));
        log::debug!("mantle from {:?} to {:?}", state.position, target);
        true
    }

    fn update_mantle(&self, state: &mut MovementState, dt: f32, events: &mut Vec<MovementEvent>) {
        let MovementMode::Mantling(mut task) = state.mode else {
            return;
        };

        let (position, finished) = task.update(dt);
        state.position = position;
        if finished {
            task.finish(
                &mut state.position,
                &mut state.horizontal_velocity,
                &mut state.vertical_velocity,
            );
            state.mode = MovementMode::None;
            events.push(MovementEvent::MantleEnded);
            log::debug!("mantle finished at {:?}", state.position);
        } else {
            state.mode = MovementMode::Mantling(task);
        }
    }

    fn update_slide(
        &self,
        state: &mut MovementState,
        intent: &MovementIntent,
        prev_horizontal: Vec3,
        dt: f32,
        events: &mut Vec<MovementEvent>,
    ) {
        let can_enter = intent.slide_requested
            && state.grounded
            && state.slide_cooldown <= 0.0
            && state.mode.accepts_entry();
        if can_enter {
            let direction = horizontal_direction_or(prev_horizontal, intent.forward);
            self.preempt_roll(state);
            state.mode = MovementMode::Sliding(SlideTask::start(
                &mut state.horizontal_velocity,
                direction,
                &self.config,
            ));
            state.capsule_height = self.config.crouch_height;
            events.push(MovementEvent::SlideStarted);
            log::debug!("slide started along {:?}", direction);
        }

        if let MovementMode::Sliding(mut task) = state.mode {
            if task.update(dt) {
                task.finish(&mut state.slide_cooldown, &self.config);
                state.mode = MovementMode::None;
                events.push(MovementEvent::SlideEnded);
                log::debug!("slide ended");
            } else {
                state.mode = MovementMode::Sliding(task);
            }
        }
    }

    fn try_dash(&self, state: &mut MovementState, intent: &MovementIntent, events: &mut Vec<MovementEvent>) {
        if !intent.dash_pressed
            || !state.grounded
            || state.dash_cooldown > 0.0
            || !state.mode.accepts_entry()
        {
            return;
        }
        if !state.dash_charges.try_consume() {
            log::debug!("dash rejected, no charges");
            return;
        }

        state.dash_cooldown = self.config.dash_cooldown;
        let direction = intent.direction_or_facing();
        self.preempt_roll(state);
        state.mode = MovementMode::Dashing(DashTask::start(
            direction,
            state.vertical_velocity,
            &self.config,
        ));
        events.push(MovementEvent::DashStarted);
        log::debug!(
            "dash along {:?}, {} charges left",
            direction,
            state.dash_charges.available()
        );
    }

    /// A roll only biases velocity; any other mode may take over from it.
    fn preempt_roll(&self, state: &mut MovementState) {
        if state.mode.is_rolling() {
            state.mode = MovementMode::None;
            log::debug!("roll pre-empted");
        }
    }

    fn land_hard(
        &self,
        state: &mut MovementState,
        intent: &MovementIntent,
        prev_horizontal: Vec3,
        prev_vertical: f32,
        events: &mut Vec<MovementEvent>,
    ) {
        events.push(MovementEvent::HardLanding {
            impact_speed: -prev_vertical,
        });

        if state.mode != MovementMode::None {
            log::debug!("hard landing while {}, no roll", state.mode.name());
            return;
        }

        let direction = horizontal_direction_or(prev_horizontal, intent.forward);
        state.mode = MovementMode::Rolling(RollTask::start(
            &mut state.horizontal_velocity,
            direction,
            &self.config,
        ));
        log::debug!("landing roll at {} m/s", -prev_vertical);
    }

    // ========================================================================
    // Velocity
    // ========================================================================

    fn blend_horizontal_velocity(
        &self,
        state: &mut MovementState,
        intent: &MovementIntent,
        speed: f32,
        dt: f32,
    ) {
        let config = &self.config;
        let current = state.horizontal_velocity;
        let desired = intent.direction * speed;

        state.horizontal_velocity = match &state.mode {
            MovementMode::Dashing(task) => task.steer(current, config, dt),
            MovementMode::Rolling(task) => task.steer(current, config, dt),
            MovementMode::WallRunning(task) => {
                let target = task.target_velocity(intent.forward, intent.right, intent.strafe, speed);
                blend_horizontal(current, target, config.air_control, dt)
            }
            _ if state.grounded => blend_horizontal(current, desired, config.momentum_lerp, dt),
            _ => blend_horizontal(current, desired, config.air_control, dt),
        };
    }

    fn try_jump(&self, state: &mut MovementState, events: &mut Vec<MovementEvent>) {
        let config = &self.config;
        let can_jump = state.grounded || state.coyote_timer > 0.0 || state.mode.is_wall_running();
        if state.jump_buffer_timer <= 0.0 || !can_jump {
            return;
        }

        state.jump_buffer_timer = 0.0;
        state.coyote_timer = 0.0;

        if let MovementMode::WallRunning(task) = state.mode {
            state.vertical_velocity = config.jump_velocity() + config.wall_run_up_boost;
            state.horizontal_velocity += flatten(task.normal) * config.wall_jump_away;
            self.end_wall_run(state, &task, events);
            events.push(MovementEvent::Jumped {
                chain: state.bunny_hop_chain,
                off_wall: true,
            });
            log::debug!("wall jump");
            return;
        }

        state.vertical_velocity = config.jump_velocity();
        // A jump mid-dash replaces the vertical velocity the dash gives back
        if let MovementMode::Dashing(task) = &mut state.mode {
            task.saved_vertical_velocity = state.vertical_velocity;
        }

        let chained = state
            .last_jump_time
            .is_some_and(|last| state.clock - last <= config.bunny_hop_window);
        if chained {
            state.bunny_hop_chain = (state.bunny_hop_chain + 1).clamp(1, config.max_bunny_chain.max(1));
            state.horizontal_velocity *= config.bunny_hop_boost.powi(state.bunny_hop_chain as i32);
        } else {
            state.bunny_hop_chain = 0;
        }
        state.last_jump_time = Some(state.clock);

        events.push(MovementEvent::Jumped {
            chain: state.bunny_hop_chain,
            off_wall: false,
        });
        log::debug!("jump, chain {}", state.bunny_hop_chain);
    }

    fn apply_gravity(&self, state: &mut MovementState, dt: f32) {
        let config = &self.config;
        let vertical = state.vertical_velocity;

        state.vertical_velocity = match &state.mode {
            MovementMode::WallRunning(task) => task.steer_vertical(vertical, config, dt),
            // Held for the whole dash, given back when it ends
            MovementMode::Dashing(_) => vertical,
            _ => {
                // After a wall-run extra gravity ramps in on top of normal gravity
                let scale = match state.gravity_restore.as_mut() {
                    Some(ramp) => {
                        let done = ramp.advance(dt);
                        let extra = ramp.progress();
                        if done {
                            state.gravity_restore = None;
                        }
                        1.0 + extra
                    }
                    None => 1.0,
                };
                fall(vertical, config.gravity, scale, dt)
            }
        };

        state.vertical_velocity = clamp_terminal(state.vertical_velocity, config.terminal_velocity);
    }

    // ========================================================================
    // Collision
    // ========================================================================

    fn move_capsule(&self, state: &mut MovementState, scene: &dyn SceneQuery, dt: f32) -> CollisionFlags {
        let volume = self.collision_volume(state);
        let displacement = state.velocity() * dt;

        let result = scene.move_character(
            state.position + volume.center_offset,
            volume.radius,
            volume.height,
            displacement,
            self.config.mover_mask,
        );
        state.position = result.position - volume.center_offset;
        result.flags
    }

    /// Ease the capsule back to standing once no slide holds it down.
    fn restore_capsule(&self, state: &mut MovementState, dt: f32) {
        let standing = self.capsule().height;
        if state.mode.is_sliding() || state.capsule_height == standing {
            return;
        }

        let t = (self.config.capsule_restore_rate * dt).clamp(0.0, 1.0);
        state.capsule_height += (standing - state.capsule_height) * t;
        if (standing - state.capsule_height).abs() < 0.001 {
            state.capsule_height = standing;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::scripted::ScriptedScene;
    use crate::collision::{CollisionWorld, ContentFlags, RayHit};
    use crate::movement::sensor::WallSide;
    use crate::movement::state::CommandButtons;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(100.0, 0.5, 100.0),
            ContentFlags::GROUND,
        );

        world
    }

    fn controller() -> PlayerController {
        PlayerController::with_default_config().unwrap()
    }

    fn airborne_state(controller: &PlayerController, vertical: f32) -> MovementState {
        let mut state = controller.spawn_state(Vec3::new(0.0, 10.0, 0.0));
        state.grounded = false;
        state.was_grounded = false;
        state.vertical_velocity = vertical;
        state
    }

    fn press(button: u16) -> PlayerCommand {
        let mut command = PlayerCommand::default();
        command.pressed.press(button);
        command.held.press(button);
        command
    }

    #[test]
    fn test_missing_collision_volume() {
        let config = MovementConfig::default();
        let rig = CharacterRig {
            collision_volume: None,
            ..CharacterRig::from_config(&config)
        };

        let result = PlayerController::new(config, rig);
        assert!(matches!(result, Err(MovementError::MissingDependency(_))));
    }

    #[test]
    fn test_missing_anchors_fall_back() {
        let config = MovementConfig::default();
        let rig = CharacterRig {
            ground_anchor: None,
            camera_mount: None,
            ..CharacterRig::from_config(&config)
        };

        let controller = PlayerController::new(config, rig).unwrap();
        let state = controller.spawn_state(Vec3::new(0.0, 1.0, 0.0));
        assert!(controller.eye_position(&state).y > 1.0);
    }

    #[test]
    fn test_invalid_tick_is_skipped() {
        let mut controller = controller();
        let scene = ScriptedScene::airborne();
        let mut state = airborne_state(&controller, -3.0);
        let before = state.clone();

        for dt in [0.0, -0.016, f32::NAN, f32::INFINITY] {
            let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, dt);
            assert!(report.skipped);
            assert!(report.events.is_empty());
        }

        assert_eq!(state, before);
        assert_eq!(scene.moves.get(), 0);
    }

    #[test]
    fn test_gravity_and_terminal_velocity() {
        let mut controller = controller();
        let scene = ScriptedScene::airborne();
        let mut state = airborne_state(&controller, 0.0);
        let command = PlayerCommand::default();

        controller.advance(&mut state, &command, &scene, DT);
        assert!(state.vertical_velocity < 0.0, "Should be falling");

        for _ in 0..600 {
            controller.advance(&mut state, &command, &scene, DT);
            assert!(state.vertical_velocity >= controller.config.terminal_velocity);
        }
        assert_eq!(state.vertical_velocity, controller.config.terminal_velocity);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut controller = controller();
        let scene = ScriptedScene::airborne();
        let mut state = airborne_state(&controller, 0.0);

        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, 1.0);
        assert_eq!(report.dt, controller.config.max_tick);
    }

    #[test]
    fn test_forward_movement_on_floor() {
        let world = create_test_world();
        let mut controller = controller();
        let mut state = controller.spawn_state(Vec3::new(0.0, 1.0, 0.0));

        let command = PlayerCommand {
            forward_move: 1.0,
            ..Default::default()
        };

        for _ in 0..60 {
            controller.advance(&mut state, &command, &world, DT);
        }

        assert!(state.grounded);
        assert!(state.position.x > 5.0, "moved to x={}", state.position.x);
        assert!((state.position.y - 1.0).abs() < 0.05, "y={}", state.position.y);
        assert!((state.horizontal_speed() - controller.config.walk_speed).abs() < 0.5);
        assert_eq!(state.vertical_velocity, controller.config.landing_stick_velocity);
    }

    #[test]
    fn test_jump_leaves_ground_and_lands() {
        let world = create_test_world();
        let mut controller = controller();
        let mut state = controller.spawn_state(Vec3::new(0.0, 1.0, 0.0));

        controller.advance(&mut state, &press(CommandButtons::JUMP), &world, DT);
        assert!(state.vertical_velocity > 10.0);

        let mut peak = state.position.y;
        for _ in 0..180 {
            controller.advance(&mut state, &PlayerCommand::default(), &world, DT);
            peak = peak.max(state.position.y);
        }

        // Apex close to the configured jump height
        assert!((peak - 1.0 - controller.config.jump_height).abs() < 0.3, "peak={peak}");
        assert!(state.grounded);
        assert!((state.position.y - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_sprint_events_only_on_change() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);

        let mut sprint = PlayerCommand {
            forward_move: 1.0,
            ..Default::default()
        };
        sprint.held.press(CommandButtons::SPRINT);

        let first = controller.advance(&mut state, &sprint, &scene, DT);
        assert!(first.events.contains(&MovementEvent::SprintStarted));
        let second = controller.advance(&mut state, &sprint, &scene, DT);
        assert!(!second.events.contains(&MovementEvent::SprintStarted));

        let stop = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(stop.events.contains(&MovementEvent::SprintStopped));
    }

    #[test]
    fn test_coyote_jump_after_leaving_ground() {
        let mut controller = controller();
        let mut scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);

        controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        scene.grounded = false;
        controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(!state.grounded);
        assert!(state.coyote_timer > 0.0);

        controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert!(state.vertical_velocity > 10.0);
        assert_eq!(state.coyote_timer, 0.0);
    }

    #[test]
    fn test_buffered_jump_fires_on_landing() {
        let mut controller = controller();
        let mut scene = ScriptedScene::airborne();
        let mut state = airborne_state(&controller, -2.0);
        state.coyote_timer = 0.0;

        let report = controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert!(state.jump_buffer_timer > 0.0);
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, MovementEvent::Jumped { .. })));

        scene.grounded = true;
        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, MovementEvent::Jumped { .. })));
        assert!(state.vertical_velocity > 10.0);
    }

    #[test]
    fn test_bunny_hop_chain() {
        let config = MovementConfig {
            momentum_lerp: 0.0,
            ..Default::default()
        };
        let mut controller =
            PlayerController::new(config.clone(), CharacterRig::from_config(&config)).unwrap();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);
        state.horizontal_velocity = Vec3::X * 10.0;

        controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert_eq!(state.bunny_hop_chain, 0);

        controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert_eq!(state.bunny_hop_chain, 1);
        assert!((state.horizontal_velocity.x - 10.0 * config.bunny_hop_boost).abs() < 1e-3);

        // Wait out the chain window
        for _ in 0..30 {
            controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        }
        controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert_eq!(state.bunny_hop_chain, 0);
    }

    #[test]
    fn test_dash_charges_and_cooldown() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);
        let dash = press(CommandButtons::DASH);

        let report = controller.advance(&mut state, &dash, &scene, DT);
        assert!(report.events.contains(&MovementEvent::DashStarted));
        assert_eq!(state.dash_charges.available(), 1);

        // Still dashing and inside the global cooldown
        controller.advance(&mut state, &dash, &scene, DT);
        assert_eq!(state.dash_charges.available(), 1);

        // Let the dash end and the global cooldown run out
        let mut ended = false;
        for _ in 0..20 {
            let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
            ended |= report.events.contains(&MovementEvent::DashEnded);
        }
        assert!(ended);
        assert_eq!(state.dash_cooldown, 0.0);

        controller.advance(&mut state, &dash, &scene, DT);
        assert_eq!(state.dash_charges.available(), 0);

        // Third dash inside the cooldown with no charges left
        let report = controller.advance(&mut state, &dash, &scene, DT);
        assert!(!report.events.contains(&MovementEvent::DashStarted));
        assert_eq!(state.dash_charges.available(), 0);
        assert!(controller.dash_cooldown_fraction(&state) < 1.0);
    }

    #[test]
    fn test_dash_holds_vertical_velocity() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);
        state.vertical_velocity = -2.0;

        controller.advance(&mut state, &press(CommandButtons::DASH), &scene, DT);
        assert!(state.mode.is_dashing());
        assert_eq!(state.vertical_velocity, -2.0);
        assert!(state.horizontal_speed() > 0.0);
    }

    #[test]
    fn test_dash_without_input_follows_facing() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);

        let report = controller.advance(&mut state, &press(CommandButtons::DASH), &scene, DT);
        assert!(state.mode.is_dashing());
        assert!(report.mode_remaining > 0.0);
        assert!(report.mode_remaining <= controller.config.dash_duration);
        // Yaw zero faces +X
        assert!(state.horizontal_velocity.x > 0.0);
        assert!(state.horizontal_velocity.z.abs() < 1e-4);

        let mut last = report.mode_remaining;
        while state.mode.is_dashing() {
            let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
            assert!(report.mode_remaining < last || !state.mode.is_dashing());
            last = report.mode_remaining;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_dash_rejected_while_sliding() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);

        let mut slide = press(CommandButtons::SLIDE);
        slide.held.press(CommandButtons::FORWARD);
        slide.forward_move = 1.0;
        let report = controller.advance(&mut state, &slide, &scene, DT);
        assert!(report.events.contains(&MovementEvent::SlideStarted));
        assert_eq!(state.capsule_height, controller.config.crouch_height);

        let report = controller.advance(&mut state, &press(CommandButtons::DASH), &scene, DT);
        assert!(!report.events.contains(&MovementEvent::DashStarted));
        assert!(state.mode.is_sliding());
        assert_eq!(state.dash_charges.available(), 2);
    }

    #[test]
    fn test_slide_ends_and_capsule_restores() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);

        let mut slide = press(CommandButtons::SLIDE);
        slide.held.press(CommandButtons::FORWARD);
        controller.advance(&mut state, &slide, &scene, DT);

        let mut ended = false;
        for _ in 0..60 {
            let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
            ended |= report.events.contains(&MovementEvent::SlideEnded);
        }
        assert!(ended);
        assert!(state.slide_cooldown > 0.0);

        for _ in 0..120 {
            controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        }
        assert_eq!(state.capsule_height, controller.capsule().height);
    }

    #[test]
    fn test_landing_roll_threshold() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();

        let mut state = airborne_state(&controller, -10.0);
        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(state.mode.is_rolling());
        assert!(report
            .events
            .contains(&MovementEvent::HardLanding { impact_speed: 10.0 }));

        let mut state = airborne_state(&controller, -3.0);
        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(!state.mode.is_rolling());
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, MovementEvent::HardLanding { .. })));
    }

    #[test]
    fn test_landing_refills_charges() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = airborne_state(&controller, -1.0);
        state.dash_charges.try_consume();
        state.dash_charges.try_consume();
        state.dash_cooldown = 0.2;

        controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert_eq!(state.dash_charges.available(), state.dash_charges.total());
        assert_eq!(state.dash_cooldown, 0.0);
    }

    #[test]
    fn test_wall_run_expires() {
        let mut controller = controller();
        // Facing +X, right is +Z, wall on the right
        let scene = ScriptedScene::airborne().with_ray(Vec3::Z, -Vec3::Z, Vec3::Z, 1);
        let mut state = airborne_state(&controller, -1.0);

        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(report.events.contains(&MovementEvent::WallRunStarted {
            side: WallSide::Right
        }));

        let mut elapsed = DT;
        while state.mode.is_wall_running() {
            // Fall speed eases toward the wall-run fall speed
            assert!(state.vertical_velocity > controller.config.wall_run_fall_speed - 0.5);
            controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
            elapsed += DT;
            assert!(elapsed < 2.0);
        }

        assert!(elapsed >= controller.config.wall_run_duration - 1e-3);
        assert!(state.gravity_restore.is_some());

        // No immediate re-entry on the same wall
        controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(!state.mode.is_wall_running());
    }

    #[test]
    fn test_wall_jump() {
        let mut controller = controller();
        let scene = ScriptedScene::airborne().with_ray(Vec3::Z, -Vec3::Z, Vec3::Z, 1);
        let mut state = airborne_state(&controller, -1.0);

        controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(state.mode.is_wall_running());

        let report = controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert!(report.events.contains(&MovementEvent::WallRunEnded));
        assert!(report.events.contains(&MovementEvent::Jumped {
            chain: 0,
            off_wall: true
        }));
        assert!(state.vertical_velocity > controller.config.jump_velocity());
        // Pushed away from the wall
        assert!(state.horizontal_velocity.z < -1.0);
    }

    #[test]
    fn test_wall_jump_falls_faster_than_gravity() {
        let mut controller = controller();
        let scene = ScriptedScene::airborne().with_ray(Vec3::Z, -Vec3::Z, Vec3::Z, 1);
        let mut state = airborne_state(&controller, -1.0);

        controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert!(state.gravity_restore.is_some());
        let take_off = state.vertical_velocity;

        for _ in 0..15 {
            controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        }
        assert!(state.gravity_restore.is_none());

        // Plain gravity alone would take 6.25 m/s over 0.25s, double gravity 12.5
        let gravity = controller.config.gravity;
        let lost = take_off - state.vertical_velocity;
        assert!(lost > gravity * 0.25 + 1.0, "lost {} m/s", lost);
        assert!(lost < gravity * 0.5);
    }

    fn mantle_scene() -> ScriptedScene {
        let ledge = RayHit {
            point: Vec3::new(1.0, 11.0, 0.0),
            normal: Vec3::Y,
            fraction: 0.2,
            brush: Some(5),
        };
        let mut scene = ScriptedScene::airborne();
        scene.sphere_hit = Some(RayHit {
            normal: -Vec3::X,
            ..ledge
        });
        scene.rays.push((-Vec3::Y, ledge));
        scene
    }

    #[test]
    fn test_mantle_runs_without_mover() {
        let mut controller = controller();
        let scene = mantle_scene();
        let mut state = airborne_state(&controller, -1.0);

        let report = controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert!(report.events.contains(&MovementEvent::MantleStarted));
        assert!(state.mode.is_mantling());
        assert_eq!(state.jump_buffer_timer, 0.0);

        let mut ended = false;
        for _ in 0..30 {
            let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
            if report.events.contains(&MovementEvent::MantleEnded) {
                ended = true;
                break;
            }
        }

        assert!(ended);
        assert_eq!(scene.moves.get(), 0);
        assert_eq!(state.horizontal_velocity, Vec3::ZERO);
        assert_eq!(state.vertical_velocity, 0.0);
        assert!((state.position.y - 12.05).abs() < 1e-3);
    }

    #[test]
    fn test_start_mantle_while_mantling_is_noop() {
        let mut controller = controller();
        let mut state = controller.spawn_state(Vec3::ZERO);

        assert!(controller.start_mantle(&mut state, Vec3::new(0.0, 2.0, 1.0)));
        let before = state.clone();
        assert!(!controller.start_mantle(&mut state, Vec3::new(5.0, 5.0, 5.0)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_ceiling_bonk() {
        let mut controller = controller();
        let mut scene = ScriptedScene::airborne();
        scene.ceiling = true;
        let mut state = airborne_state(&controller, 8.0);

        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(report.collision.above());
        assert_eq!(state.vertical_velocity, 0.0);
    }

    #[test]
    fn test_events_reach_subscribers() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = controller.bus_mut().subscribe(move |event| sink.borrow_mut().push(*event));

        controller.advance(&mut state, &press(CommandButtons::DASH), &scene, DT);
        assert!(seen.borrow().contains(&MovementEvent::DashStarted));

        assert!(controller.bus_mut().unsubscribe(id));
        let count = seen.borrow().len();
        controller.advance(&mut state, &press(CommandButtons::JUMP), &scene, DT);
        assert_eq!(seen.borrow().len(), count);
    }

    #[test]
    fn test_respawn_resets_state() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);
        controller.advance(&mut state, &press(CommandButtons::DASH), &scene, DT);
        assert!(state.mode.is_dashing());

        let spawn = Vec3::new(3.0, 1.1, 0.0);
        controller.respawn(&mut state, spawn);
        assert_eq!(state, controller.spawn_state(spawn));
    }

    #[test]
    fn test_respawn_closes_active_mode() {
        let mut controller = controller();
        let scene = ScriptedScene::grounded();
        let mut state = controller.spawn_state(Vec3::ZERO);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        controller.bus_mut().subscribe(move |event| sink.borrow_mut().push(*event));

        // Dash, then spend the other charge so the meter drains
        controller.advance(&mut state, &press(CommandButtons::DASH), &scene, DT);
        assert!(state.dash_charges.try_consume());
        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, MovementEvent::DashCooldownChanged(_))));
        assert!(state.mode.is_dashing());
        assert!(controller.dash_cooldown_fraction(&state) < 1.0);
        seen.borrow_mut().clear();

        let events = controller.respawn(&mut state, Vec3::new(0.0, 1.1, 0.0));
        assert_eq!(
            events,
            vec![MovementEvent::DashEnded, MovementEvent::DashCooldownChanged(1.0)]
        );
        assert_eq!(*seen.borrow(), events);

        // The meter already reads full, so the next tick reports no change
        let report = controller.advance(&mut state, &PlayerCommand::default(), &scene, DT);
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, MovementEvent::DashCooldownChanged(_))));
    }
}
