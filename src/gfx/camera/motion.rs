//! # Camera Motion Controller
//!
//! Sole owner of the camera position. Every change to the camera goes through
//! one of the operations here, and the frame loop drives time through
//! [`MotionController::advance`], a plain state-transition step called once per
//! host tick. Nothing in this module schedules frames or sleeps.
//!
//! ## States
//!
//! - `Idle` / `OrbitFollow` - orbit mode; external orbit changes are applied and
//!   the eye and look-at heights are re-pinned after each one
//! - `Teleporting` - fixed-duration eased move to a floor point; orbit input is
//!   disabled until it finishes
//! - `FreeRoam` - first-person movement from held keys, blocked by wall colliders
//! - `Disposed` - terminal; every operation is a no-op and the camera is gone

use std::time::Duration;

use cgmath::{InnerSpace, Vector3, VectorSpace, Zero};

use super::{camera_controller::OrbitDelta, orbit_camera::OrbitCamera};
use crate::config::{NavigationMode, ViewerConfig};
use crate::error::TeleportError;
use crate::gfx::picking::AABB;
use crate::input::InputState;
use crate::navigation::collision::BoundingSphere;

/// Shortest sweep step for free roam, used when the player radius is tiny.
const MIN_SWEEP_STEP: f32 = 0.01;

/// Quadratic ease-in-out on `[0, 1]`.
pub fn ease_in_out_quad(p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        2.0 * p * p
    } else {
        1.0 - 2.0 * (1.0 - p) * (1.0 - p)
    }
}

/// Tunables for camera motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSettings {
    /// Eye height kept in every mode
    pub navigation_height: f32,
    /// Height of the orbit look-at point
    pub look_height: f32,
    pub teleport_duration: Duration,
    /// How far past the destination the camera looks after a teleport
    pub look_ahead: f32,
    /// Free-roam speed in units per second
    pub move_speed: f32,
    pub player_radius: f32,
}

impl MotionSettings {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            navigation_height: config.camera.initial_height,
            look_height: config.camera.look_height(),
            teleport_duration: Duration::from_millis(config.navigation.teleport_duration_ms),
            look_ahead: config.navigation.look_ahead,
            move_speed: config.navigation.move_speed,
            player_radius: config.navigation.player_radius,
        }
    }
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

/// An in-flight teleport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Teleport {
    pub start: Vector3<f32>,
    pub target: Vector3<f32>,
    pub start_look: Vector3<f32>,
    pub look_goal: Vector3<f32>,
    pub elapsed: Duration,
    pub duration: Duration,
    /// Mode to settle into once the animation completes
    pub resume: NavigationMode,
}

impl Teleport {
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    Idle,
    OrbitFollow,
    Teleporting(Teleport),
    FreeRoam { velocity: Vector3<f32> },
    Disposed,
}

pub struct MotionController {
    camera: OrbitCamera,
    state: MotionState,
    settings: MotionSettings,
    walls: Vec<AABB>,
    orbit_enabled: bool,
}

impl MotionController {
    pub fn new(camera: OrbitCamera, settings: MotionSettings) -> Self {
        let mut controller = Self {
            camera,
            state: MotionState::Idle,
            settings,
            walls: Vec::new(),
            orbit_enabled: true,
        };
        controller.pin_orbit_heights();
        controller
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// The camera, unless the controller has been disposed.
    pub fn camera(&self) -> Option<&OrbitCamera> {
        match self.state {
            MotionState::Disposed => None,
            _ => Some(&self.camera),
        }
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    pub fn set_walls(&mut self, walls: Vec<AABB>) {
        if !self.is_disposed() {
            self.walls = walls;
        }
    }

    pub fn is_teleporting(&self) -> bool {
        matches!(self.state, MotionState::Teleporting(_))
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.state, MotionState::Disposed)
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    /// Navigation mode the controller is in, or will return to after a teleport.
    pub fn mode(&self) -> Option<NavigationMode> {
        match self.state {
            MotionState::Idle | MotionState::OrbitFollow => Some(NavigationMode::Orbit),
            MotionState::FreeRoam { .. } => Some(NavigationMode::FirstPerson),
            MotionState::Teleporting(teleport) => Some(teleport.resume),
            MotionState::Disposed => None,
        }
    }

    /// Switches between orbit and first-person navigation.
    ///
    /// During a teleport only the mode to resume into changes; the animation
    /// itself runs to completion.
    pub fn set_mode(&mut self, mode: NavigationMode) -> bool {
        if let MotionState::Teleporting(teleport) = &mut self.state {
            teleport.resume = mode;
            return true;
        }

        match (self.state, mode) {
            (MotionState::Disposed, _) => false,
            (MotionState::FreeRoam { .. }, NavigationMode::FirstPerson)
            | (MotionState::Idle | MotionState::OrbitFollow, NavigationMode::Orbit) => false,
            (_, NavigationMode::Orbit) => {
                self.state = MotionState::OrbitFollow;
                self.orbit_enabled = true;
                // Re-apply bounds: free roam may have left the look-at anywhere.
                self.camera.orbit(0.0, 0.0);
                self.pin_orbit_heights();
                log::debug!("navigation mode: orbit");
                true
            }
            (_, NavigationMode::FirstPerson) => {
                self.state = MotionState::FreeRoam {
                    velocity: Vector3::zero(),
                };
                self.camera.eye.y = self.settings.navigation_height;
                log::debug!("navigation mode: first person");
                true
            }
        }
    }

    /// Starts an eased move to `target`. At most one teleport runs at a time;
    /// a request made while one is in flight is dropped.
    pub fn teleport_to(&mut self, target: Vector3<f32>) -> Result<(), TeleportError> {
        let resume = match self.state {
            MotionState::Disposed => return Err(TeleportError::Disposed),
            MotionState::Teleporting(_) => {
                log::debug!("teleport request dropped: one is already in flight");
                return Err(TeleportError::InProgress);
            }
            MotionState::FreeRoam { .. } => NavigationMode::FirstPerson,
            MotionState::Idle | MotionState::OrbitFollow => NavigationMode::Orbit,
        };

        let mut target = target;
        target.y = self.settings.navigation_height;

        let forward = self
            .camera
            .flat_forward()
            .unwrap_or_else(|| -Vector3::unit_z());
        let mut look_goal = target + forward * self.settings.look_ahead;
        look_goal.y = self.settings.look_height;

        log::debug!(
            "teleport from ({:.2}, {:.2}) to ({:.2}, {:.2})",
            self.camera.eye.x,
            self.camera.eye.z,
            target.x,
            target.z
        );

        self.state = MotionState::Teleporting(Teleport {
            start: self.camera.eye,
            target,
            start_look: self.camera.target,
            look_goal,
            elapsed: Duration::ZERO,
            duration: self.settings.teleport_duration,
            resume,
        });
        self.orbit_enabled = false;
        Ok(())
    }

    /// Applies an externally driven orbit change and re-pins heights.
    pub fn apply_orbit(&mut self, delta: OrbitDelta) -> bool {
        if delta.is_zero() || !self.orbit_enabled {
            return false;
        }
        if !matches!(self.state, MotionState::Idle | MotionState::OrbitFollow) {
            return false;
        }

        self.camera.orbit(delta.yaw, delta.pitch);
        if delta.zoom != 0.0 {
            self.camera.add_distance(delta.zoom);
        }
        self.pin_orbit_heights();
        self.state = MotionState::OrbitFollow;
        true
    }

    /// First-person turn; only meaningful in free roam.
    pub fn apply_look(&mut self, yaw: f32, pitch: f32) -> bool {
        if !matches!(self.state, MotionState::FreeRoam { .. }) || (yaw == 0.0 && pitch == 0.0) {
            return false;
        }
        self.camera.look(yaw, pitch);
        true
    }

    /// Advances time by `dt`. Returns `true` when the camera moved.
    pub fn advance(&mut self, dt: Duration, input: &InputState) -> bool {
        match self.state {
            MotionState::Disposed | MotionState::Idle | MotionState::OrbitFollow => false,
            MotionState::Teleporting(mut teleport) => {
                teleport.elapsed = teleport.elapsed.saturating_add(dt);
                self.sample_teleport(&teleport);
                if teleport.is_finished() {
                    self.finish_teleport(teleport.resume);
                } else {
                    self.state = MotionState::Teleporting(teleport);
                }
                true
            }
            MotionState::FreeRoam { .. } => self.step_free_roam(dt, input),
        }
    }

    /// Updates the projection aspect. Safe in any state and idempotent.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.camera.resize_projection(width, height)
    }

    pub fn dispose(&mut self) {
        if !self.is_disposed() {
            log::debug!("motion controller disposed");
        }
        self.state = MotionState::Disposed;
        self.orbit_enabled = false;
        self.walls.clear();
    }

    fn sample_teleport(&mut self, teleport: &Teleport) {
        let eased = ease_in_out_quad(teleport.progress());

        let mut eye = teleport.start.lerp(teleport.target, eased);
        eye.y = self.settings.navigation_height;
        self.camera.eye = eye;
        self.camera.target = teleport.start_look.lerp(teleport.look_goal, eased);
    }

    fn finish_teleport(&mut self, resume: NavigationMode) {
        self.orbit_enabled = true;
        match resume {
            NavigationMode::Orbit => {
                self.state = MotionState::OrbitFollow;
                self.pin_orbit_heights();
            }
            NavigationMode::FirstPerson => {
                self.state = MotionState::FreeRoam {
                    velocity: Vector3::zero(),
                };
                self.camera.eye.y = self.settings.navigation_height;
            }
        }
        log::debug!(
            "teleport finished at ({:.2}, {:.2})",
            self.camera.eye.x,
            self.camera.eye.z
        );
    }

    /// Moves the player by `velocity * dt`, or not at all if a wall lies
    /// anywhere along the way.
    ///
    /// The path is swept in steps no longer than the player radius so a long
    /// frame cannot carry the sphere through a thin wall.
    fn step_free_roam(&mut self, dt: Duration, input: &InputState) -> bool {
        let velocity = self.free_roam_velocity(input);
        self.state = MotionState::FreeRoam { velocity };
        if velocity.is_zero() {
            return false;
        }

        let displacement = velocity * dt.as_secs_f32();
        let mut start = self.camera.eye;
        start.y = self.settings.navigation_height;

        let step = self.settings.player_radius.max(MIN_SWEEP_STEP);
        let steps = (displacement.magnitude() / step).ceil().max(1.0) as u32;
        for i in 1..=steps {
            let position = start + displacement * (i as f32 / steps as f32);
            let body = BoundingSphere::new(position, self.settings.player_radius);
            if body.first_blocking(&self.walls).is_some() {
                log::debug!("free roam step blocked by wall ({i}/{steps})");
                return false;
            }
        }

        let delta = start + displacement - self.camera.eye;
        self.camera.translate(delta);
        true
    }

    fn free_roam_velocity(&self, input: &InputState) -> Vector3<f32> {
        if !input.any_movement() {
            return Vector3::zero();
        }
        let Some(forward) = self.camera.flat_forward() else {
            return Vector3::zero();
        };
        let right = forward.cross(Vector3::unit_y());

        let mut wish = Vector3::zero();
        if input.move_forward {
            wish += forward;
        }
        if input.move_backward {
            wish -= forward;
        }
        if input.move_right {
            wish += right;
        }
        if input.move_left {
            wish -= right;
        }

        if wish.magnitude2() > f32::EPSILON {
            wish.normalize() * self.settings.move_speed
        } else {
            Vector3::zero()
        }
    }

    fn pin_orbit_heights(&mut self) {
        self.camera.eye.y = self.settings.navigation_height;
        self.camera.target.y = self.settings.look_height;
    }
}
