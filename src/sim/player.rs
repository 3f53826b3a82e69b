//! Orb locomotion
//!
//! Turns fused steering into forces on the physics body and owns the
//! grounded/airborne/dead state machine. The body itself (position and
//! velocity) lives behind `PhysicsBody`.

use glam::Vec3;

use super::input::FusedInput;
use super::physics::{ForceMode, PhysicsBody};
use crate::consts::RESPAWN_HEIGHT;
use crate::tuning::MovementTuning;

/// Locomotion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionState {
    Grounded,
    Airborne,
    /// Terminal until revived
    Dead,
}

/// Why the orb died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    FellOffTrack,
    HitObstacle,
}

/// Active coin magnet parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetField {
    pub radius: f32,
    pub strength: f32,
}

/// Per-run orb state owned by the session
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Target forward speed, bounded by [start_speed, max_speed]
    pub forward_speed: f32,
    pub state: LocomotionState,
    pub invincible: bool,
    pub magnet: Option<MagnetField>,
    pub coins: u32,
    /// Steering for the next fixed steps, in [-1, 1]
    pub steer: f32,
    jump_queued: bool,
}

impl PlayerState {
    pub fn new(start_speed: f32) -> Self {
        Self {
            forward_speed: start_speed,
            state: LocomotionState::Grounded,
            invincible: false,
            magnet: None,
            coins: 0,
            steer: 0.0,
            jump_queued: false,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.state == LocomotionState::Grounded
    }

    pub fn is_dead(&self) -> bool {
        self.state == LocomotionState::Dead
    }

    pub fn is_jump_queued(&self) -> bool {
        self.jump_queued
    }

    /// Take this frame's fused input. Jumps are only queued on the ground.
    pub fn apply_controls(&mut self, input: FusedInput) {
        if self.is_dead() {
            self.steer = 0.0;
            return;
        }
        self.steer = input.steer.clamp(-1.0, 1.0);
        if input.jump_requested && self.is_grounded() {
            self.jump_queued = true;
        }
    }

    /// Raise forward speed (coin pickups, streak bonus), capped at `max_speed`
    pub fn increase_forward_speed(&mut self, amount: f32, max_speed: f32) {
        self.forward_speed = (self.forward_speed + amount).min(max_speed);
    }

    /// One fixed step of movement. Returns true if a jump launched.
    pub fn fixed_update(
        &mut self,
        body: &mut dyn PhysicsBody,
        tuning: &MovementTuning,
        dt: f32,
    ) -> bool {
        if self.is_dead() {
            return false;
        }

        self.forward_speed = (self.forward_speed + tuning.acceleration * dt)
            .clamp(tuning.start_speed, tuning.max_speed);

        // Nudge z velocity to exactly the target speed
        let delta_v = self.forward_speed - body.velocity().z;
        body.apply_force(Vec3::new(0.0, 0.0, delta_v), ForceMode::VelocityChange);

        let lateral = self.steer * tuning.lateral_force;
        body.apply_force(Vec3::new(lateral, 0.0, 0.0), ForceMode::Acceleration);

        if self.jump_queued {
            self.jump_queued = false;
            if self.is_grounded() {
                body.apply_force(Vec3::Y * tuning.jump_force, ForceMode::Impulse);
                self.state = LocomotionState::Airborne;
                return true;
            }
        }
        false
    }

    /// Contact with track geometry. Returns true on an actual landing.
    pub fn on_track_contact(&mut self) -> bool {
        if self.state == LocomotionState::Airborne {
            self.state = LocomotionState::Grounded;
            return true;
        }
        false
    }

    /// Whether the body has dropped below the kill height
    pub fn has_fallen(&self, body: &dyn PhysicsBody, fall_threshold: f32) -> bool {
        !self.is_dead() && body.position().y < fall_threshold
    }

    /// Enter `Dead` and freeze the body. Returns false if already dead.
    pub fn kill(&mut self, body: &mut dyn PhysicsBody, cause: DeathCause) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = LocomotionState::Dead;
        self.jump_queued = false;
        self.steer = 0.0;
        // Kinematic body stops producing further contacts and fall checks
        body.set_kinematic(true);
        body.set_velocity(Vec3::ZERO);
        log::info!("Orb died: {:?}", cause);
        true
    }

    /// Back on the track above the death point, keeping forward progress
    pub fn revive(&mut self, body: &mut dyn PhysicsBody) -> Vec3 {
        body.set_kinematic(false);
        body.set_velocity(Vec3::ZERO);
        body.set_angular_velocity(Vec3::ZERO);
        let position = Vec3::new(0.0, RESPAWN_HEIGHT, body.position().z);
        body.set_position(position);

        self.state = LocomotionState::Grounded;
        self.jump_queued = false;
        self.steer = 0.0;
        position
    }
}
